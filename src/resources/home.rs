use crate::core::{RequestContext, Resource, ResourceDefinition};

pub const HOME_GREETING: &str = "Hello World!";

/// `GET /` answers with a fixed greeting.
pub fn home_resource() -> ResourceDefinition {
    Resource::builder("HomeResource")
        .uri("/")
        .get(|ctx: &mut RequestContext| ctx.set_body(HOME_GREETING))
}
