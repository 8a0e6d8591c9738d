use serde_json::json;

use crate::core::{HandlerError, RequestContext, Resource, ResourceDefinition, Response};

/// `GET /users/:id` and `GET /users/{id}/profile` echo the id back as JSON.
pub fn users_resource() -> ResourceDefinition {
    Resource::builder("UsersResource")
        .uri("/users/:id")
        .uri("/users/{id}/profile")
        .get(show_user)
}

fn show_user(ctx: &mut RequestContext) -> Result<Response, HandlerError> {
    let id = ctx
        .param("id")
        .ok_or_else(|| HandlerError::bad_request("missing user id"))?;
    Response::json(&json!({ "id": id }))
}
