//! Resources registered by the `waypost` binary.
pub mod home;
pub mod users;

pub use home::home_resource;
pub use users::users_resource;

use crate::core::ResourceDefinition;

/// Every bundled resource, in registration order.
pub fn bundled() -> Vec<ResourceDefinition> {
    vec![home_resource(), users_resource()]
}
