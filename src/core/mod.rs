pub mod context;
pub mod dispatcher;
pub mod error;
pub mod method;
pub mod pattern;
pub mod resource;
pub mod resource_table;
pub mod router;
pub mod search_index;

pub use context::{RequestContext, Response};
pub use dispatcher::{DispatchState, Dispatcher};
pub use error::{DispatchError, HandlerError};
pub use method::Method;
pub use pattern::{Params, RoutePattern, compile};
pub use resource::{Resource, ResourceDefinition, ResourceId};
pub use resource_table::ResourceTable;
pub use router::{RegistrationError, Router, RouterBuilder};
pub use search_index::SearchIndex;
