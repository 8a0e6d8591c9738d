use thiserror::Error;

use crate::core::resource::ResourceId;

pub const NOT_FOUND_MESSAGE: &str = "Not Found";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

/// Error a handler reports for its own request.
///
/// The dispatcher forwards `status` and `message` to the client unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{status} {message}")]
pub struct HandlerError {
    status: u16,
    message: String,
}

impl HandlerError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Reasons a request could not be served by a handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DispatchError {
    /// No registered pattern matches the path
    #[error("No resource matches path '{path}'")]
    RouteNotFound { path: String },

    /// A resource matched but has no handler for the verb
    #[error("Resource {resource} does not handle {method} (path '{path}')")]
    MethodNotAllowed {
        resource: ResourceId,
        method: String,
        path: String,
    },

    #[error("Handler failed: {0}")]
    HandlerFailed(#[from] HandlerError),

    #[error("Handler for {method} on resource {resource} panicked")]
    HandlerPanicked { resource: ResourceId, method: String },

    /// The index referenced an id the resource table does not hold
    #[error("Search index references unknown resource {0}")]
    UnknownResource(ResourceId),
}

impl DispatchError {
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::RouteNotFound { .. } => 404,
            DispatchError::MethodNotAllowed { .. } => 405,
            DispatchError::HandlerFailed(err) => err.status(),
            DispatchError::HandlerPanicked { .. } | DispatchError::UnknownResource(_) => 500,
        }
    }

    /// Body sent to the client for this error.
    pub fn public_message(&self) -> &str {
        match self {
            DispatchError::RouteNotFound { .. } => NOT_FOUND_MESSAGE,
            DispatchError::MethodNotAllowed { .. } => METHOD_NOT_ALLOWED_MESSAGE,
            DispatchError::HandlerFailed(err) => err.message(),
            DispatchError::HandlerPanicked { .. } | DispatchError::UnknownResource(_) => {
                INTERNAL_SERVER_ERROR_MESSAGE
            }
        }
    }
}
