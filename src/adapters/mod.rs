pub mod http_handler;
pub mod server;

/// Re-export commonly used types from adapters
pub use http_handler::{AxumResponseSink, HttpHandler, app};
pub use server::AxumServer;
