pub mod http_server;
pub mod response_sink;

pub use http_server::HttpServer;
pub use response_sink::ResponseSink;
