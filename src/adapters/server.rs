use std::{net::SocketAddr, sync::Arc};

use eyre::{Result, WrapErr};
use tokio::net::TcpListener;

use crate::{
    adapters::http_handler::{HttpHandler, app},
    config::ServerConfig,
    core::Router,
    ports::HttpServer,
    utils::GracefulShutdown,
};

/// Plain HTTP/1.1 + HTTP/2 server on top of `axum::serve`.
pub struct AxumServer {
    config: Arc<ServerConfig>,
    handler: Arc<HttpHandler>,
    shutdown: GracefulShutdown,
}

impl AxumServer {
    pub fn new(config: Arc<ServerConfig>, router: Arc<Router>, shutdown: GracefulShutdown) -> Self {
        let handler = Arc::new(HttpHandler::new(router, config.max_body_bytes));
        Self {
            config,
            handler,
            shutdown,
        }
    }

    /// Serve on an already bound listener until shutdown is triggered.
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener
            .local_addr()
            .context("Failed to get local addr")?;
        tracing::info!(
            "waypost listening on {} ({} resources)",
            local_addr,
            self.handler.router().resource_count()
        );

        let shutdown = self.shutdown.clone();
        axum::serve(listener, app(self.handler.clone()))
            .with_graceful_shutdown(async move {
                let reason = shutdown.wait_for_shutdown_signal().await;
                tracing::info!("Shutdown signal received: {:?}", reason);
            })
            .await
            .context("Server error")?;

        tracing::info!("Graceful shutdown completed");
        Ok(())
    }
}

impl HttpServer for AxumServer {
    async fn run(&self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .context("Failed to parse listen address")?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to address {addr}"))?;
        self.run_with_listener(listener).await
    }
}
