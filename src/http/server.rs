//! HTTP server setup.
//!
//! # Responsibilities
//! - Wrap the discovered router with middleware (tracing, timeout)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;

/// Serves a composed router.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Wrap `routes` with the server middleware stack.
    pub fn new(routes: Router, config: ServerConfig) -> Self {
        let router = Self::build_router(routes, &config);
        Self { router, config }
    }

    #[allow(deprecated)]
    fn build_router(routes: Router, config: &ServerConfig) -> Router {
        routes
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
