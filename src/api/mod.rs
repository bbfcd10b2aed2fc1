//! HTTP API server for the voice relay

pub mod health;
pub mod websocket;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::pipeline::Pipeline;
use crate::{Error, Result};

/// Build the router with all routes
///
/// Every connection shares the same `pipeline`.
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    // CORS layer for cross-origin requests from browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/ws", websocket::router(pipeline))
        .merge(health::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    pipeline: Arc<Pipeline>,
    addr: String,
}

impl ApiServer {
    /// Create a server that will bind `addr` (e.g. `0.0.0.0:8000`)
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>, addr: String) -> Self {
        Self { pipeline, addr }
    }

    /// Bind and run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind {}: {e}", self.addr)))?;

        self.serve(listener).await
    }

    /// Run the API server on an already bound listener until ctrl-c
    ///
    /// # Errors
    ///
    /// Returns error if the server fails
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let local = listener.local_addr()?;
        tracing::info!(addr = %local, "API server listening");

        axum::serve(listener, router(self.pipeline))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Config(format!("API server error: {e}")))?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown requested");
    } else {
        // No signal handler available; run until the task is dropped
        std::future::pending::<()>().await;
    }
}
