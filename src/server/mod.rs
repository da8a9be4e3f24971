//! HTTP API.
//!
//! Routes, handlers and the response envelope for the statistics
//! endpoints.

pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = create_router(state)?;

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
