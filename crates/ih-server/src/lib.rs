//! ih-server: HTTP front end of the image handler.
//!
//! - Axum router with request IDs and HTTP tracing
//! - `GET /{*key}` renders an image or directs the client to origin
//! - Graceful shutdown via signal handling or a cancellation token

pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

use std::net::SocketAddr;

use ih_core::config::Config;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

/// Start the image handler server.
///
/// Builds the configured object store and serves until a shutdown signal
/// arrives or `cancel` fires.
pub async fn start(config: Config, cancel: CancellationToken) -> ih_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let store = ih_store::store_from_config(&config.store)?;
    tracing::info!("Serving objects from the {} store", store.name());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ih_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(config, store);
    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ih_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT, SIGTERM, or cancellation.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}
