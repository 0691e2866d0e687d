//! Health check endpoint for uptime monitors.

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tracing::{error, info};

/// Router carrying the fixed health route. Merged into the webhook server
/// in webhook mode, served standalone in polling mode.
pub fn router() -> Router {
    Router::new().route("/healthz", get(healthz))
}

async fn healthz() -> &'static str {
    "OK"
}

/// Standalone health server for polling mode.
pub async fn serve(port: u16) {
    let address = SocketAddr::from(([0, 0, 0, 0], port));

    match tokio::net::TcpListener::bind(address).await {
        Ok(listener) => {
            info!("Health endpoint listening on {}", address);
            if let Err(err) = axum::serve(listener, router()).await {
                error!("Health server failed: {}", err);
            }
        }
        Err(err) => error!("Failed to bind health endpoint on {}: {}", address, err),
    }
}
