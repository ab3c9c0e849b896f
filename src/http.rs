//! HTTP server for the Prometheus metrics endpoint.
//!
//! Runs on its own listener so scraping never goes through the gate.

use axum::{Router, routing::get};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Router serving `/metrics`.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Run the metrics HTTP server on `0.0.0.0:port`.
///
/// Long-running; spawn it in the background. Bind failures are logged and
/// end the task without affecting the storefront listener.
pub async fn run_http_server(port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind metrics server");
            return;
        }
    };
    tracing::info!(%addr, "Prometheus HTTP server listening");

    if let Err(e) = axum::serve(listener, metrics_router()).await {
        tracing::error!(error = %e, "Metrics server error");
    }
}
