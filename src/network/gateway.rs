//! Gateway - HTTP listener serving the gated storefront.
//!
//! The Gateway binds the storefront socket and serves the axum router with
//! the maintenance gate in front of every route.

use crate::network::admin;
use crate::network::gate::{AppState, maintenance_gate};
use crate::network::pages;
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, instrument};

/// The Gateway accepts storefront connections.
pub struct Gateway {
    listener: TcpListener,
    state: AppState,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(addr: SocketAddr, state: AppState) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Storefront listener bound");
        Ok(Self { listener, state })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the gateway, serving requests forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let app = router(self.state).into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(self.listener, app).await?;
        Ok(())
    }
}

/// Storefront router: pages, admin API and the maintenance gate.
pub fn router(state: AppState) -> Router {
    let routing = state.classifier.routing().clone();

    Router::new()
        .route(&routing.maintenance_path, get(pages::maintenance_page))
        .route(&routing.error_path, get(pages::error_page))
        .nest(admin::ADMIN_PREFIX, admin::router())
        .fallback(pages::storefront)
        .layer(from_fn_with_state(state.clone(), maintenance_gate))
        .with_state(state)
}
