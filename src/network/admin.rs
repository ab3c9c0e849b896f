//! Admin API for per-channel maintenance mode.
//!
//! Mounted under `/api/_admin`, a headless prefix, so it is never gated.
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | GET | `/sales-channels` | list channels |
//! | GET | `/sales-channels/:name/maintenance` | one channel |
//! | PUT | `/sales-channels/:name/maintenance` | toggle maintenance, optionally replace allow-list |

use crate::error::{GateError, GateResult};
use crate::network::gate::AppState;
use crate::state::ChannelStatus;
use crate::telemetry::spans;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use http::HeaderMap;
use http::header::AUTHORIZATION;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Mount point of the admin router. Must stay under a headless prefix.
pub const ADMIN_PREFIX: &str = "/api/_admin";

/// Body of `PUT /sales-channels/:name/maintenance`.
#[derive(Debug, Deserialize)]
pub struct MaintenanceUpdate {
    pub active: bool,
    /// Replaces the allow-list when present.
    #[serde(default)]
    pub allowed_ips: Option<Vec<String>>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales-channels", get(list_channels))
        .route(
            "/sales-channels/:name/maintenance",
            get(get_maintenance).put(set_maintenance),
        )
}

/// Require `Authorization: Bearer <token>` when a token is configured.
fn authorize(state: &AppState, headers: &HeaderMap) -> GateResult<()> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(());
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        warn!("Admin API request with missing or invalid token");
        Err(GateError::Unauthorized)
    }
}

async fn list_channels(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> GateResult<Json<Vec<ChannelStatus>>> {
    spans::admin("list", None).in_scope(|| {
        authorize(&state, &headers)?;
        Ok(Json(state.registry.list()))
    })
}

async fn get_maintenance(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> GateResult<Json<ChannelStatus>> {
    spans::admin("get", Some(&name)).in_scope(|| {
        authorize(&state, &headers)?;
        state.registry.get(&name).map(Json)
    })
}

async fn set_maintenance(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(update): Json<MaintenanceUpdate>,
) -> GateResult<Json<ChannelStatus>> {
    spans::admin("set_maintenance", Some(&name)).in_scope(|| {
        authorize(&state, &headers)?;
        state
            .registry
            .set_maintenance(&name, update.active, update.allowed_ips)
            .map(Json)
    })
}
