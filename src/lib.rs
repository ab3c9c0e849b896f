//! storegate - storefront maintenance-mode gate.
//!
//! Sits in front of storefront routes and decides, per request, whether the
//! visitor is sent to the maintenance page, sent back to the shop, or let
//! through. The decision logic lives in [`maintenance`]; [`network`] wires it
//! into an axum server.

pub mod config;
pub mod error;
pub mod http;
pub mod maintenance;
pub mod metrics;
pub mod network;
pub mod state;
pub mod telemetry;
