//! Network module.
//!
//! Contains the Gateway (HTTP listener), the maintenance gate middleware,
//! client address resolution, pages and the admin API.

pub mod admin;
pub mod forwarded;
pub mod gate;
mod gateway;
pub mod pages;

pub use forwarded::{ClientIpSource, PeerAddress, TrustedProxies};
pub use gate::{AppState, RequestClassifier};
pub use gateway::{Gateway, router};
