//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, ListenConfig, AdminConfig)
//! - [`channels`]: Sales channel blocks (SalesChannelConfig)
//! - [`proxy`]: Trusted reverse proxies (ProxyConfig)
//! - [`routing`]: Maintenance, error and headless route paths (RoutingConfig)
//! - [`validation`]: Startup validation collecting every error found

mod channels;
mod proxy;
mod routing;
mod types;
pub mod validation;

pub use channels::SalesChannelConfig;
pub use proxy::ProxyConfig;
pub use routing::RoutingConfig;
pub use types::{AdminConfig, Config, ConfigError, ListenConfig, ServerConfig};
pub use validation::{ValidationError, validate};
