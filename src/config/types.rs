//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use super::channels::SalesChannelConfig;
use super::proxy::ProxyConfig;
use super::routing::RoutingConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storefront listener.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Trusted reverse proxies.
    #[serde(default)]
    pub proxy: ProxyConfig,
    /// Route classification.
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Admin API settings.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Sales channels served through the gate.
    #[serde(default, rename = "sales_channel")]
    pub sales_channels: Vec<SalesChannelConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Instance name used in startup logs.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Prometheus metrics HTTP port (default: 9090, 0 disables).
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            metrics_port: None,
        }
    }
}

fn default_server_name() -> String {
    "storegate".to_string()
}

/// Storefront listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_address")]
    pub address: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
        }
    }
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    /// Bearer token required by the admin API. Unset leaves the API open,
    /// which is only sensible behind a private listener.
    pub token: Option<String>,
}

pub(super) fn default_true() -> bool {
    true
}
