//! Sales channel configuration.

use serde::Deserialize;

/// One `[[sales_channel]]` block.
///
/// A request belongs to the channel when its `Host` (without port) matches
/// one of `hosts`, ignoring case.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesChannelConfig {
    /// Unique channel name (used by the admin API).
    pub name: String,
    /// Host names served by this channel.
    #[serde(default)]
    pub hosts: Vec<String>,
    /// Maintenance mode enabled at startup.
    #[serde(default)]
    pub maintenance: bool,
    /// Client IPs or CIDR networks that bypass maintenance mode.
    #[serde(default)]
    pub maintenance_ip_allowlist: Vec<String>,
}
