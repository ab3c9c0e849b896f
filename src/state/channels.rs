//! Runtime sales channel state.
//!
//! Hosts are fixed at startup; maintenance flags and allow-lists can change
//! through the admin API. Readers get cheap snapshots: the allow-list is
//! shared behind an `Arc`.

use crate::config::SalesChannelConfig;
use crate::error::{GateError, GateResult};
use crate::maintenance::AllowList;
use crate::maintenance::allowlist::parse_network;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
struct SalesChannel {
    name: String,
    hosts: Vec<String>,
    maintenance: bool,
    allowlist: Arc<AllowList>,
}

impl SalesChannel {
    fn status(&self) -> ChannelStatus {
        ChannelStatus {
            name: self.name.clone(),
            hosts: self.hosts.clone(),
            maintenance: self.maintenance,
            allowed_ips: self.allowlist.entries(),
        }
    }
}

/// Per-request view of a sales channel.
#[derive(Debug, Clone)]
pub struct ChannelSnapshot {
    pub name: String,
    pub maintenance: bool,
    pub allowlist: Arc<AllowList>,
}

/// Admin view of a sales channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelStatus {
    pub name: String,
    pub hosts: Vec<String>,
    pub maintenance: bool,
    pub allowed_ips: Vec<String>,
}

/// Sales channels keyed by host.
#[derive(Debug)]
pub struct SalesChannelRegistry {
    channels: RwLock<Vec<SalesChannel>>,
    /// Normalized host -> index into `channels`.
    hosts: HashMap<String, usize>,
}

impl SalesChannelRegistry {
    /// Build the registry from `[[sales_channel]]` blocks.
    ///
    /// A host claimed twice stays with the first channel (validation reports it).
    pub fn from_config(configs: &[SalesChannelConfig]) -> Self {
        let mut channels = Vec::with_capacity(configs.len());
        let mut hosts = HashMap::new();

        for config in configs {
            let index = channels.len();
            let mut channel_hosts = Vec::with_capacity(config.hosts.len());
            for host in &config.hosts {
                let host = normalize_host(host);
                if hosts.contains_key(&host) {
                    warn!(host = %host, channel = %config.name, "Host already claimed, ignoring");
                    continue;
                }
                hosts.insert(host.clone(), index);
                channel_hosts.push(host);
            }

            let allowlist = AllowList::new(&config.maintenance_ip_allowlist);
            for literal in allowlist.literals() {
                warn!(channel = %config.name, entry = %literal, "Allow-list entry is not an IP or CIDR network");
            }
            info!(
                channel = %config.name,
                hosts = channel_hosts.len(),
                maintenance = config.maintenance,
                allowlist = allowlist.len(),
                "Sales channel registered"
            );

            channels.push(SalesChannel {
                name: config.name.clone(),
                hosts: channel_hosts,
                maintenance: config.maintenance,
                allowlist: Arc::new(allowlist),
            });
        }

        let registry = Self {
            channels: RwLock::new(channels),
            hosts,
        };
        crate::metrics::set_channels_in_maintenance(registry.in_maintenance_count() as i64);
        registry
    }

    /// Resolve the sales channel serving `host` (a `Host` header value).
    pub fn resolve(&self, host: &str) -> Option<ChannelSnapshot> {
        let index = *self.hosts.get(&normalize_host(host))?;
        let channels = self.channels.read();
        let channel = channels.get(index)?;
        Some(ChannelSnapshot {
            name: channel.name.clone(),
            maintenance: channel.maintenance,
            allowlist: Arc::clone(&channel.allowlist),
        })
    }

    /// Status of one channel.
    pub fn get(&self, name: &str) -> GateResult<ChannelStatus> {
        self.channels
            .read()
            .iter()
            .find(|c| c.name == name)
            .map(SalesChannel::status)
            .ok_or_else(|| GateError::UnknownChannel(name.to_string()))
    }

    /// Status of every channel, in configuration order.
    pub fn list(&self) -> Vec<ChannelStatus> {
        self.channels.read().iter().map(SalesChannel::status).collect()
    }

    /// Enable or disable maintenance mode, optionally replacing the allow-list.
    ///
    /// Allow-list entries must be IPs or CIDR networks; nothing changes if
    /// any entry is invalid.
    pub fn set_maintenance(
        &self,
        name: &str,
        active: bool,
        allowed_ips: Option<Vec<String>>,
    ) -> GateResult<ChannelStatus> {
        let allowlist = match allowed_ips {
            Some(entries) => {
                let invalid: Vec<String> = entries
                    .iter()
                    .filter(|e| parse_network(e).is_none())
                    .cloned()
                    .collect();
                if !invalid.is_empty() {
                    return Err(GateError::InvalidAllowList(invalid));
                }
                Some(Arc::new(AllowList::new(&entries)))
            }
            None => None,
        };

        let (status, count) = {
            let mut channels = self.channels.write();
            let channel = channels
                .iter_mut()
                .find(|c| c.name == name)
                .ok_or_else(|| GateError::UnknownChannel(name.to_string()))?;

            channel.maintenance = active;
            if let Some(allowlist) = allowlist {
                channel.allowlist = allowlist;
            }
            let status = channel.status();
            let count = channels.iter().filter(|c| c.maintenance).count();
            (status, count)
        };

        crate::metrics::set_channels_in_maintenance(count as i64);
        info!(
            channel = %status.name,
            maintenance = status.maintenance,
            allowlist = status.allowed_ips.len(),
            "Maintenance mode updated"
        );
        Ok(status)
    }

    /// Number of channels with maintenance mode active.
    pub fn in_maintenance_count(&self) -> usize {
        self.channels.read().iter().filter(|c| c.maintenance).count()
    }
}

/// Lower-case a host and drop any port and trailing dot.
///
/// `Shop.Example.com:8080` -> `shop.example.com`, `[::1]:8080` -> `[::1]`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = if host.starts_with('[') {
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        match host.rsplit_once(':') {
            Some((name, port))
                if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) =>
            {
                name
            }
            _ => host,
        }
    };
    host.trim_end_matches('.').to_ascii_lowercase()
}
