//! Client IP allow-list for maintenance mode.
//!
//! Entries are single addresses or CIDR networks. Matching parses both the
//! entry and the client address, so textual differences never matter:
//!
//! - IPv6 letter case (`2003:F0::` vs `2003:f0::`)
//! - compressed vs expanded IPv6 (`::1` vs `0:0:0:0:0:0:0:1`)
//! - IPv4-mapped IPv6 clients (`::ffff:192.168.1.16`)
//!
//! Entries that do not parse are kept as literals and compared with ASCII
//! case folding.

use ipnet::IpNet;
use std::net::IpAddr;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Network(IpNet),
    Literal(String),
}

impl Entry {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if let Some(net) = parse_network(raw) {
            return Entry::Network(net);
        }

        debug!(entry = %raw, "Allow-list entry is not an IP or CIDR, matching literally");
        Entry::Literal(raw.to_ascii_lowercase())
    }

    fn display(&self) -> String {
        match self {
            Entry::Network(net) if net.prefix_len() == net.max_prefix_len() => {
                net.addr().to_string()
            }
            Entry::Network(net) => net.to_string(),
            Entry::Literal(s) => s.clone(),
        }
    }
}

/// Set of client addresses exempt from maintenance redirection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    entries: Vec<Entry>,
}

impl AllowList {
    /// Build an allow-list from configured entries. Blank entries are skipped.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for raw in entries {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                continue;
            }
            let entry = Entry::parse(raw);
            if !list.entries.contains(&entry) {
                list.entries.push(entry);
            }
        }
        list
    }

    /// Decode a JSON array of strings.
    ///
    /// Malformed input yields an empty list, so a broken allow-list never
    /// grants bypass access.
    pub fn from_json(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(entries) => Self::new(entries),
            Err(e) => {
                warn!(error = %e, "Malformed maintenance allow-list, treating as empty");
                Self::default()
            }
        }
    }

    /// Check whether `client_ip` is covered by any entry.
    pub fn contains(&self, client_ip: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }

        let client_ip = client_ip.trim();
        match parse_addr(client_ip) {
            Some(ip) => self.entries.iter().any(|entry| match entry {
                Entry::Network(net) => net.contains(&ip),
                Entry::Literal(s) => s.eq_ignore_ascii_case(client_ip),
            }),
            None => self.entries.iter().any(|entry| match entry {
                Entry::Literal(s) => s.eq_ignore_ascii_case(client_ip),
                Entry::Network(_) => false,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in display form (single addresses without a prefix length).
    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().map(Entry::display).collect()
    }

    /// Entries that did not parse as an address or network.
    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Literal(s) => Some(s.as_str()),
            Entry::Network(_) => None,
        })
    }
}

/// Parse a CIDR network or a single address (as a host network).
pub fn parse_network(raw: &str) -> Option<IpNet> {
    let raw = raw.trim();
    if let Ok(net) = raw.parse::<IpNet>() {
        return Some(net);
    }
    parse_addr(raw).and_then(host_net)
}

/// Parse an address in canonical form. Brackets around IPv6 literals are
/// accepted and IPv4-mapped IPv6 collapses to IPv4.
pub fn parse_addr(raw: &str) -> Option<IpAddr> {
    let raw = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(raw);
    raw.parse::<IpAddr>().ok().map(|ip| ip.to_canonical())
}

fn host_net(ip: IpAddr) -> Option<IpNet> {
    let prefix = match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    IpNet::new(ip, prefix).ok()
}
