//! Trusted-proxy client address resolution.
//!
//! Reads the RFC 7239 `Forwarded` header or `X-Forwarded-For` to recover the
//! real client address when the peer is a trusted reverse proxy (load
//! balancer, CDN edge). Headers from untrusted peers are ignored.

use crate::config::ProxyConfig;
use crate::maintenance::allowlist::{parse_addr, parse_network};
use anyhow::{Result, bail};
use http::HeaderMap;
use http::header::FORWARDED;
use ipnet::IpNet;
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, warn};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Max number of hops read from a forwarding chain.
const MAX_HOPS: usize = 32;

/// Source of the client address the maintenance allow-list is checked against.
pub trait ClientIpSource: Send + Sync {
    fn client_ip(&self, peer: SocketAddr, headers: &HeaderMap) -> IpAddr;
}

/// Uses the socket peer address and never looks at headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeerAddress;

impl ClientIpSource for PeerAddress {
    fn client_ip(&self, peer: SocketAddr, _headers: &HeaderMap) -> IpAddr {
        peer.ip().to_canonical()
    }
}

/// Resolves the client address through a chain of trusted proxies.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies {
    trusted: Vec<IpNet>,
    forwarded: bool,
    x_forwarded_for: bool,
}

impl TrustedProxies {
    pub fn from_config(config: &ProxyConfig) -> Self {
        let trusted = config
            .trusted
            .iter()
            .filter_map(|entry| {
                let net = parse_network(entry);
                if net.is_none() {
                    warn!(entry = %entry, "Ignoring invalid trusted proxy");
                }
                net
            })
            .collect();

        Self {
            trusted,
            forwarded: config.forwarded,
            x_forwarded_for: config.x_forwarded_for,
        }
    }

    /// Check if an address belongs to a trusted proxy.
    pub fn is_trusted(&self, ip: IpAddr) -> bool {
        self.trusted.iter().any(|net| net.contains(&ip))
    }

    /// Forwarding chain announced by the proxy, client first.
    ///
    /// `Forwarded` wins over `X-Forwarded-For` when both are enabled and present.
    fn chain(&self, headers: &HeaderMap) -> Result<Option<Vec<Option<IpAddr>>>> {
        if self.forwarded && headers.contains_key(FORWARDED) {
            let mut hops = Vec::new();
            for value in headers.get_all(FORWARDED) {
                hops.extend(parse_forwarded(value.to_str()?)?);
            }
            return Ok(Some(hops));
        }

        if self.x_forwarded_for && headers.contains_key(X_FORWARDED_FOR) {
            let mut hops = Vec::new();
            for value in headers.get_all(X_FORWARDED_FOR) {
                hops.extend(parse_x_forwarded_for(value.to_str()?)?);
            }
            return Ok(Some(hops));
        }

        Ok(None)
    }
}

impl ClientIpSource for TrustedProxies {
    fn client_ip(&self, peer: SocketAddr, headers: &HeaderMap) -> IpAddr {
        let peer_ip = peer.ip().to_canonical();
        if !self.is_trusted(peer_ip) {
            return peer_ip;
        }

        let hops = match self.chain(headers) {
            Ok(Some(hops)) => hops,
            Ok(None) => return peer_ip,
            Err(e) => {
                debug!(peer = %peer_ip, error = %e, "Unreadable forwarding header, using peer address");
                return peer_ip;
            }
        };

        // Right to left: skip our own proxies, the first foreign hop is the client
        let mut last_valid = peer_ip;
        for hop in hops.into_iter().rev() {
            let Some(ip) = hop else {
                break;
            };
            last_valid = ip;
            if !self.is_trusted(ip) {
                break;
            }
        }
        last_valid
    }
}

/// Parse the `for=` parameters of an RFC 7239 `Forwarded` header value.
///
/// Elements without a usable `for=` yield `None` (`unknown`, obfuscated
/// identifiers such as `_hidden`).
pub fn parse_forwarded(value: &str) -> Result<Vec<Option<IpAddr>>> {
    let mut hops = Vec::new();
    for element in value.split(',') {
        if hops.len() >= MAX_HOPS {
            bail!("Forwarded header has more than {MAX_HOPS} hops");
        }
        let node = element.split(';').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            key.trim().eq_ignore_ascii_case("for").then_some(value)
        });
        hops.push(node.and_then(parse_node));
    }
    Ok(hops)
}

/// Parse an `X-Forwarded-For` header value.
pub fn parse_x_forwarded_for(value: &str) -> Result<Vec<Option<IpAddr>>> {
    let hops: Vec<Option<IpAddr>> = value.split(',').map(parse_node).collect();
    if hops.len() > MAX_HOPS {
        bail!("X-Forwarded-For header has more than {MAX_HOPS} hops");
    }
    Ok(hops)
}

/// Parse a single node: `192.0.2.60`, `"192.0.2.60:4711"`, `"[2001:db8::1]:4711"`.
fn parse_node(raw: &str) -> Option<IpAddr> {
    let node = raw.trim().trim_matches('"').trim();

    if let Some(rest) = node.strip_prefix('[') {
        let end = rest.find(']')?;
        return parse_addr(&rest[..end]);
    }

    // A single colon can only be an IPv4 port
    let host = match node.split_once(':') {
        Some((host, port)) if !port.contains(':') => host,
        _ => node,
    };
    parse_addr(host)
}
