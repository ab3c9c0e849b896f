//! Trusted reverse proxy configuration.

use serde::Deserialize;

use super::types::default_true;

/// Reverse proxies allowed to forward the real client address.
///
/// Forwarding headers from any other peer are ignored, so clients cannot
/// spoof an allow-listed address.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Trusted proxy addresses or CIDR networks.
    #[serde(default)]
    pub trusted: Vec<String>,
    /// Honor the RFC 7239 `Forwarded` header (default: true).
    #[serde(default = "default_true")]
    pub forwarded: bool,
    /// Honor `X-Forwarded-For` when no `Forwarded` header is present (default: true).
    #[serde(default = "default_true")]
    pub x_forwarded_for: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            trusted: Vec::new(),
            forwarded: true,
            x_forwarded_for: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_trust_nobody_and_honor_both_headers() {
        let config = ProxyConfig::default();
        assert!(config.trusted.is_empty());
        assert!(config.forwarded);
        assert!(config.x_forwarded_for);
    }

    #[test]
    fn header_switches_deserialize() {
        let config: ProxyConfig = toml::from_str(
            r#"
trusted = ["10.0.0.0/8", "172.17.1.12"]
x_forwarded_for = false
"#,
        )
        .unwrap();
        assert_eq!(config.trusted.len(), 2);
        assert!(config.forwarded);
        assert!(!config.x_forwarded_for);
    }
}
