//! Route classification configuration.

use serde::Deserialize;

/// Which paths are the maintenance page, the error page, reachable during
/// maintenance, or outside any sales channel.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Path of the maintenance page (default: "/maintenance").
    #[serde(default = "default_maintenance_path")]
    pub maintenance_path: String,
    /// Path of the error page (default: "/error").
    #[serde(default = "default_error_path")]
    pub error_path: String,
    /// Path prefixes that stay reachable during maintenance (theme assets etc.).
    #[serde(default)]
    pub allowed_in_maintenance: Vec<String>,
    /// Path prefixes of headless routes (admin, API). Requests under these
    /// never belong to a sales channel.
    #[serde(default = "default_headless_prefixes")]
    pub headless_prefixes: Vec<String>,
    /// `Retry-After` seconds sent with the maintenance page (default: 300).
    #[serde(default = "default_retry_after_secs")]
    pub retry_after_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            maintenance_path: default_maintenance_path(),
            error_path: default_error_path(),
            allowed_in_maintenance: Vec::new(),
            headless_prefixes: default_headless_prefixes(),
            retry_after_secs: default_retry_after_secs(),
        }
    }
}

fn default_maintenance_path() -> String {
    "/maintenance".to_string()
}

fn default_error_path() -> String {
    "/error".to_string()
}

fn default_headless_prefixes() -> Vec<String> {
    vec!["/api".to_string(), "/admin".to_string()]
}

fn default_retry_after_secs() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_defaults() {
        let config = RoutingConfig::default();
        assert_eq!(config.maintenance_path, "/maintenance");
        assert_eq!(config.error_path, "/error");
        assert!(config.allowed_in_maintenance.is_empty());
        assert_eq!(config.headless_prefixes, vec!["/api", "/admin"]);
        assert_eq!(config.retry_after_secs, 300);
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let config: RoutingConfig = toml::from_str(r#"maintenance_path = "/wartung""#).unwrap();
        assert_eq!(config.maintenance_path, "/wartung");
        assert_eq!(config.error_path, "/error");
        assert_eq!(config.retry_after_secs, 300);
    }
}
