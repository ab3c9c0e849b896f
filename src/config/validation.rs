//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use crate::maintenance::allowlist::parse_network;
use crate::network::admin::ADMIN_PREFIX;
use crate::network::gate::path_under;
use crate::state::normalize_host;
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("sales_channel #{0} has an empty name")]
    MissingChannelName(usize),
    #[error("sales_channel name '{0}' is used more than once")]
    DuplicateChannelName(String),
    #[error("sales_channel '{0}' has no hosts")]
    ChannelWithoutHosts(String),
    #[error("host '{host}' is claimed by more than one sales_channel (second: '{channel}')")]
    DuplicateHost { host: String, channel: String },
    #[error("proxy.trusted entry is not an IP or CIDR network: '{0}'")]
    InvalidTrustedProxy(String),
    #[error("sales_channel '{channel}' allow-list entry is not an IP or CIDR network: '{entry}'")]
    InvalidAllowListEntry { channel: String, entry: String },
    #[error("routing path must start with '/': '{0}'")]
    InvalidRoutePath(String),
    #[error("routing.maintenance_path and routing.error_path must differ, both are '{0}'")]
    MaintenancePathIsErrorPath(String),
    #[error("routing.{field} must not be '/', it would cover every path")]
    RootRoutePath { field: &'static str },
    #[error("routing path '{path}' is under headless prefix '{prefix}' and never sees a sales channel")]
    PageUnderHeadlessPrefix { path: String, prefix: String },
    #[error("admin API at '{0}' is not under any routing.headless_prefixes entry")]
    AdminApiNotHeadless(&'static str),
}

fn is_root(path: &str) -> bool {
    path.starts_with('/') && path.trim_end_matches('/').is_empty()
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Trusted proxies
    for entry in &config.proxy.trusted {
        if parse_network(entry).is_none() {
            errors.push(ValidationError::InvalidTrustedProxy(entry.clone()));
        }
    }

    // Routing paths
    let routing = &config.routing;
    let paths = [&routing.maintenance_path, &routing.error_path]
        .into_iter()
        .chain(&routing.allowed_in_maintenance)
        .chain(&routing.headless_prefixes);
    for path in paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::InvalidRoutePath(path.clone()));
        }
    }
    let fields = [
        ("maintenance_path", std::slice::from_ref(&routing.maintenance_path)),
        ("error_path", std::slice::from_ref(&routing.error_path)),
        ("allowed_in_maintenance", routing.allowed_in_maintenance.as_slice()),
        ("headless_prefixes", routing.headless_prefixes.as_slice()),
    ];
    for (field, paths) in fields {
        if paths.iter().any(|p| is_root(p)) {
            errors.push(ValidationError::RootRoutePath { field });
        }
    }
    for page in [&routing.maintenance_path, &routing.error_path] {
        if let Some(prefix) = routing
            .headless_prefixes
            .iter()
            .find(|prefix| !is_root(prefix) && path_under(page, prefix))
        {
            errors.push(ValidationError::PageUnderHeadlessPrefix {
                path: page.clone(),
                prefix: prefix.clone(),
            });
        }
    }
    if !routing
        .headless_prefixes
        .iter()
        .any(|prefix| path_under(ADMIN_PREFIX, prefix))
    {
        errors.push(ValidationError::AdminApiNotHeadless(ADMIN_PREFIX));
    }
    if routing.maintenance_path == routing.error_path {
        errors.push(ValidationError::MaintenancePathIsErrorPath(
            routing.maintenance_path.clone(),
        ));
    }

    // Sales channels
    let mut names = HashSet::new();
    let mut hosts = HashSet::new();
    for (index, channel) in config.sales_channels.iter().enumerate() {
        if channel.name.trim().is_empty() {
            errors.push(ValidationError::MissingChannelName(index));
        } else if !names.insert(channel.name.as_str()) {
            errors.push(ValidationError::DuplicateChannelName(channel.name.clone()));
        }

        if channel.hosts.is_empty() {
            errors.push(ValidationError::ChannelWithoutHosts(channel.name.clone()));
        }
        for host in &channel.hosts {
            if !hosts.insert(normalize_host(host)) {
                errors.push(ValidationError::DuplicateHost {
                    host: host.clone(),
                    channel: channel.name.clone(),
                });
            }
        }

        for entry in &channel.maintenance_ip_allowlist {
            if parse_network(entry).is_none() {
                errors.push(ValidationError::InvalidAllowListEntry {
                    channel: channel.name.clone(),
                    entry: entry.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_valid_config() -> String {
        r#"
[listen]
address = "127.0.0.1:8080"

[proxy]
trusted = ["10.0.0.0/8", "172.17.1.12"]

[[sales_channel]]
name = "storefront"
hosts = ["shop.example.com"]
maintenance_ip_allowlist = ["192.168.1.16", "2003:F0::/32"]
"#
        .to_string()
    }

    #[test]
    fn test_valid_config_passes() {
        let config: Config = toml::from_str(&minimal_valid_config()).unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_contrib_example_passes() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/contrib/storegate.toml");
        let config = Config::load(path).unwrap();
        assert!(validate(&config).is_ok());
        assert_eq!(config.sales_channels.len(), 2);
    }

    #[test]
    fn test_invalid_trusted_proxy_fails() {
        let toml = r#"
[proxy]
trusted = ["proxy.internal"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidTrustedProxy(_))));
    }

    #[test]
    fn test_duplicate_channel_and_host_fail() {
        let toml = r#"
[[sales_channel]]
name = "storefront"
hosts = ["shop.example.com"]

[[sales_channel]]
name = "storefront"
hosts = ["SHOP.example.com"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateChannelName(_))));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateHost { .. })));
    }

    #[test]
    fn test_channel_without_name_or_hosts_fails() {
        let toml = r#"
[[sales_channel]]
name = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingChannelName(0))));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ChannelWithoutHosts(_))));
    }

    #[test]
    fn test_invalid_allowlist_entry_fails() {
        let toml = r#"
[[sales_channel]]
name = "storefront"
hosts = ["shop.example.com"]
maintenance_ip_allowlist = ["192.168.1.300"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::InvalidAllowListEntry { .. }))
        );
    }

    #[test]
    fn test_maintenance_page_under_headless_prefix_fails() {
        let toml = r#"
[routing]
maintenance_path = "/api/maintenance"
error_path = "/admin/error"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        let offending: Vec<&str> = errors
            .iter()
            .filter_map(|e| match e {
                ValidationError::PageUnderHeadlessPrefix { path, .. } => Some(path.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(offending, vec!["/api/maintenance", "/admin/error"]);
    }

    #[test]
    fn test_root_route_paths_fail() {
        let toml = r#"
[routing]
maintenance_path = "/"
allowed_in_maintenance = ["/theme", "/"]
headless_prefixes = ["/api", "//"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        let fields: Vec<&str> = errors
            .iter()
            .filter_map(|e| match e {
                ValidationError::RootRoutePath { field } => Some(*field),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec!["maintenance_path", "allowed_in_maintenance", "headless_prefixes"]
        );
    }

    #[test]
    fn test_admin_api_outside_headless_prefixes_fails() {
        let toml = r#"
[routing]
headless_prefixes = ["/admin"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::AdminApiNotHeadless("/api/_admin")))
        );
    }

    #[test]
    fn test_route_paths_fail() {
        let toml = r#"
[routing]
maintenance_path = "maintenance"
error_path = "maintenance"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidRoutePath(_))));
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::MaintenancePathIsErrorPath(_)))
        );
    }
}
