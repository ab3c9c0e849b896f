//! Test server management.
//!
//! Runs storegate in-process on an ephemeral port for integration testing.

use std::net::SocketAddr;
use storegate::config::{self, Config};
use storegate::network::{AppState, Gateway};
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Sales channels every test server starts with.
///
/// `storefront` is open, `b2b` is in maintenance with a mixed allow-list.
pub const DEFAULT_CHANNELS: &str = r#"
[[sales_channel]]
name = "storefront"
hosts = ["shop.test"]

[[sales_channel]]
name = "b2b"
hosts = ["b2b.test"]
maintenance = true
maintenance_ip_allowlist = ["192.168.1.16", "2001:DB8::1", "10.20.0.0/16"]
"#;

pub const ADMIN_TOKEN: &str = "test-token";

/// Default test configuration. The test client connects from loopback,
/// which is a trusted proxy, so forwarding headers are honored.
pub fn default_config() -> String {
    format!(
        r#"
[server]
name = "test.gate"
metrics_port = 0

[listen]
address = "127.0.0.1:0"

[proxy]
trusted = ["127.0.0.1", "::1"]

[routing]
allowed_in_maintenance = ["/theme"]

[admin]
token = "{ADMIN_TOKEN}"
{DEFAULT_CHANNELS}"#
    )
}

/// A test server instance.
pub struct TestServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
    _data_dir: TempDir,
}

impl TestServer {
    /// Spawn a server with the default configuration.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with_config(&default_config()).await
    }

    /// Spawn a server from a TOML configuration.
    ///
    /// The config is written to disk and loaded the same way the binary does.
    pub async fn spawn_with_config(config_content: &str) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let config_path = data_dir.path().join("storegate.toml");
        std::fs::write(&config_path, config_content)?;

        let config = Config::load(&config_path)?;
        if let Err(errors) = config::validate(&config) {
            anyhow::bail!("invalid test config: {errors:?}");
        }

        let state = AppState::from_config(&config);
        let gateway = Gateway::bind(config.listen.address, state).await?;
        let addr = gateway.local_addr()?;

        let task = tokio::spawn(async move {
            let _ = gateway.run().await;
        });

        Ok(Self {
            addr,
            task,
            _data_dir: data_dir,
        })
    }

    /// Create a new test client for this server.
    pub fn client(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::new(self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
