//! storegate - storefront maintenance-mode gate.

use storegate::config::{self, Config};
use storegate::network::{AppState, Gateway};
use storegate::{http, metrics};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "storegate.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!(
            "Refusing to start with {} configuration error(s). See error messages above.",
            errors.len()
        );
    }

    info!(
        server = %config.server.name,
        channels = config.sales_channels.len(),
        trusted_proxies = config.proxy.trusted.len(),
        "Starting storegate"
    );

    if config.admin.token.is_none() {
        tracing::warn!("Admin API has no token configured and is open to anyone reaching the listener");
    }

    // Prometheus metrics are optional.
    // Convention: metrics_port = 0 disables the HTTP endpoint (used by tests).
    let metrics_port = config.server.metrics_port.unwrap_or(9090);
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        info!("Metrics initialized");

        tokio::spawn(async move {
            http::run_http_server(metrics_port).await;
        });
        info!(port = metrics_port, "Prometheus HTTP server started");
    }

    let state = AppState::from_config(&config);
    info!(
        in_maintenance = state.registry.in_maintenance_count(),
        "Sales channels loaded"
    );

    let gateway = Gateway::bind(config.listen.address, state).await?;
    gateway.run().await?;

    Ok(())
}
