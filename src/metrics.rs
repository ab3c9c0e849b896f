//! Prometheus metrics collection for storegate.
//!
//! Exposed on a separate HTTP endpoint (see [`crate::http`]).
//!
//! - `storegate_maintenance_decisions_total{decision}` - Gate outcomes
//! - `storegate_allowlist_bypass_total` - Allow-listed clients let through during maintenance
//! - `storegate_request_duration_seconds{route}` - Gated request latency
//! - `storegate_channels_in_maintenance` - Sales channels currently in maintenance
//! - `storegate_admin_errors_total{code}` - Admin API failures

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Gate decisions by outcome.
pub static DECISIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Requests let through because the client is allow-listed.
pub static ALLOWLIST_BYPASS: OnceLock<IntCounter> = OnceLock::new();

/// Admin API errors by code.
pub static ADMIN_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

/// Sales channels with maintenance mode active.
pub static CHANNELS_IN_MAINTENANCE: OnceLock<IntGauge> = OnceLock::new();

/// Gated request latency by route kind.
pub static REQUEST_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(DECISIONS, IntCounterVec::new(Opts::new("storegate_maintenance_decisions_total", "Maintenance gate decisions by outcome"), &["decision"]));
    register!(ALLOWLIST_BYPASS, IntCounter::new("storegate_allowlist_bypass_total", "Allow-listed requests let through during maintenance"));
    register!(ADMIN_ERRORS, IntCounterVec::new(Opts::new("storegate_admin_errors_total", "Admin API errors by code"), &["code"]));
    register!(CHANNELS_IN_MAINTENANCE, IntGauge::new("storegate_channels_in_maintenance", "Sales channels with maintenance mode active"));
    register!(REQUEST_LATENCY, HistogramVec::new(
        HistogramOpts::new("storegate_request_duration_seconds", "Gated request latency by route kind")
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["route"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record a gate decision.
#[inline]
pub fn record_decision(decision: &str) {
    if let Some(c) = DECISIONS.get() {
        c.with_label_values(&[decision]).inc();
    }
}

/// Record an allow-list bypass.
#[inline]
pub fn record_allowlist_bypass() {
    if let Some(c) = ALLOWLIST_BYPASS.get() {
        c.inc();
    }
}

/// Record an admin API error.
#[inline]
pub fn record_admin_error(code: &str) {
    if let Some(c) = ADMIN_ERRORS.get() {
        c.with_label_values(&[code]).inc();
    }
}

/// Record gated request latency.
#[inline]
pub fn record_request(route: &str, duration_secs: f64) {
    if let Some(h) = REQUEST_LATENCY.get() {
        h.with_label_values(&[route]).observe(duration_secs);
    }
}

/// Update the maintenance channel gauge.
#[inline]
pub fn set_channels_in_maintenance(count: i64) {
    if let Some(g) = CHANNELS_IN_MAINTENANCE.get() {
        g.set(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        // Safe to call more than once: OnceLock keeps the first registration
        init();

        record_decision("redirect_maintenance");
        record_allowlist_bypass();
        record_admin_error("unknown_channel");
        record_request("standard", 0.002);
        set_channels_in_maintenance(2);

        let output = gather_metrics();
        assert!(output.contains("storegate_maintenance_decisions_total"));
        assert!(output.contains("storegate_allowlist_bypass_total"));
        assert!(output.contains("storegate_channels_in_maintenance"));
    }
}
