//! Telemetry utilities for request timing and tracing spans.

use std::time::Instant;

/// Guard for timing a gated request and recording metrics.
///
/// Records request latency when dropped.
pub struct RequestTimer {
    route: &'static str,
    start: Instant,
}

impl RequestTimer {
    /// Start timing a request.
    pub fn new(route: &'static str) -> Self {
        Self {
            route,
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_request(self.route, duration);
    }
}

/// Standardized span constructors for gate observability.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for a gated storefront request.
    pub fn request(method: &str, path: &str, client_ip: &str) -> Span {
        info_span!("request", method = %method, path = %path, client_ip = %client_ip)
    }

    /// Create a span for an admin API call.
    pub fn admin(action: &str, channel: Option<&str>) -> Span {
        if let Some(channel) = channel {
            info_span!("admin", action = %action, channel = %channel)
        } else {
            info_span!("admin", action = %action)
        }
    }
}
