//! Maintenance-mode access decisions.
//!
//! [`MaintenanceModeResolver`] is a pure function over one [`InboundRequest`].
//! It answers three independent questions:
//!
//! | Query | True when |
//! |-------|-----------|
//! | `should_redirect` | visitor must be sent to the maintenance page |
//! | `should_redirect_to_shop` | visitor on the maintenance page must go back to the shop |
//! | `is_maintenance_request` | the sales channel is in maintenance mode |
//!
//! Background requests (XHR) are never redirected, the maintenance page and
//! the error route stay reachable, and allow-listed clients keep access.

pub mod allowlist;
pub mod request;

pub use allowlist::AllowList;
pub use request::{InboundRequest, RouteKind};

/// Routing outcome for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Dispatch to the matched handler.
    Pass,
    /// Redirect to the maintenance page.
    RedirectToMaintenance,
    /// Redirect from the maintenance page back to the shop root.
    RedirectToShop,
}

impl Decision {
    /// Static label for metrics.
    pub fn label(self) -> &'static str {
        match self {
            Decision::Pass => "pass",
            Decision::RedirectToMaintenance => "redirect_maintenance",
            Decision::RedirectToShop => "redirect_shop",
        }
    }
}

/// Stateless maintenance-mode classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintenanceModeResolver;

impl MaintenanceModeResolver {
    pub fn new() -> Self {
        Self
    }

    /// Whether the request must be redirected to the maintenance page.
    pub fn should_redirect(&self, request: &InboundRequest) -> bool {
        self.is_maintenance_request(request)
            && !request.is_xml_http_request
            && !request.route.is_allowed_in_maintenance()
            && !self.is_client_allowed(request)
    }

    /// Whether a visitor of the maintenance page must be sent back to the shop.
    pub fn should_redirect_to_shop(&self, request: &InboundRequest) -> bool {
        !request.is_xml_http_request
            && !request.route.is_error_controller()
            && !(self.is_maintenance_request(request) && !self.is_client_allowed(request))
    }

    /// Whether the request's sales channel currently has maintenance mode active.
    ///
    /// Independent of the allow-list and of route exclusions.
    #[inline]
    pub fn is_maintenance_request(&self, request: &InboundRequest) -> bool {
        request.is_sales_channel_request && request.is_maintenance_active
    }

    /// Whether the client address is on the sales channel's allow-list.
    #[inline]
    pub fn is_client_allowed(&self, request: &InboundRequest) -> bool {
        request.allowed_ips.contains(&request.client_ip)
    }

    /// Combine the verdicts for a request. `on_maintenance_page` selects the
    /// shop-redirect check instead of the maintenance-redirect check.
    pub fn decide(&self, request: &InboundRequest, on_maintenance_page: bool) -> Decision {
        if on_maintenance_page {
            if self.should_redirect_to_shop(request) {
                Decision::RedirectToShop
            } else {
                Decision::Pass
            }
        } else if self.should_redirect(request) {
            Decision::RedirectToMaintenance
        } else {
            Decision::Pass
        }
    }
}
