//! Typed per-request view consumed by the maintenance resolver.

use super::allowlist::AllowList;
use std::sync::Arc;

/// How the matched route behaves while maintenance mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteKind {
    /// Ordinary storefront route.
    #[default]
    Standard,
    /// Route that stays reachable during maintenance (the maintenance page
    /// itself, theme assets, ...).
    AllowedInMaintenance,
    /// Error rendering route.
    ErrorController,
}

impl RouteKind {
    /// True for every route that must not be redirected to the maintenance page.
    #[inline]
    pub fn is_allowed_in_maintenance(self) -> bool {
        !matches!(self, RouteKind::Standard)
    }

    #[inline]
    pub fn is_error_controller(self) -> bool {
        matches!(self, RouteKind::ErrorController)
    }

    /// Static label for metrics and logs.
    pub fn label(self) -> &'static str {
        match self {
            RouteKind::Standard => "standard",
            RouteKind::AllowedInMaintenance => "allowed_in_maintenance",
            RouteKind::ErrorController => "error",
        }
    }
}

/// Attributes of one inbound request, already resolved by the serving layer.
///
/// The client IP honors trusted-proxy forwarding; the resolver never looks
/// at raw headers.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    /// The request resolved to a storefront sales channel.
    pub is_sales_channel_request: bool,
    /// The resolved sales channel currently has maintenance mode enabled.
    pub is_maintenance_active: bool,
    /// Clients exempt from maintenance redirection for this sales channel.
    pub allowed_ips: Arc<AllowList>,
    /// Classification of the matched route.
    pub route: RouteKind,
    /// `X-Requested-With: XMLHttpRequest` was sent.
    pub is_xml_http_request: bool,
    /// Resolved client address.
    pub client_ip: String,
    /// Name of the resolved sales channel, if any.
    pub sales_channel: Option<String>,
}

impl InboundRequest {
    /// Request from `client_ip` that is not bound to any sales channel.
    pub fn new(client_ip: impl Into<String>) -> Self {
        Self {
            client_ip: client_ip.into(),
            ..Self::default()
        }
    }

    /// Bind the request to a sales channel and its maintenance state.
    pub fn with_sales_channel(
        mut self,
        name: impl Into<String>,
        maintenance_active: bool,
        allowed_ips: Arc<AllowList>,
    ) -> Self {
        self.is_sales_channel_request = true;
        self.is_maintenance_active = maintenance_active;
        self.allowed_ips = allowed_ips;
        self.sales_channel = Some(name.into());
        self
    }

    pub fn with_route(mut self, route: RouteKind) -> Self {
        self.route = route;
        self
    }

    pub fn with_xml_http_request(mut self, xhr: bool) -> Self {
        self.is_xml_http_request = xhr;
        self
    }
}
