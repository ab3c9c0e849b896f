//! Maintenance gate middleware.
//!
//! Runs before handler dispatch: classifies the request, resolves its sales
//! channel and client address, then redirects or lets it through.

use crate::config::{Config, RoutingConfig};
use crate::maintenance::{Decision, InboundRequest, MaintenanceModeResolver, RouteKind};
use crate::network::forwarded::{ClientIpSource, TrustedProxies};
use crate::state::SalesChannelRegistry;
use crate::telemetry::{RequestTimer, spans};
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use http::HeaderMap;
use http::header::HOST;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{Instrument, debug};

const X_REQUESTED_WITH: &str = "x-requested-with";

/// Shared state of the storefront router.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SalesChannelRegistry>,
    pub classifier: Arc<RequestClassifier>,
    pub client_ips: Arc<dyn ClientIpSource>,
    pub resolver: MaintenanceModeResolver,
    /// Bearer token required by the admin API, if any.
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            registry: Arc::new(SalesChannelRegistry::from_config(&config.sales_channels)),
            classifier: Arc::new(RequestClassifier::new(config.routing.clone())),
            client_ips: Arc::new(TrustedProxies::from_config(&config.proxy)),
            resolver: MaintenanceModeResolver::new(),
            admin_token: config.admin.token.as_deref().map(Arc::from),
        }
    }
}

/// Maps request paths to route kinds.
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    routing: RoutingConfig,
}

impl RequestClassifier {
    pub fn new(routing: RoutingConfig) -> Self {
        Self { routing }
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    /// Route kind of `path`.
    ///
    /// The maintenance and error pages match exactly; anything below them is
    /// an ordinary storefront route.
    pub fn route(&self, path: &str) -> RouteKind {
        if path == self.routing.error_path {
            RouteKind::ErrorController
        } else if self.is_maintenance_page(path)
            || self
                .routing
                .allowed_in_maintenance
                .iter()
                .any(|prefix| path_under(path, prefix))
        {
            RouteKind::AllowedInMaintenance
        } else {
            RouteKind::Standard
        }
    }

    /// Admin and API routes never belong to a sales channel.
    pub fn is_headless(&self, path: &str) -> bool {
        self.routing
            .headless_prefixes
            .iter()
            .any(|prefix| path_under(path, prefix))
    }

    pub fn is_maintenance_page(&self, path: &str) -> bool {
        path == self.routing.maintenance_path
    }
}

/// Segment-aware prefix match: `/api` covers `/api` and `/api/x`, not `/apix`.
pub(crate) fn path_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn is_xml_http_request(headers: &HeaderMap) -> bool {
    headers
        .get(X_REQUESTED_WITH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// `Host` header, or the URI authority for HTTP/2.
fn request_host(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
}

/// Build the resolver input for a request.
pub fn inbound_request(state: &AppState, peer: SocketAddr, request: &Request) -> InboundRequest {
    let path = request.uri().path();
    let client_ip = state.client_ips.client_ip(peer, request.headers());

    let mut inbound = InboundRequest::new(client_ip.to_string())
        .with_route(state.classifier.route(path))
        .with_xml_http_request(is_xml_http_request(request.headers()));

    if !state.classifier.is_headless(path)
        && let Some(channel) = request_host(request).and_then(|h| state.registry.resolve(h))
    {
        inbound = inbound.with_sales_channel(channel.name, channel.maintenance, channel.allowlist);
    }
    inbound
}

/// axum middleware applying maintenance mode.
///
/// Redirects with `307 Temporary Redirect`; passing requests carry their
/// [`InboundRequest`] as an extension.
pub async fn maintenance_gate(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    mut request: Request,
    next: Next,
) -> Response {
    let inbound = inbound_request(&state, peer, &request);
    let _timer = RequestTimer::new(inbound.route.label());
    let span = spans::request(
        request.method().as_str(),
        request.uri().path(),
        &inbound.client_ip,
    );

    let on_maintenance_page = state.classifier.is_maintenance_page(request.uri().path());
    let decision = state.resolver.decide(&inbound, on_maintenance_page);
    crate::metrics::record_decision(decision.label());

    match decision {
        Decision::RedirectToMaintenance => {
            span.in_scope(|| {
                debug!(channel = ?inbound.sales_channel, "Redirecting to maintenance page");
            });
            Redirect::temporary(&state.classifier.routing().maintenance_path).into_response()
        }
        Decision::RedirectToShop => {
            span.in_scope(|| debug!(channel = ?inbound.sales_channel, "Redirecting to shop"));
            Redirect::temporary("/").into_response()
        }
        Decision::Pass => {
            if !on_maintenance_page
                && state.resolver.is_maintenance_request(&inbound)
                && state.resolver.is_client_allowed(&inbound)
            {
                crate::metrics::record_allowlist_bypass();
            }
            request.extensions_mut().insert(inbound);
            next.run(request).instrument(span).await
        }
    }
}
