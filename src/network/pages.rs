//! Maintenance page, error page and the storefront placeholder.

use crate::maintenance::InboundRequest;
use crate::network::gate::AppState;
use axum::Extension;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use http::header::RETRY_AFTER;
use http::{StatusCode, Uri};

fn channel_name(inbound: &Option<Extension<InboundRequest>>) -> &str {
    inbound
        .as_ref()
        .and_then(|Extension(r)| r.sales_channel.as_deref())
        .unwrap_or("storefront")
}

/// `503 Service Unavailable` with `Retry-After`.
pub async fn maintenance_page(
    State(state): State<AppState>,
    inbound: Option<Extension<InboundRequest>>,
) -> Response {
    let retry_after = state.classifier.routing().retry_after_secs;
    let body = format!(
        "<!doctype html><html><head><title>Maintenance</title></head>\
         <body><h1>{} is under maintenance</h1>\
         <p>Please try again later.</p></body></html>",
        escape(channel_name(&inbound))
    );
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(RETRY_AFTER, retry_after.to_string())],
        Html(body),
    )
        .into_response()
}

pub async fn error_page() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<!doctype html><html><body><h1>Something went wrong</h1></body></html>"),
    )
        .into_response()
}

/// Stand-in for the storefront behind the gate.
pub async fn storefront(uri: Uri, inbound: Option<Extension<InboundRequest>>) -> Response {
    let body = format!(
        "<!doctype html><html><body><h1>{}</h1><p>{}</p></body></html>",
        escape(channel_name(&inbound)),
        escape(uri.path())
    );
    Html(body).into_response()
}

/// Minimal HTML escaping for text nodes.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
