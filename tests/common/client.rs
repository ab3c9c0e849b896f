//! Test client.
//!
//! Thin reqwest wrapper that resolves the test sales channel hosts to the
//! test server and never follows redirects, so gate decisions stay visible.

use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::net::SocketAddr;

use super::server::ADMIN_TOKEN;

/// Hosts resolved to the test server.
const HOSTS: &[&str] = &["shop.test", "b2b.test"];

pub struct TestClient {
    http: Client,
    port: u16,
}

impl TestClient {
    pub fn new(addr: SocketAddr) -> anyhow::Result<Self> {
        let mut builder = Client::builder().redirect(Policy::none()).no_proxy();
        for host in HOSTS {
            builder = builder.resolve(host, addr);
        }
        Ok(Self {
            http: builder.build()?,
            port: addr.port(),
        })
    }

    fn url(&self, host: &str, path: &str) -> String {
        format!("http://{}:{}{}", host, self.port, path)
    }

    /// GET builder for `path` on `host`.
    pub fn get(&self, host: &str, path: &str) -> RequestBuilder {
        self.http.get(self.url(host, path))
    }

    /// GET `path` on `host` as a direct (non-forwarded) visitor.
    pub async fn visit(&self, host: &str, path: &str) -> anyhow::Result<Response> {
        Ok(self.get(host, path).send().await?)
    }

    /// GET `path` on `host` as `client_ip`, forwarded by a trusted proxy.
    pub async fn visit_as(&self, host: &str, path: &str, client_ip: &str) -> anyhow::Result<Response> {
        let forwarded = if client_ip.contains(':') {
            format!("by=172.17.1.12;for=\"[{client_ip}]\"")
        } else {
            format!("by=172.17.1.12;for={client_ip}")
        };
        Ok(self
            .get(host, path)
            .header("Forwarded", forwarded)
            .send()
            .await?)
    }

    /// Admin API request builder with the test token attached.
    #[allow(dead_code)]
    pub fn admin(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.admin_without_token(method, path).bearer_auth(ADMIN_TOKEN)
    }

    #[allow(dead_code)]
    pub fn admin_without_token(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = self.url("127.0.0.1", &format!("/api/_admin{path}"));
        self.http.request(method, url)
    }
}

/// Assert a `307 Temporary Redirect` to `location`.
#[allow(dead_code)]
pub fn assert_redirect(response: &Response, location: &str) {
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let actual = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(actual, location);
}
