//! Reverse proxy for `/api/**` requests no explicit route claims.
//!
//! Method, headers, path, query and body are relayed to a fixed origin; the
//! request body streams out and the origin's status, headers and body stream
//! back untouched. Only hop-by-hop headers are dropped, in both directions.

use anyhow::{Context, Result};
use axum::{
    body::{Body, HttpBody},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, Uri},
    response::Response,
};
use reqwest::{redirect, Client};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::api::AppState;
use crate::config::parse_proxy_target;
use crate::error::{AppError, AppResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

pub struct ReverseProxy {
    client: Client,
    target: Url,
}

impl ReverseProxy {
    /// The target is parsed here, once; a bad value stops start-up.
    pub fn new(target: &str) -> Result<Self> {
        let target = parse_proxy_target(target)?;
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to build proxy HTTP client")?;
        tracing::info!("Reverse proxy target: {}", target);
        Ok(Self { client, target })
    }

    fn upstream_url(&self, uri: &Uri) -> Url {
        let mut url = self.target.clone();
        url.set_path(uri.path());
        url.set_query(uri.query());
        url
    }

    pub async fn forward(&self, req: Request) -> AppResult<Response> {
        let (parts, body) = req.into_parts();
        let url = self.upstream_url(&parts.uri);

        let mut headers = parts.headers;
        let original_host = headers.remove(header::HOST);
        strip_hop_by_hop(&mut headers);
        if let Some(host) = original_host {
            headers.insert(HeaderName::from_static("x-forwarded-host"), host);
        }

        tracing::debug!(method = %parts.method, url = %url, "Forwarding request");

        let mut builder = self.client.request(parts.method.clone(), url.clone()).headers(headers);
        if body.size_hint().exact() != Some(0) {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream = builder.send().await.map_err(|e| {
            AppError::BadGateway(format!("{} {} failed: {}", parts.method, url, e))
        })?;

        let status = upstream.status();
        let mut response_headers = upstream.headers().clone();
        strip_hop_by_hop(&mut response_headers);

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}

/// Removes the fixed hop-by-hop set plus any header the `Connection` value names.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

/// Fallback handler mounted under `/api/`.
pub async fn forward(State(state): State<Arc<AppState>>, req: Request) -> AppResult<Response> {
    state.proxy.forward(req).await
}
