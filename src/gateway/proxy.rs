//! Request forwarding to an upstream server
//!
//! Method, path, query, headers and body are passed through. The client's
//! `Host` header is kept so the upstream builds absolute URLs for the public
//! hostname. Hop-by-hop headers are dropped in both directions.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use futures::StreamExt;
use tracing::debug;

use super::errors::GatewayError;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const GATEWAY_SCHEME: &str = "http";
const X_REAL_IP: &str = "x-real-ip";

/// Connection-scoped headers that must not be forwarded
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Copy headers, dropping hop-by-hop ones and any named in `Connection`
fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    let connection_listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|v| v.trim().to_ascii_lowercase())
        .collect();

    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || connection_listed.iter().any(|c| c == name.as_str()) {
            continue;
        }
        filtered.append(name.clone(), value.clone());
    }
    filtered
}

/// Add `X-Forwarded-For`, `X-Real-IP` and `X-Forwarded-Proto`
fn add_forwarding_headers(headers: &mut HeaderMap, peer: Option<SocketAddr>) {
    if let Some(peer) = peer {
        let ip = peer.ip().to_string();
        let forwarded_for = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) if !existing.is_empty() => format!("{existing}, {ip}"),
            _ => ip.clone(),
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            headers.insert(X_FORWARDED_FOR, value);
        }
        if let Ok(value) = HeaderValue::from_str(&ip) {
            headers.insert(X_REAL_IP, value);
        }
    }

    // The gateway terminates plain HTTP; a client-supplied value is replaced
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static(GATEWAY_SCHEME));
}

/// Read a request body, failing once it grows past `limit` bytes
async fn read_body(body: Body, limit: usize) -> Result<Vec<u8>, GatewayError> {
    let mut stream = body.into_data_stream();
    let mut buffer = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| GatewayError::BadRequest(e.to_string()))?;
        if buffer.len() + chunk.len() > limit {
            return Err(GatewayError::PayloadTooLarge { limit });
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer)
}

/// Settings shared by every forwarded request
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub max_body_bytes: usize,
    pub timeout: Duration,
}

/// Build the shared upstream client
pub fn build_client(settings: &ProxySettings) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(5).min(settings.timeout))
        .timeout(settings.timeout)
        .build()
}

/// Forward `request` to `base_url` + `path`, keeping the query string
pub async fn forward(
    client: &reqwest::Client,
    settings: &ProxySettings,
    request: Request,
    base_url: &str,
    path: &str,
) -> Result<Response, GatewayError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);

    let (parts, body) = request.into_parts();

    let target = match parts.uri.query() {
        Some(query) => format!("{base_url}{path}?{query}"),
        None => format!("{base_url}{path}"),
    };

    let mut headers = filter_headers(&parts.headers);
    headers.remove(header::CONTENT_LENGTH);
    add_forwarding_headers(&mut headers, peer);

    let body = read_body(body, settings.max_body_bytes).await?;

    debug!(method = %parts.method, target = %target, body_len = body.len(), "Forwarding request");

    let upstream = client
        .request(parts.method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                GatewayError::UpstreamTimeout(settings.timeout.as_secs())
            } else {
                GatewayError::UpstreamUnavailable(e.to_string())
            }
        })?;

    let status = upstream.status();
    let response_headers = filter_headers(upstream.headers());

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;

    Ok(response)
}
