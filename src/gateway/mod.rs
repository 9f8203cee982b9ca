//! # Gateway
//!
//! Reverse proxy in front of the API server and the built frontend.
//!
//! ```text
//! /api/*    -> upstream, path unchanged, Host preserved
//! /admin/*  -> upstream /admin/*
//! /r/*      -> upstream (short links)
//! /media/*  -> media directory, prefix stripped
//! /*        -> static directory, falling back to index.html
//! ```
//!
//! The routing table comes from `[[gateway.routes]]`; see [`routing`].

pub mod errors;
pub mod proxy;
pub mod routing;
pub mod static_files;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::header::CONTENT_LENGTH;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use crate::config::GatewayConfig;
use crate::error::{FoodgramError, Result};
use errors::GatewayError;
use proxy::ProxySettings;
use routing::{Resolution, RouteTable};

/// Shared gateway state
#[derive(Clone)]
pub struct GatewayState {
    pub table: Arc<RouteTable>,
    pub client: reqwest::Client,
    pub settings: ProxySettings,
}

impl GatewayState {
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let table = RouteTable::from_config(config)?;
        let settings = ProxySettings {
            max_body_bytes: config.client_max_body_size_bytes(),
            timeout: Duration::from_secs(config.upstream_timeout_seconds),
        };
        let client = proxy::build_client(&settings)
            .map_err(|e| FoodgramError::validation(format!("cannot build upstream client: {e}")))?;

        info!(
            routes = table.routes().len(),
            static_root = %table.spa_root().display(),
            max_body_bytes = settings.max_body_bytes,
            upstream_timeout_seconds = config.upstream_timeout_seconds,
            "Gateway routing table loaded"
        );

        Ok(Self {
            table: Arc::new(table),
            client,
            settings,
        })
    }
}

/// Create the gateway application
pub fn create_gateway_app(state: GatewayState) -> Router {
    Router::new()
        .route("/gateway/health", get(gateway_health))
        .fallback(dispatch)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            reject_oversized_body,
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn gateway_health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "timestamp": chrono::Utc::now() }))
}

/// Reject bodies whose declared length is over the limit before reading them
async fn reject_oversized_body(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if let Some(length) = declared {
        if length > state.settings.max_body_bytes {
            return GatewayError::PayloadTooLarge {
                limit: state.settings.max_body_bytes,
            }
            .into_response();
        }
    }

    next.run(request).await
}

/// Route one request through the table
async fn dispatch(State(state): State<GatewayState>, request: Request) -> Response {
    let path = request.uri().path().to_string();

    match state.table.resolve(&path) {
        Resolution::Proxy { base_url, path } => {
            proxy::forward(&state.client, &state.settings, request, base_url, &path)
                .await
                .unwrap_or_else(IntoResponse::into_response)
        }
        Resolution::Static { root, path } => static_files::serve_dir(root, &path, request).await,
        Resolution::Spa => {
            static_files::serve_spa(state.table.spa_root(), state.table.spa_index(), request).await
        }
    }
}
