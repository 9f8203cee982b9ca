//! # Web API Module
//!
//! Axum-based REST API for the recipe site. The gateway forwards `/api/`,
//! `/admin/` and `/r/` here.
//!
//! ## Core Components
//!
//! - [`routes`] - HTTP route definitions and organization
//! - [`handlers`] - Request handlers for different endpoint groups
//! - [`middleware`] - Token authentication and request ids
//! - [`extractors`] - Users, path ids, JSON bodies, query strings
//! - [`errors`] - Error types and their response bodies
//! - [`state`] - Shared application state

pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod presenters;
pub mod response_types;
pub mod routes;
pub mod state;
pub mod validation;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::Router;
use state::AppState;

/// Create the main Axum application with all routes and middleware
///
/// Token authentication runs for every route; handlers pick the access level
/// they need through their extractors.
pub fn create_app(app_state: AppState) -> Router {
    let request_timeout = Duration::from_millis(app_state.config.server.request_timeout_ms);
    let body_limit = (app_state.config.server.max_request_size_mb as usize) * 1024 * 1024;

    let public_routes = Router::new().merge(routes::health_routes());

    let authenticated_routes = Router::new()
        .nest("/api", routes::api_routes())
        .nest("/admin", routes::admin_routes())
        .merge(routes::short_link_routes())
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::authenticate,
        ));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .fallback(|| async { errors::ApiError::NotFound })
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(
            middleware::request_id::add_request_id,
        ))
        .layer(tower_http::timeout::TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}
