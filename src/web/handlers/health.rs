//! # Health Check Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::error;

use crate::database::connection::health_check;
use crate::web::response_types::{HealthResponse, ReadinessResponse};
use crate::web::state::AppState;

/// Basic health check endpoint: GET /health
///
/// Returns OK whenever the process is serving requests.
pub async fn basic_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}

/// Readiness probe: GET /ready
///
/// Ready only when the database answers.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let (status, database) = match health_check(&state.db_pool).await {
        Ok(true) => (StatusCode::OK, "ok"),
        Ok(false) => (StatusCode::SERVICE_UNAVAILABLE, "unexpected response"),
        Err(e) => {
            error!(error = %e, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let body = ReadinessResponse {
        status: if status == StatusCode::OK { "ready" } else { "not_ready" }.to_string(),
        database: database.to_string(),
        timestamp: Utc::now(),
    };

    (status, Json(body))
}
