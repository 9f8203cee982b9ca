//! # Short Link Handler

use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::models::Recipe;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::extractors::IdPath;
use crate::web::state::AppState;

/// Redirect a short link to the recipe page: GET /r/{id}/
pub async fn follow_short_link(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<impl IntoResponse> {
    if !Recipe::exists(&state.db_pool, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok((StatusCode::FOUND, [(LOCATION, format!("/recipes/{id}"))]))
}
