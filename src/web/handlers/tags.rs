//! # Tag Handlers

use axum::extract::State;
use axum::Json;

use crate::models::Tag;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::extractors::IdPath;
use crate::web::state::AppState;

/// All tags, unpaginated: GET /api/tags/
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(Tag::list_all(&state.db_pool).await?))
}

/// GET /api/tags/{id}/
pub async fn get_tag(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<Tag>> {
    Tag::find_by_id(&state.db_pool, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}
