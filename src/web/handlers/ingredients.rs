//! # Ingredient Handlers

use axum::extract::State;
use axum::Json;

use crate::models::Ingredient;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::extractors::{IdPath, QueryParams};
use crate::web::state::AppState;

/// Ingredients, optionally filtered by name prefix: GET /api/ingredients/?name=
pub async fn list_ingredients(
    State(state): State<AppState>,
    query: QueryParams,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let prefix = query.get("name").filter(|name| !name.is_empty());
    Ok(Json(Ingredient::list(&state.db_pool, prefix).await?))
}

/// GET /api/ingredients/{id}/
pub async fn get_ingredient(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<Ingredient>> {
    Ingredient::find_by_id(&state.db_pool, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}
