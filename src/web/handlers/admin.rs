//! # Admin Listing Handlers
//!
//! Staff-only JSON listings under `/admin/` with the search fields and
//! filters of the site administration pages.

use axum::extract::State;
use axum::Json;

use crate::models::{AdminRecipeRow, AdminUserRow, Ingredient, Tag};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::extractors::{QueryParams, StaffUser};
use crate::web::state::AppState;

fn search_term(query: &QueryParams) -> Option<&str> {
    query.get("search").map(str::trim).filter(|s| !s.is_empty())
}

/// GET /admin/users/?search=
pub async fn list_users(
    State(state): State<AppState>,
    _staff: StaffUser,
    query: QueryParams,
) -> ApiResult<Json<Vec<AdminUserRow>>> {
    Ok(Json(AdminUserRow::search(&state.db_pool, search_term(&query)).await?))
}

/// GET /admin/recipes/?search=&author=&tags=
pub async fn list_recipes(
    State(state): State<AppState>,
    _staff: StaffUser,
    query: QueryParams,
) -> ApiResult<Json<Vec<AdminRecipeRow>>> {
    let author_id = match query.get("author").filter(|a| !a.is_empty()) {
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| ApiError::field("author", "Enter a number."))?,
        ),
        None => None,
    };

    let rows = AdminRecipeRow::search(
        &state.db_pool,
        search_term(&query),
        author_id,
        &query.get_all("tags"),
    )
    .await?;
    Ok(Json(rows))
}

/// GET /admin/ingredients/?search=
pub async fn list_ingredients(
    State(state): State<AppState>,
    _staff: StaffUser,
    query: QueryParams,
) -> ApiResult<Json<Vec<Ingredient>>> {
    Ok(Json(Ingredient::search(&state.db_pool, search_term(&query)).await?))
}

/// GET /admin/tags/?search=
pub async fn list_tags(
    State(state): State<AppState>,
    _staff: StaffUser,
    query: QueryParams,
) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(Tag::search(&state.db_pool, search_term(&query)).await?))
}
