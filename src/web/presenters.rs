//! Assembly of response representations from model rows
//!
//! Related rows (tags, ingredient lines, authors, recent recipes) are loaded
//! in one query per kind for the whole page, never per item.

use std::collections::HashMap;

use crate::models::{Ingredient, RecipeIngredient, RecipeRow, RecipeSummary, Tag, UserProfile};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::response_types::{
    RecipeResponse, RecipeShortResponse, SubscriptionResponse, UserResponse,
};
use crate::web::state::AppState;

pub fn user_response(state: &AppState, profile: UserProfile) -> UserResponse {
    UserResponse {
        email: profile.email,
        id: profile.id,
        username: profile.username,
        first_name: profile.first_name,
        last_name: profile.last_name,
        is_subscribed: profile.is_subscribed,
        avatar: profile.avatar.as_deref().map(|path| state.media.url(path)),
    }
}

pub fn recipe_short_response(state: &AppState, recipe: RecipeSummary) -> RecipeShortResponse {
    RecipeShortResponse {
        id: recipe.id,
        name: recipe.name,
        image: state.media.url(&recipe.image),
        cooking_time: recipe.cooking_time,
    }
}

/// Full representations for a page of recipes, preserving row order
pub async fn recipe_responses(
    state: &AppState,
    rows: Vec<RecipeRow>,
    viewer: Option<i64>,
) -> ApiResult<Vec<RecipeResponse>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut author_ids: Vec<i64> = rows.iter().map(|r| r.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
    for row in Tag::for_recipes(&state.db_pool, &recipe_ids).await? {
        tags.entry(row.recipe_id).or_default().push(row.into());
    }

    let mut ingredients: HashMap<i64, Vec<RecipeIngredient>> = HashMap::new();
    for row in Ingredient::for_recipes(&state.db_pool, &recipe_ids).await? {
        ingredients.entry(row.recipe_id).or_default().push(row);
    }

    let authors: HashMap<i64, UserResponse> =
        UserProfile::find_many(&state.db_pool, &author_ids, viewer)
            .await?
            .into_iter()
            .map(|profile| (profile.id, user_response(state, profile)))
            .collect();

    rows.into_iter()
        .map(|row| {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or(ApiError::Internal)?;
            Ok(RecipeResponse {
                id: row.id,
                tags: tags.remove(&row.id).unwrap_or_default(),
                author,
                ingredients: ingredients.remove(&row.id).unwrap_or_default(),
                is_favorited: row.is_favorited,
                is_in_shopping_cart: row.is_in_shopping_cart,
                name: row.name,
                image: state.media.url(&row.image),
                text: row.text,
                cooking_time: row.cooking_time,
            })
        })
        .collect()
}

/// Single full representation
pub async fn recipe_response(
    state: &AppState,
    row: RecipeRow,
    viewer: Option<i64>,
) -> ApiResult<RecipeResponse> {
    recipe_responses(state, vec![row], viewer)
        .await?
        .pop()
        .ok_or(ApiError::Internal)
}

/// Followed authors with their newest recipes, truncated to `recipes_limit`
pub async fn subscription_responses(
    state: &AppState,
    profiles: Vec<UserProfile>,
    recipes_limit: Option<i64>,
) -> ApiResult<Vec<SubscriptionResponse>> {
    if profiles.is_empty() {
        return Ok(Vec::new());
    }

    let author_ids: Vec<i64> = profiles.iter().map(|p| p.id).collect();

    let mut recipes: HashMap<i64, Vec<RecipeShortResponse>> = HashMap::new();
    for recipe in RecipeSummary::recent_by_authors(&state.db_pool, &author_ids, recipes_limit).await? {
        recipes
            .entry(recipe.author_id)
            .or_default()
            .push(recipe_short_response(state, recipe));
    }

    let counts: HashMap<i64, i64> = RecipeSummary::counts_by_authors(&state.db_pool, &author_ids)
        .await?
        .into_iter()
        .collect();

    Ok(profiles
        .into_iter()
        .map(|profile| {
            let id = profile.id;
            SubscriptionResponse {
                user: user_response(state, profile),
                recipes: recipes.remove(&id).unwrap_or_default(),
                recipes_count: counts.get(&id).copied().unwrap_or(0),
            }
        })
        .collect())
}
