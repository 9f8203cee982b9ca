//! # Recipe Handlers
//!
//! Recipe CRUD, favorites, the shopping cart, the shopping list download and
//! short links under `/api/recipes/`.

use std::collections::HashSet;

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use super::users::media_field_error;
use crate::constants::{
    media_dirs, messages, MAX_COOKING_TIME, MAX_INGREDIENT_AMOUNT, MAX_LENGTH_RECIPE_NAME, MIN_COOKING_TIME,
    MIN_INGREDIENT_AMOUNT, SHOPPING_LIST_FILENAME,
};
use crate::models::{
    Ingredient, IngredientAmount, NewRecipe, Recipe, RecipeCollection, RecipeFilter, RecipeRow,
    RecipeSummary, RecipeUpdate, Tag, User,
};
use crate::services::render_shopping_list;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::extractors::{ApiJson, AuthenticatedUser, IdPath, MaybeUser, QueryParams, RequestUrl};
use crate::web::pagination::{Page, PageRequest};
use crate::web::presenters::{recipe_response, recipe_responses, recipe_short_response};
use crate::web::response_types::{RecipeResponse, RecipeShortResponse, ShortLinkResponse};
use crate::web::state::AppState;
use crate::web::validation::{FieldErrors, IntegerInput};

/// Ingredient line of a recipe payload
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientInput {
    pub id: IntegerInput,
    pub amount: IntegerInput,
}

/// Create and update payload
#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub ingredients: Option<Vec<IngredientInput>>,
    pub tags: Option<Vec<IntegerInput>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<IntegerInput>,
}

/// Paginated, filtered list: GET /api/recipes/
pub async fn list_recipes(
    State(state): State<AppState>,
    viewer: MaybeUser,
    query: QueryParams,
    url: RequestUrl,
) -> ApiResult<Json<Page<RecipeResponse>>> {
    let author_id = match query.get("author").filter(|a| !a.is_empty()) {
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| ApiError::field("author", "Enter a number."))?,
        ),
        None => None,
    };

    let filter = RecipeFilter {
        author_id,
        tag_slugs: query.get_all("tags"),
        is_favorited: query.flag("is_favorited"),
        is_in_shopping_cart: query.flag("is_in_shopping_cart"),
    };
    let request = PageRequest::from_query(&query, &state.config.pagination)?;

    // Personal collections are empty for anonymous callers
    if viewer.0.is_none() && (filter.is_favorited || filter.is_in_shopping_cart) {
        let page = request.checked(0)?;
        return Ok(Json(Page::new(Vec::new(), 0, page, &url)));
    }

    let count = RecipeRow::count(&state.db_pool, viewer.id(), &filter).await?;
    let page = request.checked(count)?;
    let rows = RecipeRow::list(
        &state.db_pool,
        viewer.id(),
        &filter,
        page.limit,
        page.offset(),
    )
    .await?;
    let results = recipe_responses(&state, rows, viewer.id()).await?;

    Ok(Json(Page::new(results, count, page, &url)))
}

/// GET /api/recipes/{id}/
pub async fn get_recipe(
    State(state): State<AppState>,
    viewer: MaybeUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<RecipeResponse>> {
    let row = RecipeRow::find(&state.db_pool, id, viewer.id())
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(recipe_response(&state, row, viewer.id()).await?))
}

/// Publish a recipe: POST /api/recipes/
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(payload): ApiJson<RecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeResponse>)> {
    let mut errors = FieldErrors::new();
    let name = errors.required_str("name", &payload.name, MAX_LENGTH_RECIPE_NAME);
    let text = errors.required_str("text", &payload.text, usize::MAX);
    let image = errors.required_str("image", &payload.image, usize::MAX);
    let cooking_time = check_cooking_time(&mut errors, payload.cooking_time.as_ref(), true);
    let relations = check_relations(&state, &mut errors, &payload).await?;

    let ((((name, text), image), cooking_time), (tag_ids, ingredients)) = errors.finish(
        name.zip(text)
            .zip(image)
            .zip(cooking_time)
            .zip(relations),
    )?;

    let image = state
        .media
        .save_data_uri(media_dirs::RECIPE_IMAGES, image)
        .await
        .map_err(|e| media_field_error("image", e))?;

    let created = Recipe::create(
        &state.db_pool,
        NewRecipe {
            author_id: user.id,
            name: name.to_string(),
            image: image.clone(),
            text: text.to_string(),
            cooking_time,
            tag_ids,
            ingredients,
        },
    )
    .await;

    let recipe = match created {
        Ok(recipe) => recipe,
        Err(e) => {
            state.media.delete(&image).await;
            return Err(e.into());
        }
    };

    info!(recipe_id = recipe.id, author_id = user.id, "Recipe created");

    let row = RecipeRow::find(&state.db_pool, recipe.id, Some(user.id))
        .await?
        .ok_or(ApiError::NotFound)?;
    let response = recipe_response(&state, row, Some(user.id)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Partial update by the author: PATCH /api/recipes/{id}/
///
/// Tags and ingredients must always be sent; they replace the stored ones.
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<RecipeRequest>,
) -> ApiResult<Json<RecipeResponse>> {
    let existing = authored_recipe(&state, id, &user).await?;

    let mut errors = FieldErrors::new();
    let name = errors.optional_str("name", &payload.name, MAX_LENGTH_RECIPE_NAME);
    let text = errors.optional_str("text", &payload.text, usize::MAX);
    let image = errors.optional_str("image", &payload.image, usize::MAX);
    let cooking_time = check_cooking_time(&mut errors, payload.cooking_time.as_ref(), false);
    let relations = check_relations(&state, &mut errors, &payload).await?;
    let (tag_ids, ingredients) = errors.finish(relations)?;

    let new_image = match image {
        Some(data_uri) => Some(
            state
                .media
                .save_data_uri(media_dirs::RECIPE_IMAGES, data_uri)
                .await
                .map_err(|e| media_field_error("image", e))?,
        ),
        None => None,
    };

    let updated = Recipe::update(
        &state.db_pool,
        id,
        RecipeUpdate {
            name: name.map(str::to_string),
            image: new_image.clone(),
            text: text.map(str::to_string),
            cooking_time,
            tag_ids,
            ingredients,
        },
    )
    .await;

    match (&updated, &new_image) {
        (Ok(_), Some(_)) => state.media.delete(&existing.image).await,
        (Err(_), Some(stored)) => state.media.delete(stored).await,
        _ => {}
    }
    let recipe = updated?;

    info!(recipe_id = recipe.id, author_id = user.id, "Recipe updated");

    let row = RecipeRow::find(&state.db_pool, recipe.id, Some(user.id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(recipe_response(&state, row, Some(user.id)).await?))
}

/// Remove a recipe by its author: DELETE /api/recipes/{id}/
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    let recipe = authored_recipe(&state, id, &user).await?;

    Recipe::delete(&state.db_pool, recipe.id).await?;
    state.media.delete(&recipe.image).await;

    info!(recipe_id = recipe.id, author_id = user.id, "Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/favorite/
pub async fn add_favorite(
    state: State<AppState>,
    user: AuthenticatedUser,
    id: IdPath,
) -> ApiResult<(StatusCode, Json<RecipeShortResponse>)> {
    add_to_collection(state, user, id, RecipeCollection::Favorites).await
}

/// DELETE /api/recipes/{id}/favorite/
pub async fn remove_favorite(
    state: State<AppState>,
    user: AuthenticatedUser,
    id: IdPath,
) -> ApiResult<StatusCode> {
    remove_from_collection(state, user, id, RecipeCollection::Favorites).await
}

/// POST /api/recipes/{id}/shopping_cart/
pub async fn add_to_cart(
    state: State<AppState>,
    user: AuthenticatedUser,
    id: IdPath,
) -> ApiResult<(StatusCode, Json<RecipeShortResponse>)> {
    add_to_collection(state, user, id, RecipeCollection::ShoppingCart).await
}

/// DELETE /api/recipes/{id}/shopping_cart/
pub async fn remove_from_cart(
    state: State<AppState>,
    user: AuthenticatedUser,
    id: IdPath,
) -> ApiResult<StatusCode> {
    remove_from_collection(state, user, id, RecipeCollection::ShoppingCart).await
}

async fn add_to_collection(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    IdPath(id): IdPath,
    collection: RecipeCollection,
) -> ApiResult<(StatusCode, Json<RecipeShortResponse>)> {
    let recipe = RecipeSummary::find(&state.db_pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if collection.contains(&state.db_pool, user.id, recipe.id).await? {
        return Err(ApiError::bad_request(format!(
            "This recipe is already in {}.",
            collection.label()
        )));
    }
    collection.add(&state.db_pool, user.id, recipe.id).await?;

    info!(user_id = user.id, recipe_id = recipe.id, collection = collection.label(), "Recipe added");
    Ok((StatusCode::CREATED, Json(recipe_short_response(&state, recipe))))
}

async fn remove_from_collection(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    IdPath(id): IdPath,
    collection: RecipeCollection,
) -> ApiResult<StatusCode> {
    if !Recipe::exists(&state.db_pool, id).await? {
        return Err(ApiError::NotFound);
    }
    if !collection.remove(&state.db_pool, user.id, id).await? {
        return Err(ApiError::bad_request(format!(
            "This recipe is not in {}.",
            collection.label()
        )));
    }

    info!(user_id = user.id, recipe_id = id, collection = collection.label(), "Recipe removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Plain-text shopping list: GET /api/recipes/download_shopping_cart/
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let items = Ingredient::shopping_list(&state.db_pool, user.id).await?;
    let recipe_names = Recipe::names_in_cart(&state.db_pool, user.id).await?;
    let body = render_shopping_list(&items, &recipe_names, Utc::now().date_naive());

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
            ),
        ],
        body,
    ))
}

/// Short link for sharing: GET /api/recipes/{id}/get-link/
pub async fn get_link(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    url: RequestUrl,
) -> ApiResult<Json<ShortLinkResponse>> {
    if !Recipe::exists(&state.db_pool, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(ShortLinkResponse {
        short_link: url.absolute(&format!("/r/{id}/")),
    }))
}

/// Load a recipe the caller may modify
async fn authored_recipe(state: &AppState, id: i64, user: &User) -> ApiResult<Recipe> {
    let recipe = Recipe::find_by_id(&state.db_pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    if recipe.author_id != user.id {
        warn!(recipe_id = id, user_id = user.id, "Rejected change by non-author");
        return Err(ApiError::Forbidden);
    }
    Ok(recipe)
}

fn check_cooking_time(
    errors: &mut FieldErrors,
    value: Option<&IntegerInput>,
    required: bool,
) -> Option<i32> {
    match value {
        Some(raw) => {
            let minutes = errors.integer("cooking_time", raw)?;
            errors.in_range("cooking_time", minutes, MIN_COOKING_TIME, MAX_COOKING_TIME)
        }
        None => {
            if required {
                errors.add("cooking_time", messages::REQUIRED_FIELD);
            }
            None
        }
    }
}

/// Validate the tag and ingredient lists of a payload
///
/// Both lists are required, non-empty, free of duplicates and must refer to
/// existing rows.
async fn check_relations(
    state: &AppState,
    errors: &mut FieldErrors,
    payload: &RecipeRequest,
) -> ApiResult<Option<(Vec<i64>, Vec<IngredientAmount>)>> {
    let tag_ids = match &payload.tags {
        None => {
            errors.add("tags", messages::REQUIRED_FIELD);
            None
        }
        Some(ids) if ids.is_empty() => {
            errors.add("tags", "This list may not be empty.");
            None
        }
        Some(raw) => {
            let ids: Vec<i64> = raw.iter().filter_map(|id| errors.integer("tags", id)).collect();
            let unique: HashSet<i64> = ids.iter().copied().collect();
            if ids.len() != raw.len() {
                None
            } else if unique.len() != ids.len() {
                errors.add("tags", "Tags must not repeat.");
                None
            } else {
                let existing: HashSet<i64> = Tag::existing_ids(&state.db_pool, &ids)
                    .await?
                    .into_iter()
                    .collect();
                let missing: Vec<i64> = ids.iter().copied().filter(|id| !existing.contains(id)).collect();
                for id in &missing {
                    errors.add("tags", format!("Invalid pk \"{id}\" - object does not exist."));
                }
                missing.is_empty().then_some(ids)
            }
        }
    };

    let ingredients = match &payload.ingredients {
        None => {
            errors.add("ingredients", messages::REQUIRED_FIELD);
            None
        }
        Some(lines) if lines.is_empty() => {
            errors.add("ingredients", "This list may not be empty.");
            None
        }
        Some(raw) => {
            let lines: Vec<(i64, i64)> = raw
                .iter()
                .filter_map(|line| {
                    let id = errors.integer("ingredients", &line.id);
                    let amount = errors.integer("ingredients", &line.amount);
                    id.zip(amount)
                })
                .collect();
            let unique: HashSet<i64> = lines.iter().map(|(id, _)| *id).collect();
            if lines.len() != raw.len() {
                None
            } else if unique.len() != lines.len() {
                errors.add("ingredients", "Ingredients must not repeat.");
                None
            } else {
                let ids: Vec<i64> = lines.iter().map(|(id, _)| *id).collect();
                let existing: HashSet<i64> = Ingredient::existing_ids(&state.db_pool, &ids)
                    .await?
                    .into_iter()
                    .collect();

                let mut amounts = Vec::with_capacity(lines.len());
                for &(id, amount) in &lines {
                    if !existing.contains(&id) {
                        errors.add(
                            "ingredients",
                            format!("Ingredient with id {id} does not exist."),
                        );
                        continue;
                    }
                    if let Some(amount) = errors.in_range(
                        "ingredients",
                        amount,
                        MIN_INGREDIENT_AMOUNT,
                        MAX_INGREDIENT_AMOUNT,
                    ) {
                        amounts.push(IngredientAmount {
                            ingredient_id: id,
                            amount,
                        });
                    }
                }
                (amounts.len() == lines.len()).then_some(amounts)
            }
        }
    };

    Ok(tag_ids.zip(ingredients))
}
