//! # Subscription Handlers
//!
//! Following authors and listing followed authors with their recipes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::models::{Follow, UserProfile};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::extractors::{AuthenticatedUser, IdPath, QueryParams, RequestUrl};
use crate::web::pagination::{Page, PageRequest};
use crate::web::presenters::subscription_responses;
use crate::web::response_types::SubscriptionResponse;
use crate::web::state::AppState;

const RECIPES_LIMIT_PARAM: &str = "recipes_limit";

/// Follow an author: POST /api/users/{id}/subscribe/
pub async fn subscribe(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    IdPath(author_id): IdPath,
    query: QueryParams,
) -> ApiResult<(StatusCode, Json<SubscriptionResponse>)> {
    let mut author = UserProfile::find(&state.db_pool, author_id, Some(user.id))
        .await?
        .ok_or(ApiError::NotFound)?;

    if author.id == user.id {
        return Err(ApiError::bad_request("You cannot subscribe to yourself."));
    }
    if author.is_subscribed {
        return Err(ApiError::bad_request(
            "You are already subscribed to this author.",
        ));
    }

    Follow::create(&state.db_pool, user.id, author.id).await?;
    author.is_subscribed = true;
    info!(user_id = user.id, author_id = author.id, "Subscribed to author");

    let response = subscription_responses(
        &state,
        vec![author],
        query.positive_int(RECIPES_LIMIT_PARAM),
    )
    .await?
    .pop()
    .ok_or(ApiError::Internal)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Stop following an author: DELETE /api/users/{id}/subscribe/
pub async fn unsubscribe(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    IdPath(author_id): IdPath,
) -> ApiResult<StatusCode> {
    let _author = UserProfile::find(&state.db_pool, author_id, Some(user.id))
        .await?
        .ok_or(ApiError::NotFound)?;

    if !Follow::delete(&state.db_pool, user.id, author_id).await? {
        return Err(ApiError::bad_request("You are not subscribed to this author."));
    }

    info!(user_id = user.id, author_id, "Unsubscribed from author");
    Ok(StatusCode::NO_CONTENT)
}

/// Followed authors: GET /api/users/subscriptions/
pub async fn list_subscriptions(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: QueryParams,
    url: RequestUrl,
) -> ApiResult<Json<Page<SubscriptionResponse>>> {
    let count = UserProfile::count_followed(&state.db_pool, user.id).await?;
    let page = PageRequest::from_query(&query, &state.config.pagination)?.checked(count)?;

    let authors =
        UserProfile::list_followed(&state.db_pool, user.id, page.limit, page.offset()).await?;
    let results =
        subscription_responses(&state, authors, query.positive_int(RECIPES_LIMIT_PARAM)).await?;

    Ok(Json(Page::new(results, count, page, &url)))
}
