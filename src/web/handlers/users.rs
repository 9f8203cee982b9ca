//! # User Handlers
//!
//! Registration, profiles, avatars and password changes under `/api/users/`.

use std::sync::LazyLock;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::constants::{media_dirs, MAX_LENGTH_USER, MAX_LENGTH_USER_EMAIL};
use crate::error::FoodgramError;
use crate::models::{NewUser, User, UserProfile};
use crate::services::{hash_password, password_problems, verify_password};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::extractors::{ApiJson, AuthenticatedUser, IdPath, MaybeUser, QueryParams, RequestUrl};
use crate::web::pagination::{Page, PageRequest};
use crate::web::presenters::user_response;
use crate::web::response_types::{AvatarResponse, RegisteredUserResponse, UserResponse};
use crate::web::state::AppState;
use crate::web::validation::FieldErrors;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username pattern"));

/// Registration payload
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: Option<String>,
    pub current_password: Option<String>,
}

/// Register a user: POST /api/users/
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisteredUserResponse>)> {
    let mut errors = FieldErrors::new();

    let email = errors.required_str("email", &payload.email, MAX_LENGTH_USER_EMAIL);
    if let Some(email) = email {
        if !EMAIL_PATTERN.is_match(email) {
            errors.add("email", "Enter a valid email address.");
        } else if User::email_taken(&state.db_pool, email).await? {
            errors.add("email", "A user with that email already exists.");
        }
    }

    let username = errors.required_str("username", &payload.username, MAX_LENGTH_USER);
    if let Some(username) = username {
        if !USERNAME_PATTERN.is_match(username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        } else if User::username_taken(&state.db_pool, username).await? {
            errors.add("username", "A user with that username already exists.");
        }
    }

    let first_name = errors.required_str("first_name", &payload.first_name, MAX_LENGTH_USER);
    let last_name = errors.required_str("last_name", &payload.last_name, MAX_LENGTH_USER);

    let password = errors.required_str("password", &payload.password, usize::MAX);
    if let Some(password) = password {
        for problem in password_problems(
            password,
            username.unwrap_or_default(),
            email.unwrap_or_default(),
        ) {
            errors.add("password", problem);
        }
    }

    let (((email, username), (first_name, last_name)), password) = errors.finish(
        email
            .zip(username)
            .zip(first_name.zip(last_name))
            .zip(password),
    )?;

    let user = User::create(
        &state.db_pool,
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            password_hash: hash_password(password)?,
            is_staff: false,
        },
    )
    .await?;

    info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUserResponse {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    ))
}

/// Paginated user list: GET /api/users/
pub async fn list_users(
    State(state): State<AppState>,
    viewer: MaybeUser,
    query: QueryParams,
    url: RequestUrl,
) -> ApiResult<Json<Page<UserResponse>>> {
    let count = User::count(&state.db_pool).await?;
    let page = PageRequest::from_query(&query, &state.config.pagination)?.checked(count)?;

    let results = UserProfile::list(&state.db_pool, viewer.id(), page.limit, page.offset())
        .await?
        .into_iter()
        .map(|profile| user_response(&state, profile))
        .collect();

    Ok(Json(Page::new(results, count, page, &url)))
}

/// Public profile: GET /api/users/{id}/
pub async fn get_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<UserResponse>> {
    let profile = UserProfile::find(&state.db_pool, id, viewer.id())
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(user_response(&state, profile)))
}

/// Current user: GET /api/users/me/
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<Json<UserResponse>> {
    let profile = UserProfile::find(&state.db_pool, user.id, Some(user.id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(user_response(&state, profile)))
}

/// Upload an avatar: PUT /api/users/me/avatar/
pub async fn set_avatar(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(payload): ApiJson<AvatarRequest>,
) -> ApiResult<Json<AvatarResponse>> {
    let mut errors = FieldErrors::new();
    let data_uri = errors.required_str("avatar", &payload.avatar, usize::MAX);
    let data_uri = errors.finish(data_uri)?;

    let stored = state
        .media
        .save_data_uri(media_dirs::AVATARS, data_uri)
        .await
        .map_err(|e| media_field_error("avatar", e))?;

    let previous = User::set_avatar(&state.db_pool, user.id, Some(&stored)).await?;
    if let Some(previous) = previous {
        state.media.delete(&previous).await;
    }

    info!(user_id = user.id, "Avatar updated");
    Ok(Json(AvatarResponse {
        avatar: state.media.url(&stored),
    }))
}

/// Remove the avatar: DELETE /api/users/me/avatar/
pub async fn delete_avatar(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<StatusCode> {
    if let Some(previous) = User::set_avatar(&state.db_pool, user.id, None).await? {
        state.media.delete(&previous).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Change password: POST /api/users/set_password/
pub async fn set_password(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(payload): ApiJson<SetPasswordRequest>,
) -> ApiResult<StatusCode> {
    let mut errors = FieldErrors::new();
    let new_password = errors.required_str("new_password", &payload.new_password, usize::MAX);
    let current_password =
        errors.required_str("current_password", &payload.current_password, usize::MAX);

    if let Some(current) = current_password {
        if !verify_password(current, &user.password_hash) {
            errors.add("current_password", "Invalid password.");
        }
    }
    if let Some(new_password) = new_password {
        for problem in password_problems(new_password, &user.username, &user.email) {
            errors.add("new_password", problem);
        }
    }

    let new_password = errors.finish(new_password)?;
    User::update_password_hash(&state.db_pool, user.id, &hash_password(new_password)?).await?;

    info!(user_id = user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Report an undecodable upload against the field it came from
pub(crate) fn media_field_error(field: &str, err: FoodgramError) -> ApiError {
    match err {
        FoodgramError::Media(message) => ApiError::field(field, message),
        other => other.into(),
    }
}
