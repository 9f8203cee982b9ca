//! # Token Authentication Handlers
//!
//! `POST /api/auth/token/login/` exchanges email and password for the user's
//! token; `POST /api/auth/token/logout/` revokes it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use crate::constants::{messages, MAX_LENGTH_USER_EMAIL};
use crate::models::{AuthToken, User};
use crate::services::verify_password;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::extractors::{ApiJson, AuthenticatedUser};
use crate::web::response_types::TokenResponse;
use crate::web::state::AppState;
use crate::web::validation::FieldErrors;

/// Login payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Issue or reuse a token: POST /api/auth/token/login/
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let mut errors = FieldErrors::new();
    let email = errors.required_str("email", &payload.email, MAX_LENGTH_USER_EMAIL);
    let password = errors.required_str("password", &payload.password, usize::MAX);
    let (email, password) = errors.finish(email.zip(password))?;

    let user = User::find_by_email(&state.db_pool, email)
        .await?
        .filter(|user| user.is_active && verify_password(password, &user.password_hash))
        .ok_or_else(|| {
            warn!("Login rejected");
            ApiError::field("non_field_errors", messages::INVALID_CREDENTIALS)
        })?;

    let token = AuthToken::get_or_create(&state.db_pool, user.id).await?;
    info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse {
        auth_token: token.key,
    }))
}

/// Revoke the caller's token: POST /api/auth/token/logout/
pub async fn logout(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<StatusCode> {
    AuthToken::delete_for_user(&state.db_pool, user.id).await?;
    info!(user_id = user.id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}
