//! # Authentication Middleware
//!
//! Token authentication for API access (`Authorization: Token <key>`).
//!
//! Requests without credentials pass through anonymously; handlers decide
//! whether they need a user through the extractors in [`crate::web::extractors`].
//! A request that presents credentials which do not resolve to an active user
//! is rejected outright.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::constants::AUTH_TOKEN_SCHEME;
use crate::models::AuthToken;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

/// Resolve the token in the Authorization header, if any
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(auth_header) = request.headers().get(AUTHORIZATION) else {
        return Ok(next.run(request).await);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::invalid_token())?;

    let Some(key) = extract_token(auth_str)? else {
        // Another scheme; treat the request as anonymous
        return Ok(next.run(request).await);
    };

    let user = AuthToken::find_user(&state.db_pool, key)
        .await?
        .ok_or_else(|| {
            warn!("Rejected request with unknown token");
            ApiError::invalid_token()
        })?;

    debug!(user_id = user.id, "Authenticated request");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extract the key from a `Token <key>` header value
///
/// Returns `Ok(None)` for other schemes.
pub fn extract_token(auth_header: &str) -> Result<Option<&str>, ApiError> {
    let mut parts = auth_header.split_whitespace();
    let Some(scheme) = parts.next() else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case(AUTH_TOKEN_SCHEME) {
        return Ok(None);
    }

    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(Some(key)),
        _ => Err(ApiError::invalid_token()),
    }
}
