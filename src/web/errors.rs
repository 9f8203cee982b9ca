//! # Web API Error Types
//!
//! Error types for the REST API and their HTTP response conversions. Bodies use
//! the shapes the frontend expects: `{field: [messages]}` for validation
//! failures, `{errors: message}` for rejected actions and `{detail: message}`
//! for everything else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use super::validation::FieldErrors;
use crate::constants::messages;
use crate::error::FoodgramError;

/// Web API errors with HTTP status code mappings
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed: {errors:?}")]
    Validation { errors: FieldErrors },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Malformed request: {detail}")]
    MalformedRequest { detail: String },

    #[error("Authentication required: {detail}")]
    Unauthorized { detail: String },

    #[error("Access denied")]
    Forbidden,

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid page")]
    InvalidPage,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Service temporarily unavailable")]
    ServiceUnavailable,

    #[error("Database operation failed: {operation}")]
    DatabaseError { operation: String },

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Create a BadRequest error rendered as `{errors: message}`
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Single-field validation failure
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Self::Validation { errors }
    }

    pub fn not_authenticated() -> Self {
        Self::Unauthorized {
            detail: messages::NOT_AUTHENTICATED.to_string(),
        }
    }

    pub fn invalid_token() -> Self {
        Self::Unauthorized {
            detail: messages::INVALID_TOKEN.to_string(),
        }
    }

    /// Create a DatabaseError with operation context
    pub fn database_error(operation: impl Into<String>) -> Self {
        Self::DatabaseError {
            operation: operation.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::BadRequest { .. } | Self::MalformedRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound | Self::InvalidPage => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::DatabaseError { .. } | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::Validation { errors } => json!(errors),
            Self::BadRequest { message } => json!({ "errors": message }),
            Self::MalformedRequest { detail } | Self::Unauthorized { detail } => {
                json!({ "detail": detail })
            }
            Self::Forbidden => json!({ "detail": messages::PERMISSION_DENIED }),
            Self::NotFound => json!({ "detail": messages::NOT_FOUND }),
            Self::InvalidPage => json!({ "detail": messages::INVALID_PAGE }),
            Self::PayloadTooLarge => json!({ "detail": "Request body is too large." }),
            Self::ServiceUnavailable => json!({ "detail": "Service temporarily unavailable." }),
            Self::DatabaseError { operation } => {
                error!(operation = %operation, "Database operation failed");
                json!({ "detail": "A server error occurred." })
            }
            Self::Internal => json!({ "detail": "A server error occurred." }),
        };

        (status, Json(body)).into_response()
    }
}

/// Message for a unique or check constraint, keyed by constraint name
fn constraint_message(constraint: &str) -> Option<(Option<&'static str>, &'static str)> {
    let mapped = match constraint {
        "users_email_key" => (Some("email"), "A user with that email already exists."),
        "users_username_key" => (Some("username"), "A user with that username already exists."),
        "unique_follow" => (None, "You are already subscribed to this author."),
        "no_self_follow" => (None, "You cannot subscribe to yourself."),
        "unique_favorite" => (None, "This recipe is already in favorites."),
        "unique_shopping_cart" => (None, "This recipe is already in the shopping cart."),
        "unique_recipe_ingredient" => (Some("ingredients"), "Ingredients must not repeat."),
        "recipe_tags_pkey" => (Some("tags"), "Tags must not repeat."),
        _ => return None,
    };
    Some(mapped)
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            sqlx::Error::PoolTimedOut => ApiError::ServiceUnavailable,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code();
                let code = code.as_deref().unwrap_or_default();
                match code {
                    // unique_violation, check_violation
                    "23505" | "23514" => match db_err.constraint().and_then(constraint_message) {
                        Some((Some(field), message)) => ApiError::field(field, message),
                        Some((None, message)) => ApiError::bad_request(message),
                        None => ApiError::bad_request("The submitted data violates a constraint."),
                    },
                    // foreign_key_violation
                    "23503" => ApiError::bad_request("A referenced object does not exist."),
                    _ => {
                        error!(error = %err, code = %code, "Unexpected database error");
                        ApiError::database_error("Database operation failed")
                    }
                }
            }
            _ => {
                error!(error = %err, "Database error");
                ApiError::database_error("Database error")
            }
        }
    }
}

impl From<FoodgramError> for ApiError {
    fn from(err: FoodgramError) -> Self {
        match err {
            FoodgramError::Database(e) => e.into(),
            FoodgramError::Validation(message) | FoodgramError::Media(message) => {
                ApiError::bad_request(message)
            }
            FoodgramError::NotFound(_) => ApiError::NotFound,
            other => {
                error!(error = %other, "Internal error while handling request");
                ApiError::Internal
            }
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
