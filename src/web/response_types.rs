//! # Web API Response Types
//!
//! JSON representations returned by the API handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{RecipeIngredient, Tag};

/// User as seen by the current viewer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

/// Registration result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredUserResponse {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

/// Full recipe representation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Compact recipe for favorites, the cart and subscriptions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeShortResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// Followed author with their latest recipes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeShortResponse>,
    pub recipes_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Readiness check result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub database: String,
    pub timestamp: DateTime<Utc>,
}
