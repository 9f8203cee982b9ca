//! # Web API Route Definitions
//!
//! Paths keep the trailing slashes the frontend requests.

use axum::routing::{get, post, put};
use axum::Router;

use crate::web::handlers;
use crate::web::state::AppState;

/// Liveness and readiness probes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/ready", get(handlers::health::readiness_check))
}

/// REST API mounted under `/api`
///
/// - Auth: token login and logout
/// - Users: registration, profiles, avatar, password, subscriptions
/// - Catalogue: tags and ingredients (read-only)
/// - Recipes: CRUD, favorites, shopping cart, shopping list, short links
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/token/login/", post(handlers::auth::login))
        .route("/auth/token/logout/", post(handlers::auth::logout))
        // Users
        .route(
            "/users/",
            get(handlers::users::list_users).post(handlers::users::register),
        )
        .route("/users/me/", get(handlers::users::me))
        .route(
            "/users/me/avatar/",
            put(handlers::users::set_avatar).delete(handlers::users::delete_avatar),
        )
        .route("/users/set_password/", post(handlers::users::set_password))
        .route(
            "/users/subscriptions/",
            get(handlers::subscriptions::list_subscriptions),
        )
        .route("/users/{id}/", get(handlers::users::get_user))
        .route(
            "/users/{id}/subscribe/",
            post(handlers::subscriptions::subscribe).delete(handlers::subscriptions::unsubscribe),
        )
        // Catalogue
        .route("/tags/", get(handlers::tags::list_tags))
        .route("/tags/{id}/", get(handlers::tags::get_tag))
        .route("/ingredients/", get(handlers::ingredients::list_ingredients))
        .route("/ingredients/{id}/", get(handlers::ingredients::get_ingredient))
        // Recipes
        .route(
            "/recipes/",
            get(handlers::recipes::list_recipes).post(handlers::recipes::create_recipe),
        )
        .route(
            "/recipes/download_shopping_cart/",
            get(handlers::recipes::download_shopping_cart),
        )
        .route(
            "/recipes/{id}/",
            get(handlers::recipes::get_recipe)
                .put(handlers::recipes::update_recipe)
                .patch(handlers::recipes::update_recipe)
                .delete(handlers::recipes::delete_recipe),
        )
        .route(
            "/recipes/{id}/favorite/",
            post(handlers::recipes::add_favorite).delete(handlers::recipes::remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart/",
            post(handlers::recipes::add_to_cart).delete(handlers::recipes::remove_from_cart),
        )
        .route("/recipes/{id}/get-link/", get(handlers::recipes::get_link))
}

/// Staff listings mounted under `/admin`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", get(handlers::admin::list_users))
        .route("/recipes/", get(handlers::admin::list_recipes))
        .route("/ingredients/", get(handlers::admin::list_ingredients))
        .route("/tags/", get(handlers::admin::list_tags))
}

/// Short links mounted at the root
pub fn short_link_routes() -> Router<AppState> {
    Router::new().route("/r/{id}/", get(handlers::short_links::follow_short_link))
}
