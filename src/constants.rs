//! # Domain Constants
//!
//! Field limits and defaults shared by the models, validation and the web layer.
//! The database schema in `migrations/` enforces the same bounds.

/// Maximum length of a user's email address
pub const MAX_LENGTH_USER_EMAIL: usize = 254;

/// Maximum length of username, first name and last name
pub const MAX_LENGTH_USER: usize = 150;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of a tag name and slug
pub const MAX_LENGTH_TAG: usize = 32;

/// Maximum length of an ingredient name
pub const MAX_LENGTH_INGREDIENT_NAME: usize = 128;

/// Maximum length of an ingredient measurement unit
pub const MAX_LENGTH_MEASUREMENT_UNIT: usize = 64;

/// Maximum length of a recipe name
pub const MAX_LENGTH_RECIPE_NAME: usize = 256;

/// Cooking time bounds in minutes
pub const MIN_COOKING_TIME: i64 = 1;
pub const MAX_COOKING_TIME: i64 = 32000;

/// Ingredient amount bounds
pub const MIN_INGREDIENT_AMOUNT: i64 = 1;
pub const MAX_INGREDIENT_AMOUNT: i64 = 32000;

/// Default page size for paginated endpoints
pub const PAGE_SIZE: u32 = 6;

/// Upper bound for the `limit` query parameter
pub const MAX_PAGE_SIZE: u32 = 100;

/// Length of an authentication token key in hex characters
pub const AUTH_TOKEN_LENGTH: usize = 40;

/// Authorization header scheme for token authentication
pub const AUTH_TOKEN_SCHEME: &str = "Token";

/// Name of the downloadable shopping list attachment
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// Media subdirectories for uploaded images
pub mod media_dirs {
    pub const RECIPE_IMAGES: &str = "recipes/images";
    pub const AVATARS: &str = "users/avatars";
}

/// DRF-compatible error messages returned to clients
pub mod messages {
    pub const REQUIRED_FIELD: &str = "This field is required.";
    pub const BLANK_FIELD: &str = "This field may not be blank.";
    pub const INVALID_INTEGER: &str = "A valid integer is required.";
    pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
    pub const INVALID_TOKEN: &str = "Invalid token.";
    pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";
    pub const NOT_FOUND: &str = "Not found.";
    pub const INVALID_PAGE: &str = "Invalid page.";
    pub const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";
}
