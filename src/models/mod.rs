//! # Data Models
//!
//! One module per table. Each model owns the SQL that reads and writes its
//! rows; handlers never build queries themselves.

pub mod auth_token;
pub mod follow;
pub mod ingredient;
pub mod recipe;
pub mod recipe_relation;
pub mod tag;
pub mod user;

// Re-export core models for easy access
pub use auth_token::AuthToken;
pub use follow::Follow;
pub use ingredient::{Ingredient, NewIngredient, RecipeIngredient, ShoppingListItem};
pub use recipe::{
    AdminRecipeRow, IngredientAmount, NewRecipe, Recipe, RecipeFilter, RecipeRow, RecipeSummary,
    RecipeUpdate,
};
pub use recipe_relation::RecipeCollection;
pub use tag::{NewTag, RecipeTag, Tag};
pub use user::{AdminUserRow, NewUser, User, UserProfile};
