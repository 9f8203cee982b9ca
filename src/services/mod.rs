//! # Services
//!
//! Domain logic that does not belong to a single table: credentials, media
//! storage, shopping list rendering and fixture loading.

pub mod fixtures;
pub mod media;
pub mod passwords;
pub mod shopping_list;

pub use fixtures::{load_ingredients, load_tags, LoadReport};
pub use media::MediaStore;
pub use passwords::{hash_password, password_problems, verify_password};
pub use shopping_list::render_shopping_list;
