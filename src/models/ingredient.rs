use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Ingredient is a catalogue entry with its unit of measure
/// Maps to `ingredients` table; unique per (name, measurement_unit)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// New Ingredient for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

/// Ingredient line of a recipe, for batch loading
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct RecipeIngredient {
    #[serde(skip_serializing)]
    pub recipe_id: i64,
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Aggregated shopping list line
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl Ingredient {
    /// List ingredients, optionally by case-insensitive name prefix
    pub async fn list(pool: &PgPool, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, measurement_unit FROM ingredients
            WHERE $1::text IS NULL OR LOWER(name) LIKE LOWER($1) || '%'
            ORDER BY name, id
            "#,
        )
        .bind(name_prefix.map(escape_like))
        .fetch_all(pool)
        .await
    }

    /// Case-insensitive substring search for the admin listing
    pub async fn search(pool: &PgPool, search: Option<&str>) -> Result<Vec<Ingredient>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, measurement_unit FROM ingredients
            WHERE $1::text IS NULL OR name ILIKE '%' || $1 || '%'
            ORDER BY name, id
            "#,
        )
        .bind(search)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Ingredient>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Subset of `ids` that exist
    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM ingredients WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn for_recipes(
        pool: &PgPool,
        recipe_ids: &[i64],
    ) -> Result<Vec<RecipeIngredient>, sqlx::Error> {
        sqlx::query_as::<_, RecipeIngredient>(
            r#"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.id
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(pool)
        .await
    }

    /// Sum of amounts across the user's cart, grouped by ingredient and unit
    pub async fn shopping_list(pool: &PgPool, user_id: i64) -> Result<Vec<ShoppingListItem>, sqlx::Error> {
        sqlx::query_as::<_, ShoppingListItem>(
            r#"
            SELECT i.name, i.measurement_unit, SUM(ri.amount)::BIGINT AS total_amount
            FROM shopping_carts sc
            JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = $1
            GROUP BY i.name, i.measurement_unit
            ORDER BY i.name, i.measurement_unit
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Find by (name, unit) or create; the flag is true when a row was inserted
    pub async fn get_or_create(
        pool: &PgPool,
        new_ingredient: &NewIngredient,
    ) -> Result<(Ingredient, bool), sqlx::Error> {
        let inserted = sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            ON CONFLICT (name, measurement_unit) DO NOTHING
            RETURNING id, name, measurement_unit
            "#,
        )
        .bind(&new_ingredient.name)
        .bind(&new_ingredient.measurement_unit)
        .fetch_optional(pool)
        .await?;

        if let Some(ingredient) = inserted {
            return Ok((ingredient, true));
        }

        let existing = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE name = $1 AND measurement_unit = $2",
        )
        .bind(&new_ingredient.name)
        .bind(&new_ingredient.measurement_unit)
        .fetch_one(pool)
        .await?;

        Ok((existing, false))
    }
}
