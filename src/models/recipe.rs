use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

/// Recipe is a published dish with its ingredients and tags
/// Maps to `recipes` table
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

/// Recipe with per-viewer relation flags
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Compact form used by subscriptions, favorites and the cart
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RecipeSummary {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// Ingredient line of a new or updated recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: i64,
    pub amount: i32,
}

/// New Recipe for creation
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub author_id: i64,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub tag_ids: Vec<i64>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Partial update; tags and ingredients are always replaced
#[derive(Debug, Clone)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub tag_ids: Vec<i64>,
    pub ingredients: Vec<IngredientAmount>,
}

/// List filters; the viewer-relative flags only apply with a viewer
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub author_id: Option<i64>,
    pub tag_slugs: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Admin listing row
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AdminRecipeRow {
    pub id: i64,
    pub name: String,
    pub author_username: String,
    pub cooking_time: i32,
    pub favorite_count: i64,
    pub tags: Vec<String>,
    pub pub_date: DateTime<Utc>,
}

const RECIPE_COLUMNS: &str = "id, author_id, name, image, text, cooking_time, pub_date";

// $1 is the viewer id (NULL for anonymous callers)
const RECIPE_ROW_COLUMNS: &str = r#"
    r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.pub_date,
    EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = $1) AS is_favorited,
    EXISTS (SELECT 1 FROM shopping_carts s WHERE s.recipe_id = r.id AND s.user_id = $1) AS is_in_shopping_cart
"#;

// $1 viewer, $2 author, $3 tag slugs, $4 favorited only, $5 in cart only
const RECIPE_FILTER: &str = r#"
    ($2::bigint IS NULL OR r.author_id = $2)
    AND (cardinality($3::text[]) = 0 OR EXISTS (
        SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = r.id AND t.slug = ANY($3)
    ))
    AND (NOT $4 OR EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = $1))
    AND (NOT $5 OR EXISTS (SELECT 1 FROM shopping_carts s WHERE s.recipe_id = r.id AND s.user_id = $1))
"#;

impl Recipe {
    /// Insert a recipe with its tags and ingredient lines in one transaction
    pub async fn create(pool: &PgPool, new_recipe: NewRecipe) -> Result<Recipe, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO recipes (author_id, name, image, text, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RECIPE_COLUMNS}
            "#
        );
        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(new_recipe.author_id)
            .bind(&new_recipe.name)
            .bind(&new_recipe.image)
            .bind(&new_recipe.text)
            .bind(new_recipe.cooking_time)
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_relations(&mut tx, recipe.id, &new_recipe.tag_ids, &new_recipe.ingredients)
            .await?;

        tx.commit().await?;
        Ok(recipe)
    }

    /// Apply an update, replacing all tags and ingredient lines
    pub async fn update(pool: &PgPool, id: i64, update: RecipeUpdate) -> Result<Recipe, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE recipes SET
                name = COALESCE($2, name),
                image = COALESCE($3, image),
                text = COALESCE($4, text),
                cooking_time = COALESCE($5, cooking_time)
            WHERE id = $1
            RETURNING {RECIPE_COLUMNS}
            "#
        );
        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(id)
            .bind(update.name)
            .bind(update.image)
            .bind(update.text)
            .bind(update.cooking_time)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::insert_relations(&mut tx, id, &update.tag_ids, &update.ingredients).await?;

        tx.commit().await?;
        Ok(recipe)
    }

    async fn insert_relations(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: i64,
        tag_ids: &[i64],
        ingredients: &[IngredientAmount],
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO recipe_tags (recipe_id, tag_id)
            SELECT $1, tag_id FROM UNNEST($2::bigint[]) AS tag_id
            "#,
        )
        .bind(recipe_id)
        .bind(tag_ids)
        .execute(&mut **tx)
        .await?;

        let ingredient_ids: Vec<i64> = ingredients.iter().map(|i| i.ingredient_id).collect();
        let amounts: Vec<i32> = ingredients.iter().map(|i| i.amount).collect();

        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            SELECT $1, ingredient_id, amount
            FROM UNNEST($2::bigint[], $3::integer[]) WITH ORDINALITY AS t(ingredient_id, amount, ord)
            ORDER BY ord
            "#,
        )
        .bind(recipe_id)
        .bind(&ingredient_ids)
        .bind(&amounts)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Recipe>, sqlx::Error> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1");
        sqlx::query_as::<_, Recipe>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Names of the recipes in a user's cart, alphabetically
    pub async fn names_in_cart(pool: &PgPool, user_id: i64) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name FROM shopping_carts s
            JOIN recipes r ON r.id = s.recipe_id
            WHERE s.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}

impl RecipeRow {
    pub async fn find(
        pool: &PgPool,
        id: i64,
        viewer: Option<i64>,
    ) -> Result<Option<RecipeRow>, sqlx::Error> {
        let sql = format!("SELECT {RECIPE_ROW_COLUMNS} FROM recipes r WHERE r.id = $2");
        sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(viewer)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Filtered page of recipes, newest first
    pub async fn list(
        pool: &PgPool,
        viewer: Option<i64>,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RecipeRow>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {RECIPE_ROW_COLUMNS}
            FROM recipes r
            WHERE {RECIPE_FILTER}
            ORDER BY r.pub_date DESC, r.id DESC
            LIMIT $6 OFFSET $7
            "#
        );
        sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(viewer)
            .bind(filter.author_id)
            .bind(&filter.tag_slugs)
            .bind(filter.is_favorited)
            .bind(filter.is_in_shopping_cart)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        viewer: Option<i64>,
        filter: &RecipeFilter,
    ) -> Result<i64, sqlx::Error> {
        let sql = format!("SELECT COUNT(*) FROM recipes r WHERE {RECIPE_FILTER}");
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(viewer)
            .bind(filter.author_id)
            .bind(&filter.tag_slugs)
            .bind(filter.is_favorited)
            .bind(filter.is_in_shopping_cart)
            .fetch_one(pool)
            .await
    }
}

impl RecipeSummary {
    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<RecipeSummary>, sqlx::Error> {
        sqlx::query_as::<_, RecipeSummary>(
            "SELECT id, author_id, name, image, cooking_time FROM recipes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Recipes by each of `author_ids`, newest first, at most `per_author` each
    pub async fn recent_by_authors(
        pool: &PgPool,
        author_ids: &[i64],
        per_author: Option<i64>,
    ) -> Result<Vec<RecipeSummary>, sqlx::Error> {
        sqlx::query_as::<_, RecipeSummary>(
            r#"
            SELECT id, author_id, name, image, cooking_time FROM (
                SELECT id, author_id, name, image, cooking_time,
                       ROW_NUMBER() OVER (PARTITION BY author_id ORDER BY pub_date DESC, id DESC) AS rn
                FROM recipes
                WHERE author_id = ANY($1)
            ) ranked
            WHERE $2::bigint IS NULL OR rn <= $2
            ORDER BY author_id, rn
            "#,
        )
        .bind(author_ids)
        .bind(per_author)
        .fetch_all(pool)
        .await
    }

    /// Number of recipes per author
    pub async fn counts_by_authors(
        pool: &PgPool,
        author_ids: &[i64],
    ) -> Result<Vec<(i64, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT author_id, COUNT(*) FROM recipes
            WHERE author_id = ANY($1)
            GROUP BY author_id
            "#,
        )
        .bind(author_ids)
        .fetch_all(pool)
        .await
    }
}

impl AdminRecipeRow {
    /// Search by recipe name, optionally restricted to an author and tag slugs
    pub async fn search(
        pool: &PgPool,
        search: Option<&str>,
        author_id: Option<i64>,
        tag_slugs: &[String],
    ) -> Result<Vec<AdminRecipeRow>, sqlx::Error> {
        sqlx::query_as::<_, AdminRecipeRow>(
            r#"
            SELECT
                r.id, r.name, u.username AS author_username, r.cooking_time,
                (SELECT COUNT(*) FROM favorites f WHERE f.recipe_id = r.id) AS favorite_count,
                COALESCE(
                    (SELECT array_agg(t.name::text ORDER BY t.name)
                     FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id
                     WHERE rt.recipe_id = r.id),
                    ARRAY[]::text[]
                ) AS tags,
                r.pub_date
            FROM recipes r
            JOIN users u ON u.id = r.author_id
            WHERE ($1::text IS NULL OR r.name ILIKE '%' || $1 || '%')
              AND ($2::bigint IS NULL OR r.author_id = $2)
              AND (cardinality($3::text[]) = 0 OR EXISTS (
                  SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id
                  WHERE rt.recipe_id = r.id AND t.slug = ANY($3)
              ))
            ORDER BY r.pub_date DESC, r.id DESC
            "#,
        )
        .bind(search)
        .bind(author_id)
        .bind(tag_slugs)
        .fetch_all(pool)
        .await
    }
}
