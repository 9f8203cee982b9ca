use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Tag groups recipes (breakfast, dinner, ...)
/// Maps to `tags` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// New Tag for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub slug: String,
}

/// Tag attached to a recipe, for batch loading
#[derive(Debug, Clone, FromRow)]
pub struct RecipeTag {
    pub recipe_id: i64,
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags ORDER BY name")
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive name search for the admin listing
    pub async fn search(pool: &PgPool, search: Option<&str>) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, slug FROM tags
            WHERE $1::text IS NULL OR name ILIKE '%' || $1 || '%'
            ORDER BY name
            "#,
        )
        .bind(search)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Subset of `ids` that exist
    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn for_recipes(pool: &PgPool, recipe_ids: &[i64]) -> Result<Vec<RecipeTag>, sqlx::Error> {
        sqlx::query_as::<_, RecipeTag>(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(pool)
        .await
    }

    /// Find by slug or create; the flag is true when a row was inserted
    pub async fn get_or_create(pool: &PgPool, new_tag: &NewTag) -> Result<(Tag, bool), sqlx::Error> {
        let inserted = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name, slug)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING id, name, slug
            "#,
        )
        .bind(&new_tag.name)
        .bind(&new_tag.slug)
        .fetch_optional(pool)
        .await?;

        if let Some(tag) = inserted {
            return Ok((tag, true));
        }

        let existing = sqlx::query_as::<_, Tag>(
            "SELECT id, name, slug FROM tags WHERE slug = $1 OR name = $2 LIMIT 1",
        )
        .bind(&new_tag.slug)
        .bind(&new_tag.name)
        .fetch_one(pool)
        .await?;

        Ok((existing, false))
    }
}

impl From<RecipeTag> for Tag {
    fn from(row: RecipeTag) -> Self {
        Tag {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}
