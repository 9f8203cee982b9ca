use sqlx::{FromRow, PgPool};

/// Follow is a subscription of `user_id` to recipes by `author_id`
/// Maps to `follows` table; unique per pair and never self-referential
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
}

impl Follow {
    pub async fn create(pool: &PgPool, user_id: i64, author_id: i64) -> Result<Follow, sqlx::Error> {
        sqlx::query_as::<_, Follow>(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            RETURNING id, user_id, author_id
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
    }

    pub async fn exists(pool: &PgPool, user_id: i64, author_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
    }

    /// Remove a subscription; false when there was none
    pub async fn delete(pool: &PgPool, user_id: i64, author_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
