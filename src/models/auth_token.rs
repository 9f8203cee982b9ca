use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::user::User;
use crate::constants::AUTH_TOKEN_LENGTH;

/// AuthToken is the single API token a user holds
/// Maps to `auth_tokens` table
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// 40 lowercase hex characters
    pub fn generate_key() -> String {
        let mut key = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        key.truncate(AUTH_TOKEN_LENGTH);
        key
    }

    /// Return the user's existing token or issue a new one
    pub async fn get_or_create(pool: &PgPool, user_id: i64) -> Result<AuthToken, sqlx::Error> {
        sqlx::query_as::<_, AuthToken>(
            r#"
            WITH inserted AS (
                INSERT INTO auth_tokens (key, user_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id) DO NOTHING
                RETURNING key, user_id, created_at
            )
            SELECT key, user_id, created_at FROM inserted
            UNION ALL
            SELECT key, user_id, created_at FROM auth_tokens WHERE user_id = $2
            LIMIT 1
            "#,
        )
        .bind(Self::generate_key())
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Resolve a token key to its active owner
    pub async fn find_user(pool: &PgPool, key: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.password_hash,
                   u.avatar, u.is_staff, u.is_active, u.date_joined
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.key = $1 AND u.is_active
            "#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_for_user(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
