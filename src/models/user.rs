use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// User represents a registered account
/// Maps to `users` table; login is by email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: Option<String>,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// New User for creation (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_staff: bool,
}

/// Public view of a user relative to a viewer
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub is_subscribed: bool,
}

/// Admin listing row with relation counts
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AdminUserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub subscribers_count: i64,
    pub recipes_count: i64,
}

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, password_hash, avatar, is_staff, is_active, date_joined";

// $1 is the viewer id (NULL for anonymous callers)
const PROFILE_COLUMNS: &str = r#"
    u.id, u.email, u.username, u.first_name, u.last_name, u.avatar,
    EXISTS (SELECT 1 FROM follows f WHERE f.user_id = $1 AND f.author_id = u.id) AS is_subscribed
"#;

impl User {
    pub async fn create(pool: &PgPool, new_user: NewUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO users (email, username, first_name, last_name, password_hash, is_staff)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(new_user.email)
            .bind(new_user.username)
            .bind(new_user.first_name)
            .bind(new_user.last_name)
            .bind(new_user.password_hash)
            .bind(new_user.is_staff)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email, case-insensitively
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn email_taken(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(pool)
        .await
    }

    pub async fn username_taken(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await
    }

    pub async fn update_password_hash(
        pool: &PgPool,
        id: i64,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Replace the avatar path, returning the previous one
    pub async fn set_avatar(
        pool: &PgPool,
        id: i64,
        avatar: Option<&str>,
    ) -> Result<Option<String>, sqlx::Error> {
        let previous = sqlx::query_scalar::<_, Option<String>>(
            r#"
            UPDATE users u
            SET avatar = $2
            FROM (SELECT id, avatar FROM users WHERE id = $1 FOR UPDATE) old
            WHERE u.id = old.id
            RETURNING old.avatar
            "#,
        )
        .bind(id)
        .bind(avatar)
        .fetch_optional(pool)
        .await?;

        Ok(previous.flatten())
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}

impl UserProfile {
    pub async fn find(
        pool: &PgPool,
        id: i64,
        viewer: Option<i64>,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM users u WHERE u.id = $2");
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(viewer)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load profiles for a set of ids (order not guaranteed)
    pub async fn find_many(
        pool: &PgPool,
        ids: &[i64],
        viewer: Option<i64>,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM users u WHERE u.id = ANY($2)");
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(viewer)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        viewer: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM users u
            ORDER BY u.username, u.id
            LIMIT $2 OFFSET $3
            "#
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(viewer)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Authors the viewer follows
    pub async fn list_followed(
        pool: &PgPool,
        viewer: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM users u
            JOIN follows sub ON sub.author_id = u.id AND sub.user_id = $1
            ORDER BY u.username, u.id
            LIMIT $2 OFFSET $3
            "#
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(viewer)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_followed(pool: &PgPool, viewer: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE user_id = $1")
            .bind(viewer)
            .fetch_one(pool)
            .await
    }
}

impl AdminUserRow {
    /// Case-insensitive search over username, email, first and last name
    pub async fn search(pool: &PgPool, search: Option<&str>) -> Result<Vec<AdminUserRow>, sqlx::Error> {
        sqlx::query_as::<_, AdminUserRow>(
            r#"
            SELECT
                u.id, u.username, u.email, u.first_name, u.last_name, u.is_staff,
                (SELECT COUNT(*) FROM follows f WHERE f.author_id = u.id) AS subscribers_count,
                (SELECT COUNT(*) FROM recipes r WHERE r.author_id = u.id) AS recipes_count
            FROM users u
            WHERE $1::text IS NULL
               OR u.username ILIKE '%' || $1 || '%'
               OR u.email ILIKE '%' || $1 || '%'
               OR u.first_name ILIKE '%' || $1 || '%'
               OR u.last_name ILIKE '%' || $1 || '%'
            ORDER BY u.username
            "#,
        )
        .bind(search)
        .fetch_all(pool)
        .await
    }
}
