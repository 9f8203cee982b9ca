use sqlx::PgPool;

/// Per-user recipe collections sharing the `(user_id, recipe_id)` shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeCollection {
    Favorites,
    ShoppingCart,
}

impl RecipeCollection {
    fn table(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping_carts",
        }
    }

    /// Human-readable name used in error messages
    pub fn label(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "the shopping cart",
        }
    }

    /// Add a recipe; a duplicate surfaces as a unique violation
    pub async fn add(self, pool: &PgPool, user_id: i64, recipe_id: i64) -> Result<(), sqlx::Error> {
        let sql = format!("INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2)", self.table());
        sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn contains(self, pool: &PgPool, user_id: i64, recipe_id: i64) -> Result<bool, sqlx::Error> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = $1 AND recipe_id = $2)",
            self.table()
        );
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .fetch_one(pool)
            .await
    }

    /// Remove a recipe; false when it was not in the collection
    pub async fn remove(self, pool: &PgPool, user_id: i64, recipe_id: i64) -> Result<bool, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2", self.table());
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
