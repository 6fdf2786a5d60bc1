//! # Category Repository
//!
//! Read access to product categories, plus the insert used by the seeder
//! and tests.

use sqlx::SqlitePool;

use super::clean_optional;
use crate::error::DbResult;
use tienda_core::Category;

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Active categories ordered by name.
    pub async fn list_active(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, is_active FROM categories WHERE is_active = 1 ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Inserts a category and returns its id.
    pub async fn insert(&self, name: &str, description: Option<&str>) -> DbResult<i64> {
        let result = sqlx::query("INSERT INTO categories (name, description) VALUES (?1, ?2)")
            .bind(name.trim())
            .bind(clean_optional(description))
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }
}
