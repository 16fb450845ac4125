//! # Category Repository
//!
//! Database operations for product categories.

use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use till_core::Category;

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    description: Option<String>,
    is_active: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
        }
    }
}

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

    /// Inserts a new category.
    pub async fn insert(&self, category: &Category) -> DbResult<()> {
        debug!(name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, is_active)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists active categories sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, is_active
            FROM categories
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Soft-deletes a category. Products referencing it keep their reference
    /// until the category row is actually removed.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting category");

        let result = sqlx::query("UPDATE categories SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}
