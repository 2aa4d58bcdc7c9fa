//! Repository for the `categories` table.

use classifieds_core::pagination::{clamp_limit, clamp_offset};
use classifieds_core::types::DbId;
use sqlx::PgPool;

use crate::models::catalog::Category;

const COLUMNS: &str = "id, name";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn create(pool: &PgPool, name: &str) -> Result<Category, sqlx::Error> {
        let query = format!("INSERT INTO categories (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Category>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn name_taken(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE name = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Category>(&query)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: Option<&str>,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET name = COALESCE($2, name) WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category along with its associations and advertisements.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
