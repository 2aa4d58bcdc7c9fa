//! Repository for the `countries` table.

use classifieds_core::pagination::{clamp_limit, clamp_offset};
use classifieds_core::types::DbId;
use sqlx::PgPool;

use crate::models::location::Country;

const COLUMNS: &str = "id, name";

/// Provides CRUD operations for countries.
pub struct CountryRepo;

impl CountryRepo {
    pub async fn create(pool: &PgPool, name: &str) -> Result<Country, sqlx::Error> {
        let query = format!("INSERT INTO countries (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Country>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Country>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM countries WHERE id = $1");
        sqlx::query_as::<_, Country>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM countries WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Whether another country already uses `name`.
    pub async fn name_taken(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM countries WHERE name = $1 AND id IS DISTINCT FROM $2)",
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
    ) -> Result<Vec<Country>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM countries ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Country>(&query)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Rename a country. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: Option<&str>,
    ) -> Result<Option<Country>, sqlx::Error> {
        let query = format!(
            "UPDATE countries SET name = COALESCE($2, name) WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Country>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a country. Cascades to its cities and their streets; users
    /// pointing at any removed row have that pointer nulled.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM countries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
