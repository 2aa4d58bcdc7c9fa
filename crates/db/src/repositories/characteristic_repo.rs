//! Repository for the `characteristics` table.

use std::collections::HashSet;

use classifieds_core::pagination::{clamp_limit, clamp_offset};
use classifieds_core::types::DbId;
use sqlx::PgPool;

use crate::models::catalog::Characteristic;

const COLUMNS: &str = "id, name";

/// Provides CRUD operations for characteristics.
pub struct CharacteristicRepo;

impl CharacteristicRepo {
    pub async fn create(pool: &PgPool, name: &str) -> Result<Characteristic, sqlx::Error> {
        let query = format!("INSERT INTO characteristics (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Characteristic>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Characteristic>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characteristics WHERE id = $1");
        sqlx::query_as::<_, Characteristic>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The subset of `ids` that exist.
    pub async fn existing_ids(pool: &PgPool, ids: &[DbId]) -> Result<HashSet<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM characteristics WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(pool)
                .await?;
        Ok(found.into_iter().collect())
    }

    pub async fn name_taken(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM characteristics \
             WHERE name = $1 AND id IS DISTINCT FROM $2)",
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
    ) -> Result<Vec<Characteristic>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM characteristics ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Characteristic>(&query)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: Option<&str>,
    ) -> Result<Option<Characteristic>, sqlx::Error> {
        let query = format!(
            "UPDATE characteristics SET name = COALESCE($2, name) WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Characteristic>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM characteristics WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
