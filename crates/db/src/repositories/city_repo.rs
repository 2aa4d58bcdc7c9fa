//! Repository for the `cities` table.
//!
//! Reads always join the parent country. Moving a city to another country
//! drags the country pointer of every user placed in that city along with it.

use classifieds_core::pagination::{clamp_limit, clamp_offset};
use classifieds_core::types::DbId;
use sqlx::PgPool;

use crate::models::location::{CityRow, CreateCity, UpdateCity};

/// Joined select, without a trailing clause.
const SELECT: &str = "\
    SELECT c.id, c.name, c.country_id, co.name AS country_name \
    FROM cities c \
    JOIN countries co ON co.id = c.country_id";

/// Provides CRUD operations for cities.
pub struct CityRepo;

impl CityRepo {
    pub async fn create(pool: &PgPool, input: &CreateCity) -> Result<CityRow, sqlx::Error> {
        sqlx::query_as::<_, CityRow>(
            "WITH c AS ( \
                 INSERT INTO cities (name, country_id) VALUES ($1, $2) \
                 RETURNING id, name, country_id \
             ) \
             SELECT c.id, c.name, c.country_id, co.name AS country_name \
             FROM c JOIN countries co ON co.id = c.country_id",
        )
        .bind(&input.name)
        .bind(input.country_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CityRow>, sqlx::Error> {
        let query = format!("{SELECT} WHERE c.id = $1");
        sqlx::query_as::<_, CityRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List cities, optionally restricted to one country.
    pub async fn list(
        pool: &PgPool,
        country_id: Option<DbId>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<CityRow>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE ($1::BIGINT IS NULL OR c.country_id = $1) \
             ORDER BY c.id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CityRow>(&query)
            .bind(country_id)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Update a city. Returns `None` if no row with the given `id` exists.
    ///
    /// When `country_id` is set, users placed in this city (directly or via
    /// one of its streets) are moved to the new country in the same
    /// transaction.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCity,
    ) -> Result<Option<CityRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE cities SET \
                 name = COALESCE($2, name), \
                 country_id = COALESCE($3, country_id) \
             WHERE id = $1 \
             RETURNING id",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.country_id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(country_id) = input.country_id {
            let moved = sqlx::query(
                "UPDATE users SET country_id = $2 \
                 WHERE city_id = $1 AND country_id IS DISTINCT FROM $2",
            )
            .bind(id)
            .bind(country_id)
            .execute(&mut *tx)
            .await?;
            tracing::debug!(
                city_id = id,
                country_id,
                users = moved.rows_affected(),
                "Re-parented city placements",
            );
        }

        let query = format!("{SELECT} WHERE c.id = $1");
        let city = sqlx::query_as::<_, CityRow>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(city))
    }

    /// Delete a city and, by cascade, its streets.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
