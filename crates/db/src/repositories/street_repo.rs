//! Repository for the `streets` table.
//!
//! Reads join the full ancestry. Moving a street to another city updates the
//! city and country pointers of every user placed on that street.

use classifieds_core::pagination::{clamp_limit, clamp_offset};
use classifieds_core::types::DbId;
use sqlx::PgPool;

use crate::models::location::{CreateStreet, StreetRow, UpdateStreet};

const SELECT: &str = "\
    SELECT s.id, s.name, s.city_id, c.name AS city_name, \
           c.country_id, co.name AS country_name \
    FROM streets s \
    JOIN cities c ON c.id = s.city_id \
    JOIN countries co ON co.id = c.country_id";

/// Provides CRUD operations for streets.
pub struct StreetRepo;

impl StreetRepo {
    pub async fn create(pool: &PgPool, input: &CreateStreet) -> Result<StreetRow, sqlx::Error> {
        sqlx::query_as::<_, StreetRow>(
            "WITH s AS ( \
                 INSERT INTO streets (name, city_id) VALUES ($1, $2) \
                 RETURNING id, name, city_id \
             ) \
             SELECT s.id, s.name, s.city_id, c.name AS city_name, \
                    c.country_id, co.name AS country_name \
             FROM s \
             JOIN cities c ON c.id = s.city_id \
             JOIN countries co ON co.id = c.country_id",
        )
        .bind(&input.name)
        .bind(input.city_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StreetRow>, sqlx::Error> {
        let query = format!("{SELECT} WHERE s.id = $1");
        sqlx::query_as::<_, StreetRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List streets, optionally restricted to one city.
    pub async fn list(
        pool: &PgPool,
        city_id: Option<DbId>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<StreetRow>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE ($1::BIGINT IS NULL OR s.city_id = $1) \
             ORDER BY s.id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, StreetRow>(&query)
            .bind(city_id)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Update a street. Returns `None` if no row with the given `id` exists.
    ///
    /// When `city_id` is set, users on this street follow it to the new city
    /// and that city's country, in the same transaction.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStreet,
    ) -> Result<Option<StreetRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE streets SET \
                 name = COALESCE($2, name), \
                 city_id = COALESCE($3, city_id) \
             WHERE id = $1 \
             RETURNING id",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.city_id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if input.city_id.is_some() {
            let moved = sqlx::query(
                "UPDATE users u SET city_id = c.id, country_id = c.country_id \
                 FROM streets s JOIN cities c ON c.id = s.city_id \
                 WHERE s.id = $1 AND u.street_id = s.id",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
            tracing::debug!(
                street_id = id,
                users = moved.rows_affected(),
                "Re-parented street placements",
            );
        }

        let query = format!("{SELECT} WHERE s.id = $1");
        let street = sqlx::query_as::<_, StreetRow>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(street))
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM streets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
