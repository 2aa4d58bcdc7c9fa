//! Repository for single rows of `advertisement_characteristics`.

use classifieds_core::pagination::{clamp_limit, clamp_offset};
use classifieds_core::types::DbId;
use sqlx::PgPool;

use super::advertisement_repo::CHARACTERISTIC_SELECT;
use crate::models::advertisement::{
    AdvertisementCharacteristicRow, CreateAdvertisementCharacteristic,
    UpdateAdvertisementCharacteristic,
};

/// Provides CRUD operations for advertisement characteristics.
pub struct AdvertisementCharacteristicRepo;

impl AdvertisementCharacteristicRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateAdvertisementCharacteristic,
    ) -> Result<AdvertisementCharacteristicRow, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO advertisement_characteristics \
                 (advertisement_id, characteristic_id, value) \
             VALUES ($1, $2, $3) \
             RETURNING id",
        )
        .bind(input.advertisement_id)
        .bind(input.characteristic_id)
        .bind(&input.value)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AdvertisementCharacteristicRow>, sqlx::Error> {
        let query = format!("{CHARACTERISTIC_SELECT} WHERE ac.id = $1");
        sqlx::query_as::<_, AdvertisementCharacteristicRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List rows, optionally restricted to advertisements of one author
    /// and/or to one advertisement.
    pub async fn list(
        pool: &PgPool,
        author_id: Option<DbId>,
        advertisement_id: Option<DbId>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<AdvertisementCharacteristicRow>, sqlx::Error> {
        let query = format!(
            "{CHARACTERISTIC_SELECT} \
             WHERE ($1::BIGINT IS NULL OR a.author_id = $1) \
               AND ($2::BIGINT IS NULL OR ac.advertisement_id = $2) \
             ORDER BY ac.id LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, AdvertisementCharacteristicRow>(&query)
            .bind(author_id)
            .bind(advertisement_id)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Whether the advertisement already carries the characteristic in a row
    /// other than `exclude_id`.
    pub async fn pair_exists(
        pool: &PgPool,
        advertisement_id: DbId,
        characteristic_id: DbId,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM advertisement_characteristics \
             WHERE advertisement_id = $1 AND characteristic_id = $2 \
               AND id IS DISTINCT FROM $3)",
        )
        .bind(advertisement_id)
        .bind(characteristic_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAdvertisementCharacteristic,
    ) -> Result<Option<AdvertisementCharacteristicRow>, sqlx::Error> {
        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE advertisement_characteristics SET \
                 characteristic_id = COALESCE($2, characteristic_id), \
                 value = COALESCE($3, value) \
             WHERE id = $1 \
             RETURNING id",
        )
        .bind(id)
        .bind(input.characteristic_id)
        .bind(&input.value)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => Self::find_by_id(pool, id).await,
            None => Ok(None),
        }
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM advertisement_characteristics WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
