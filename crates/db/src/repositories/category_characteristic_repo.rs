//! Repository for the `category_characteristics` association table.

use std::collections::HashSet;

use classifieds_core::pagination::{clamp_limit, clamp_offset};
use classifieds_core::types::DbId;
use sqlx::PgPool;

use crate::models::catalog::{CategoryCharacteristicRow, UpdateCategoryCharacteristic};

const SELECT: &str = "\
    SELECT cc.id, cc.category_id, ca.name AS category_name, \
           cc.characteristic_id, ch.name AS characteristic_name \
    FROM category_characteristics cc \
    JOIN categories ca ON ca.id = cc.category_id \
    JOIN characteristics ch ON ch.id = cc.characteristic_id";

/// Provides CRUD operations for category/characteristic associations.
pub struct CategoryCharacteristicRepo;

impl CategoryCharacteristicRepo {
    pub async fn create(
        pool: &PgPool,
        category_id: DbId,
        characteristic_id: DbId,
    ) -> Result<CategoryCharacteristicRow, sqlx::Error> {
        sqlx::query_as::<_, CategoryCharacteristicRow>(
            "WITH cc AS ( \
                 INSERT INTO category_characteristics (category_id, characteristic_id) \
                 VALUES ($1, $2) \
                 RETURNING id, category_id, characteristic_id \
             ) \
             SELECT cc.id, cc.category_id, ca.name AS category_name, \
                    cc.characteristic_id, ch.name AS characteristic_name \
             FROM cc \
             JOIN categories ca ON ca.id = cc.category_id \
             JOIN characteristics ch ON ch.id = cc.characteristic_id",
        )
        .bind(category_id)
        .bind(characteristic_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CategoryCharacteristicRow>, sqlx::Error> {
        let query = format!("{SELECT} WHERE cc.id = $1");
        sqlx::query_as::<_, CategoryCharacteristicRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List associations, optionally restricted to one category.
    pub async fn list(
        pool: &PgPool,
        category_id: Option<DbId>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<CategoryCharacteristicRow>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE ($1::BIGINT IS NULL OR cc.category_id = $1) \
             ORDER BY cc.id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CategoryCharacteristicRow>(&query)
            .bind(category_id)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Whether the pair is already associated by a row other than `exclude_id`.
    pub async fn pair_exists(
        pool: &PgPool,
        category_id: DbId,
        characteristic_id: DbId,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM category_characteristics \
             WHERE category_id = $1 AND characteristic_id = $2 \
               AND id IS DISTINCT FROM $3)",
        )
        .bind(category_id)
        .bind(characteristic_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// The subset of `characteristic_ids` declared for `category_id`.
    pub async fn declared_for(
        pool: &PgPool,
        category_id: DbId,
        characteristic_ids: &[DbId],
    ) -> Result<HashSet<DbId>, sqlx::Error> {
        if characteristic_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<DbId> = sqlx::query_scalar(
            "SELECT characteristic_id FROM category_characteristics \
             WHERE category_id = $1 AND characteristic_id = ANY($2)",
        )
        .bind(category_id)
        .bind(characteristic_ids)
        .fetch_all(pool)
        .await?;
        Ok(found.into_iter().collect())
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategoryCharacteristic,
    ) -> Result<Option<CategoryCharacteristicRow>, sqlx::Error> {
        sqlx::query_as::<_, CategoryCharacteristicRow>(
            "WITH cc AS ( \
                 UPDATE category_characteristics SET \
                     category_id = COALESCE($2, category_id), \
                     characteristic_id = COALESCE($3, characteristic_id) \
                 WHERE id = $1 \
                 RETURNING id, category_id, characteristic_id \
             ) \
             SELECT cc.id, cc.category_id, ca.name AS category_name, \
                    cc.characteristic_id, ch.name AS characteristic_name \
             FROM cc \
             JOIN categories ca ON ca.id = cc.category_id \
             JOIN characteristics ch ON ch.id = cc.characteristic_id",
        )
        .bind(id)
        .bind(input.category_id)
        .bind(input.characteristic_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM category_characteristics WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
