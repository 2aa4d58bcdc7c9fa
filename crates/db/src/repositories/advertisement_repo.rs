//! Repository for the `advertisements` table and its characteristic rows.
//!
//! An advertisement and its characteristics are always written together in
//! one transaction; characteristic rows go in as a single `UNNEST` insert.

use classifieds_core::advertisement::CharacteristicValue;
use classifieds_core::pagination::{clamp_limit, clamp_offset};
use classifieds_core::types::DbId;
use sqlx::PgPool;

use crate::models::advertisement::{
    Advertisement, AdvertisementCharacteristicRow, AdvertisementFilter, CreateAdvertisement,
    UpdateAdvertisement,
};

const COLUMNS: &str =
    "id, name, description, author_id, category_id, price, viewed_count, created_at";

/// Joined select over `advertisement_characteristics`, shared with
/// [`super::AdvertisementCharacteristicRepo`].
pub(crate) const CHARACTERISTIC_SELECT: &str = "\
    SELECT ac.id, ac.advertisement_id, a.author_id, ac.characteristic_id, \
           ch.name AS characteristic_name, ac.value \
    FROM advertisement_characteristics ac \
    JOIN advertisements a ON a.id = ac.advertisement_id \
    JOIN characteristics ch ON ch.id = ac.characteristic_id";

/// Provides CRUD operations for advertisements.
pub struct AdvertisementRepo;

impl AdvertisementRepo {
    /// Insert an advertisement and all of its characteristics atomically.
    ///
    /// `viewed_count` always starts at zero.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAdvertisement,
    ) -> Result<Advertisement, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO advertisements (name, description, author_id, category_id, price) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let ad = sqlx::query_as::<_, Advertisement>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.author_id)
            .bind(input.category_id)
            .bind(input.price)
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_characteristics(&mut tx, ad.id, &input.characteristics).await?;

        tx.commit().await?;
        Ok(ad)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Advertisement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM advertisements WHERE id = $1");
        sqlx::query_as::<_, Advertisement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List advertisements matching `filter`, in id order.
    pub async fn list(
        pool: &PgPool,
        filter: &AdvertisementFilter,
    ) -> Result<Vec<Advertisement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM advertisements \
             WHERE ($1::BIGINT IS NULL OR author_id = $1) \
               AND ($2::BIGINT IS NULL OR category_id = $2) \
             ORDER BY id LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Advertisement>(&query)
            .bind(filter.author_id)
            .bind(filter.category_id)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// Characteristic rows of the given advertisements, ordered by row id.
    pub async fn characteristics_for(
        pool: &PgPool,
        advertisement_ids: &[DbId],
    ) -> Result<Vec<AdvertisementCharacteristicRow>, sqlx::Error> {
        if advertisement_ids.is_empty() {
            return Ok(vec![]);
        }
        let query =
            format!("{CHARACTERISTIC_SELECT} WHERE ac.advertisement_id = ANY($1) ORDER BY ac.id");
        sqlx::query_as::<_, AdvertisementCharacteristicRow>(&query)
            .bind(advertisement_ids)
            .fetch_all(pool)
            .await
    }

    /// Update an advertisement. Returns `None` if no row with the given `id`
    /// exists.
    ///
    /// When `characteristics` is present the stored set is replaced within
    /// the same transaction.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAdvertisement,
    ) -> Result<Option<Advertisement>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE advertisements SET \
                 name = COALESCE($2, name), \
                 description = CASE WHEN $3 THEN $4 ELSE description END, \
                 category_id = COALESCE($5, category_id), \
                 price = COALESCE($6, price) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let ad = sqlx::query_as::<_, Advertisement>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(!input.description.is_keep())
            .bind(input.description.as_set().map(String::as_str))
            .bind(input.category_id)
            .bind(input.price)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(ad) = ad else {
            return Ok(None);
        };

        if let Some(characteristics) = &input.characteristics {
            sqlx::query("DELETE FROM advertisement_characteristics WHERE advertisement_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::insert_characteristics(&mut tx, id, characteristics).await?;
        }

        tx.commit().await?;
        Ok(Some(ad))
    }

    /// Delete an advertisement and, by cascade, its characteristics.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM advertisements WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_characteristics(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        advertisement_id: DbId,
        values: &[CharacteristicValue],
    ) -> Result<(), sqlx::Error> {
        if values.is_empty() {
            return Ok(());
        }

        let characteristic_ids: Vec<DbId> = values.iter().map(|v| v.characteristic_id).collect();
        let texts: Vec<&str> = values.iter().map(|v| v.value.as_str()).collect();

        sqlx::query(
            "INSERT INTO advertisement_characteristics \
                 (advertisement_id, characteristic_id, value) \
             SELECT $1, * FROM UNNEST($2::bigint[], $3::text[])",
        )
        .bind(advertisement_id)
        .bind(&characteristic_ids)
        .bind(&texts)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
