//! Advertisement and advertisement-characteristic models.

use classifieds_core::advertisement::CharacteristicValue;
use classifieds_core::payload::Patch;
use classifieds_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::catalog::Characteristic;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `advertisements` table.
#[derive(Debug, Clone, FromRow)]
pub struct Advertisement {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub author_id: DbId,
    pub category_id: DbId,
    pub price: Decimal,
    pub viewed_count: i32,
    pub created_at: Timestamp,
}

/// An `advertisement_characteristics` row joined with the characteristic name
/// and the advertisement's author.
#[derive(Debug, Clone, FromRow)]
pub struct AdvertisementCharacteristicRow {
    pub id: DbId,
    pub advertisement_id: DbId,
    pub author_id: DbId,
    pub characteristic_id: DbId,
    pub characteristic_name: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Characteristic value as embedded in an advertisement response.
#[derive(Debug, Clone, Serialize)]
pub struct CharacteristicEntry {
    pub id: DbId,
    pub characteristic: Characteristic,
    pub value: String,
}

/// Standalone advertisement-characteristic response.
#[derive(Debug, Clone, Serialize)]
pub struct AdvertisementCharacteristic {
    pub id: DbId,
    pub advertisement: DbId,
    pub characteristic: Characteristic,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvertisementResponse {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub author: DbId,
    pub category: DbId,
    pub characteristics: Vec<CharacteristicEntry>,
    pub price: Decimal,
    pub viewed_count: i32,
    pub created_at: Timestamp,
}

impl From<AdvertisementCharacteristicRow> for CharacteristicEntry {
    fn from(row: AdvertisementCharacteristicRow) -> Self {
        CharacteristicEntry {
            id: row.id,
            characteristic: Characteristic {
                id: row.characteristic_id,
                name: row.characteristic_name,
            },
            value: row.value,
        }
    }
}

impl From<AdvertisementCharacteristicRow> for AdvertisementCharacteristic {
    fn from(row: AdvertisementCharacteristicRow) -> Self {
        AdvertisementCharacteristic {
            id: row.id,
            advertisement: row.advertisement_id,
            characteristic: Characteristic {
                id: row.characteristic_id,
                name: row.characteristic_name,
            },
            value: row.value,
        }
    }
}

impl AdvertisementResponse {
    /// Combine an advertisement with its characteristic rows.
    ///
    /// Rows belonging to other advertisements are ignored.
    pub fn assemble(ad: Advertisement, rows: &[AdvertisementCharacteristicRow]) -> Self {
        let characteristics = rows
            .iter()
            .filter(|row| row.advertisement_id == ad.id)
            .cloned()
            .map(CharacteristicEntry::from)
            .collect();
        AdvertisementResponse {
            id: ad.id,
            name: ad.name,
            description: ad.description,
            author: ad.author_id,
            category: ad.category_id,
            characteristics,
            price: ad.price,
            viewed_count: ad.viewed_count,
            created_at: ad.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating an advertisement together with its characteristics.
#[derive(Debug, Clone)]
pub struct CreateAdvertisement {
    pub name: String,
    pub description: Option<String>,
    pub author_id: DbId,
    pub category_id: DbId,
    pub price: Decimal,
    pub characteristics: Vec<CharacteristicValue>,
}

/// DTO for partially updating an advertisement.
///
/// `characteristics`, when present, replaces the whole set.
#[derive(Debug, Clone, Default)]
pub struct UpdateAdvertisement {
    pub name: Option<String>,
    pub description: Patch<String>,
    pub category_id: Option<DbId>,
    pub price: Option<Decimal>,
    pub characteristics: Option<Vec<CharacteristicValue>>,
}

/// Filters for listing advertisements.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvertisementFilter {
    pub author_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// DTO for a single characteristic row attached to an existing advertisement.
#[derive(Debug, Clone)]
pub struct CreateAdvertisementCharacteristic {
    pub advertisement_id: DbId,
    pub characteristic_id: DbId,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAdvertisementCharacteristic {
    pub characteristic_id: Option<DbId>,
    pub value: Option<String>,
}
