//! Category, characteristic, and category-characteristic models.

use classifieds_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `categories` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
}

/// A row from the `characteristics` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Characteristic {
    pub id: DbId,
    pub name: String,
}

/// A `category_characteristics` row joined with both sides.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryCharacteristicRow {
    pub id: DbId,
    pub category_id: DbId,
    pub category_name: String,
    pub characteristic_id: DbId,
    pub characteristic_name: String,
}

/// Association response with both sides nested.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCharacteristic {
    pub id: DbId,
    pub category: Category,
    pub characteristic: Characteristic,
}

impl From<CategoryCharacteristicRow> for CategoryCharacteristic {
    fn from(row: CategoryCharacteristicRow) -> Self {
        CategoryCharacteristic {
            id: row.id,
            category: Category {
                id: row.category_id,
                name: row.category_name,
            },
            characteristic: Characteristic {
                id: row.characteristic_id,
                name: row.characteristic_name,
            },
        }
    }
}

/// DTO for partially updating an association.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryCharacteristic {
    pub category_id: Option<DbId>,
    pub characteristic_id: Option<DbId>,
}
