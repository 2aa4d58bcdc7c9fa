//! Country, city, and street models.
//!
//! Cities and streets are read joined with their ancestors so responses can
//! nest them: `street.city.country`.

use classifieds_core::location::{CityLink, StreetLink};
use classifieds_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `countries` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Country {
    pub id: DbId,
    pub name: String,
}

/// A `cities` row joined with its country.
#[derive(Debug, Clone, FromRow)]
pub struct CityRow {
    pub id: DbId,
    pub name: String,
    pub country_id: DbId,
    pub country_name: String,
}

/// A `streets` row joined with its city and country.
#[derive(Debug, Clone, FromRow)]
pub struct StreetRow {
    pub id: DbId,
    pub name: String,
    pub city_id: DbId,
    pub city_name: String,
    pub country_id: DbId,
    pub country_name: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct City {
    pub id: DbId,
    pub name: String,
    pub country: Country,
}

#[derive(Debug, Clone, Serialize)]
pub struct Street {
    pub id: DbId,
    pub name: String,
    pub city: City,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        City {
            id: row.id,
            name: row.name,
            country: Country {
                id: row.country_id,
                name: row.country_name,
            },
        }
    }
}

impl From<StreetRow> for Street {
    fn from(row: StreetRow) -> Self {
        Street {
            id: row.id,
            name: row.name,
            city: City {
                id: row.city_id,
                name: row.city_name,
                country: Country {
                    id: row.country_id,
                    name: row.country_name,
                },
            },
        }
    }
}

impl CityRow {
    pub fn link(&self) -> CityLink {
        CityLink {
            city_id: self.id,
            country_id: self.country_id,
        }
    }
}

impl StreetRow {
    pub fn link(&self) -> StreetLink {
        StreetLink {
            street_id: self.id,
            city_id: self.city_id,
            country_id: self.country_id,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CreateCity {
    pub name: String,
    pub country_id: DbId,
}

/// Partial city update. A changed `country_id` re-parents the city.
#[derive(Debug, Clone, Default)]
pub struct UpdateCity {
    pub name: Option<String>,
    pub country_id: Option<DbId>,
}

#[derive(Debug, Clone)]
pub struct CreateStreet {
    pub name: String,
    pub city_id: DbId,
}

/// Partial street update. A changed `city_id` re-parents the street.
#[derive(Debug, Clone, Default)]
pub struct UpdateStreet {
    pub name: Option<String>,
    pub city_id: Option<DbId>,
}
