//! Shared query parameter types for API handlers.

use classifieds_core::types::DbId;
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped in the repository layer via `clamp_limit` /
/// `clamp_offset`.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?country=` filter plus pagination (cities).
#[derive(Debug, Default, Deserialize)]
pub struct CountryFilter {
    pub country: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?city=` filter plus pagination (streets).
#[derive(Debug, Default, Deserialize)]
pub struct CityFilter {
    pub city: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?category=` filter plus pagination (category characteristics).
#[derive(Debug, Default, Deserialize)]
pub struct CategoryFilter {
    pub category: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?author=&category=` filters plus pagination (advertisements).
#[derive(Debug, Default, Deserialize)]
pub struct AdvertisementParams {
    pub author: Option<DbId>,
    pub category: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?author=&advertisement=` filters plus pagination (advertisement
/// characteristics).
#[derive(Debug, Default, Deserialize)]
pub struct AdvertisementCharacteristicParams {
    pub author: Option<DbId>,
    pub advertisement: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
