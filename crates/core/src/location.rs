//! Location hierarchy rules and the placement normalization applied before a
//! user row is written.
//!
//! A user's `street`, `city`, and `country` pointers are denormalized copies of
//! one chain in the Country -> City -> Street hierarchy. [`reconcile`] merges a
//! requested change into the stored placement so the three pointers always
//! describe a single chain: a supplied descendant overrides any conflicting
//! ancestor, and an ancestor change drops descendants that no longer belong.

use crate::payload::Patch;
use crate::types::DbId;

/// Maximum length of country, city, and street names.
pub const LOCATION_NAME_MAX_LENGTH: usize = 100;

pub const COUNTRY_NAME_TAKEN: &str = "country with this name already exists.";

/// The three location pointers stored on a user row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub country_id: Option<DbId>,
    pub city_id: Option<DbId>,
    pub street_id: Option<DbId>,
}

/// A city together with the country it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityLink {
    pub city_id: DbId,
    pub country_id: DbId,
}

/// A street together with its full ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreetLink {
    pub street_id: DbId,
    pub city_id: DbId,
    pub country_id: DbId,
}

/// Requested change to a placement, with referenced rows already resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementChange {
    pub country: Patch<DbId>,
    pub city: Patch<CityLink>,
    pub street: Patch<StreetLink>,
}

impl PlacementChange {
    pub fn is_empty(&self) -> bool {
        self.country.is_keep() && self.city.is_keep() && self.street.is_keep()
    }
}

/// Merge `change` into `current`, producing a consistent placement.
///
/// `current` must already be consistent (every stored pointer belongs to the
/// chain of the most specific one). The most specific level that is *set*
/// decides the ancestors; clearing a level clears everything below it.
pub fn reconcile(current: Placement, change: PlacementChange) -> Placement {
    if let Patch::Set(street) = change.street {
        return Placement {
            country_id: Some(street.country_id),
            city_id: Some(street.city_id),
            street_id: Some(street.street_id),
        };
    }

    if let Patch::Set(city) = change.city {
        // The stored street can only survive if it already sits in this city.
        let street_id = match change.street {
            Patch::Clear => None,
            _ if current.city_id == Some(city.city_id) => current.street_id,
            _ => None,
        };
        return Placement {
            country_id: Some(city.country_id),
            city_id: Some(city.city_id),
            street_id,
        };
    }

    if let Patch::Set(country_id) = change.country {
        let keeps_chain = current.country_id == Some(country_id);
        let city_id = match change.city {
            Patch::Clear => None,
            _ if keeps_chain => current.city_id,
            _ => None,
        };
        let street_id = match change.street {
            Patch::Clear => None,
            _ if city_id.is_some() => current.street_id,
            _ => None,
        };
        return Placement {
            country_id: Some(country_id),
            city_id,
            street_id,
        };
    }

    let mut placement = current;
    if matches!(change.country, Patch::Clear) {
        placement = Placement::default();
    }
    if matches!(change.city, Patch::Clear) {
        placement.city_id = None;
        placement.street_id = None;
    }
    if matches!(change.street, Patch::Clear) {
        placement.street_id = None;
    }
    placement
}
