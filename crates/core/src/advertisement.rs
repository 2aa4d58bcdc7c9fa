//! Catalog and advertisement rules: name limits, price precision, and the
//! characteristic set attached to an advertisement.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::payload::{json_kind, Mode, Payload, TextRule};
use crate::types::DbId;
use crate::validation::{self, FieldErrors};

/// Maximum length of category and characteristic names.
pub const CATALOG_NAME_MAX_LENGTH: usize = 40;
pub const ADVERTISEMENT_NAME_MAX_LENGTH: usize = 100;
pub const CHARACTERISTIC_VALUE_MAX_LENGTH: usize = 40;

/// `NUMERIC(16, 2)`.
pub const PRICE_MAX_DIGITS: u32 = 16;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

pub const CATEGORY_NAME_TAKEN: &str = "category with this name already exists.";
pub const CHARACTERISTIC_NAME_TAKEN: &str = "characteristic with this name already exists.";
pub const CATEGORY_CHARACTERISTIC_TAKEN: &str =
    "The fields category, characteristic must make a unique set.";
pub const ADVERTISEMENT_CHARACTERISTIC_TAKEN: &str =
    "The fields advertisement, characteristic must make a unique set.";
pub const PRICE_NEGATIVE: &str = "Ensure this value is greater than or equal to 0.";

/// Field name under which characteristic-set errors are reported.
pub const CHARACTERISTICS_FIELD: &str = "characteristics";

/// One `{characteristic, value}` pair submitted with an advertisement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicValue {
    pub characteristic_id: DbId,
    pub value: String,
}

/// Check a price against the sign and precision rules of the `price` column.
///
/// Trailing fractional zeros are ignored, so `10.500` counts as two decimal
/// places.
pub fn validate_price(price: &Decimal) -> Vec<String> {
    let mut errors = Vec::new();
    if price.is_sign_negative() && !price.is_zero() {
        errors.push(PRICE_NEGATIVE.to_string());
    }

    let normalized = price.normalize();
    let scale = normalized.scale();
    let digits = digit_count(normalized.mantissa().unsigned_abs());
    let (total, whole) = if scale >= digits {
        (scale, 0)
    } else {
        (digits, digits - scale)
    };

    let max_whole = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;
    if total > PRICE_MAX_DIGITS {
        errors.push(format!(
            "Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."
        ));
    }
    if scale > PRICE_DECIMAL_PLACES {
        errors.push(format!(
            "Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."
        ));
    }
    if whole > max_whole {
        errors.push(format!(
            "Ensure that there are no more than {max_whole} digits before the decimal point."
        ));
    }
    errors
}

fn digit_count(mut n: u128) -> u32 {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

/// Parse the `characteristics` array of an advertisement payload.
///
/// Each item must be an object carrying a `characteristic` id and a `value`.
/// Item errors are reported under [`CHARACTERISTICS_FIELD`], prefixed with the
/// zero-based item index.
pub fn read_characteristics(items: &[Value]) -> Result<Vec<CharacteristicValue>, FieldErrors> {
    let mut parsed = Vec::with_capacity(items.len());
    let mut errors = FieldErrors::new();

    for (index, item) in items.iter().enumerate() {
        let Value::Object(body) = item else {
            errors.add(
                CHARACTERISTICS_FIELD,
                format!(
                    "Item {index}: Invalid data. Expected a dictionary, but got {}.",
                    json_kind(item)
                ),
            );
            continue;
        };

        let mut payload = Payload::new(body, Mode::Create);
        let characteristic_id = payload.reference("characteristic");
        let value = payload.text("value", TextRule::max(CHARACTERISTIC_VALUE_MAX_LENGTH));
        match (payload.finish(), characteristic_id, value) {
            (Ok(()), Some(characteristic_id), Some(value)) => parsed.push(CharacteristicValue {
                characteristic_id,
                value,
            }),
            (Err(item_errors), ..) => {
                errors.add(CHARACTERISTICS_FIELD, format!("Item {index}: {item_errors}"));
            }
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(parsed)
    } else {
        Err(errors)
    }
}

/// Check a characteristic set against the catalog.
///
/// `existing` holds the ids among `values` that exist at all; `declared` holds
/// those declared for the advertisement's category. Every characteristic must
/// exist, be declared, and appear at most once.
pub fn check_characteristic_set(
    values: &[CharacteristicValue],
    existing: &HashSet<DbId>,
    declared: &HashSet<DbId>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let mut seen = HashSet::with_capacity(values.len());

    for item in values {
        let id = item.characteristic_id;
        if !existing.contains(&id) {
            errors.add(CHARACTERISTICS_FIELD, validation::does_not_exist(id));
        } else if !declared.contains(&id) {
            errors.add(CHARACTERISTICS_FIELD, not_declared(id));
        }
        if !seen.insert(id) {
            errors.add(CHARACTERISTICS_FIELD, duplicated(id));
        }
    }
    errors
}

/// `Characteristic "<id>" is not available for this category.`
pub fn not_declared(id: DbId) -> String {
    format!("Characteristic \"{id}\" is not available for this category.")
}

/// `Characteristic "<id>" is listed more than once.`
pub fn duplicated(id: DbId) -> String {
    format!("Characteristic \"{id}\" is listed more than once.")
}
