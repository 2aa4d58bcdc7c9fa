//! Field-scoped validation errors and the standard message catalogue.
//!
//! Every validation failure surfaced to API clients is a mapping from field
//! name to a list of human-readable messages. Errors that do not belong to a
//! single field are collected under [`NON_FIELD_ERRORS`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Key used for errors that span several fields (e.g. a unique pair).
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const MAY_NOT_BE_NULL: &str = "This field may not be null.";
pub const MAY_NOT_BE_BLANK: &str = "This field may not be blank.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const NULL_CHARACTERS: &str = "Null characters are not allowed.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_NUMBER: &str = "A valid number is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

/// `"<value>" is not a valid choice.`
pub fn invalid_choice(value: &str) -> String {
    format!("\"{value}\" is not a valid choice.")
}

/// `Ensure this field has no more than <n> characters.`
pub fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// `Invalid pk "<id>" - object does not exist.`
pub fn does_not_exist(id: DbId) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// `Expected a list of items but got type "<kind>".`
pub fn not_a_list(kind: &str) -> String {
    format!("Expected a list of items but got type \"{kind}\".")
}

/// Ordered mapping of field name to validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error set holding a single message for one field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Append a message to a field, keeping earlier messages.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Fold another error set into this one.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(value)` when no errors were collected, otherwise `CoreError::Validation`.
    pub fn into_result<T>(self, value: T) -> Result<T, CoreError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, failures) in errors.field_errors() {
            for failure in failures.iter() {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}
