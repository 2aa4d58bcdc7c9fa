//! User account rules: type choices, contact-field formats, and the
//! messages reported for uniqueness violations.

use std::sync::LazyLock;

use regex::Regex;
use validator::Validate;

use crate::validation::FieldErrors;

pub const TYPE_PRIVATE_ENTITY: &str = "private entity";
pub const TYPE_LEGAL_ENTITY: &str = "legal entity";

/// All valid values of `users.type`.
pub const USER_TYPES: &[&str] = &[TYPE_PRIVATE_ENTITY, TYPE_LEGAL_ENTITY];

/// Type assigned when registration does not specify one.
pub const DEFAULT_USER_TYPE: &str = TYPE_PRIVATE_ENTITY;

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const PHONE_NUMBER_MAX_LENGTH: usize = 15;

pub const USERNAME_TAKEN: &str = "user with this username already exists.";
pub const EMAIL_TAKEN: &str = "A user with that email already exists.";
pub const PHONE_NUMBER_TAKEN: &str = "A user with that phone number already exists.";

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid")
});

static PHONE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9]{5,14}$").expect("phone number pattern is valid")
});

/// Format rules for the contact fields of a user.
///
/// Fields are optional so the same struct serves registration and partial
/// updates; presence is checked separately by the payload reader.
#[derive(Debug, Default, Validate)]
pub struct ContactFields {
    #[validate(regex(
        path = *USERNAME_RE,
        message = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
    ))]
    pub username: Option<String>,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,

    #[validate(regex(
        path = *PHONE_NUMBER_RE,
        message = "Enter a valid phone number: 5 to 14 digits, optionally prefixed with '+'."
    ))]
    pub phone_number: Option<String>,
}

impl ContactFields {
    /// Run the format rules, returning field-scoped messages.
    pub fn check(&self) -> FieldErrors {
        match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => errors.into(),
        }
    }
}

/// Whether `value` is one of [`USER_TYPES`].
pub fn is_valid_type(value: &str) -> bool {
    USER_TYPES.contains(&value)
}
