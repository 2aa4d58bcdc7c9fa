//! Typed field access over decoded JSON request bodies.
//!
//! A [`Payload`] reads fields out of a JSON object and records a field-scoped
//! message for every missing, null, blank, or mistyped value. Handlers pull
//! each field they care about, then call [`Payload::finish`] to get either the
//! collected errors or nothing.
//!
//! In [`Mode::Create`] required fields must be present. In [`Mode::Patch`]
//! absent fields mean "leave unchanged".

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::types::DbId;
use crate::validation::{self, FieldErrors};

/// Whether the payload describes a new row or a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Patch,
}

/// Three-state update for nullable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field absent: keep the stored value.
    Keep,
    /// Field explicitly `null` (or blank, for nullable text).
    Clear,
    /// Field set to a new value.
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Keep => Patch::Keep,
            Patch::Clear => Patch::Clear,
            Patch::Set(value) => Patch::Set(f(value)),
        }
    }

    /// Resolve against the currently stored value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Keep => current,
            Patch::Clear => None,
            Patch::Set(value) => Some(value),
        }
    }
}

/// Length limit applied to a text field.
#[derive(Debug, Clone, Copy)]
pub struct TextRule {
    pub max_length: Option<usize>,
}

impl TextRule {
    pub const fn max(max_length: usize) -> Self {
        Self {
            max_length: Some(max_length),
        }
    }

    pub const fn unbounded() -> Self {
        Self { max_length: None }
    }
}

/// Field reader over a JSON object.
pub struct Payload<'a> {
    body: &'a Map<String, Value>,
    mode: Mode,
    errors: FieldErrors,
}

impl<'a> Payload<'a> {
    pub fn new(body: &'a Map<String, Value>, mode: Mode) -> Self {
        Self {
            body,
            mode,
            errors: FieldErrors::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the body mentions the field at all (even as `null`).
    pub fn has(&self, name: &str) -> bool {
        self.body.contains_key(name)
    }

    /// Record an error produced outside the reader (e.g. a format rule).
    pub fn reject(&mut self, name: &str, message: impl Into<String>) {
        self.errors.add(name, message);
    }

    /// Fold a whole error set into the reader.
    pub fn absorb(&mut self, errors: FieldErrors) {
        self.errors.merge(errors);
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Consume the reader, returning the collected errors if there are any.
    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Like [`finish`](Self::finish), but hands back the required values read
    /// earlier (combine several with `Option::zip`).
    ///
    /// Required readers record an error whenever they return `None` in create
    /// mode, so a `None` here without errors means the caller read nothing.
    pub fn finish_with<T>(self, value: Option<T>) -> Result<T, FieldErrors> {
        self.finish()?;
        value.ok_or_else(|| FieldErrors::single(validation::NON_FIELD_ERRORS, "Invalid data."))
    }

    /// A non-null, non-blank string.
    ///
    /// Returns `None` when the field is absent in patch mode or invalid.
    /// Leading and trailing whitespace is trimmed before checks.
    pub fn text(&mut self, name: &str, rule: TextRule) -> Option<String> {
        match self.field(name) {
            None => {
                self.missing(name);
                None
            }
            Some(Value::Null) => {
                self.errors.add(name, validation::MAY_NOT_BE_NULL);
                None
            }
            Some(Value::String(raw)) if raw.contains('\0') => {
                self.errors.add(name, validation::NULL_CHARACTERS);
                None
            }
            Some(Value::String(raw)) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    self.errors.add(name, validation::MAY_NOT_BE_BLANK);
                    return None;
                }
                self.check_length(name, trimmed, rule).then(|| trimmed.to_string())
            }
            Some(Value::Number(n)) => {
                // Numbers are accepted for text fields and kept verbatim.
                let text = n.to_string();
                self.check_length(name, &text, rule).then_some(text)
            }
            Some(_) => {
                self.errors.add(name, validation::INVALID_STRING);
                None
            }
        }
    }

    /// A raw string that is neither trimmed nor length-checked (passwords).
    pub fn secret(&mut self, name: &str) -> Option<String> {
        match self.field(name) {
            None => {
                self.missing(name);
                None
            }
            Some(Value::Null) => {
                self.errors.add(name, validation::MAY_NOT_BE_NULL);
                None
            }
            Some(Value::String(raw)) if raw.is_empty() => {
                self.errors.add(name, validation::MAY_NOT_BE_BLANK);
                None
            }
            Some(Value::String(raw)) if raw.contains('\0') => {
                self.errors.add(name, validation::NULL_CHARACTERS);
                None
            }
            Some(Value::String(raw)) => Some(raw.clone()),
            Some(_) => {
                self.errors.add(name, validation::INVALID_STRING);
                None
            }
        }
    }

    /// Optional text where `null` and `""` both clear the stored value.
    pub fn nullable_text(&mut self, name: &str, rule: TextRule) -> Patch<String> {
        match self.field(name) {
            None => Patch::Keep,
            Some(Value::Null) => Patch::Clear,
            Some(Value::String(raw)) if raw.contains('\0') => {
                self.errors.add(name, validation::NULL_CHARACTERS);
                Patch::Keep
            }
            Some(Value::String(raw)) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Patch::Clear
                } else if self.check_length(name, trimmed, rule) {
                    Patch::Set(trimmed.to_string())
                } else {
                    Patch::Keep
                }
            }
            Some(_) => {
                self.errors.add(name, validation::INVALID_STRING);
                Patch::Keep
            }
        }
    }

    /// One of a fixed set of string choices.
    pub fn choice(&mut self, name: &str, choices: &[&'static str]) -> Option<&'static str> {
        match self.field(name) {
            None => None,
            Some(Value::Null) => {
                self.errors.add(name, validation::MAY_NOT_BE_NULL);
                None
            }
            Some(value) => {
                let raw = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                match choices.iter().find(|c| **c == raw) {
                    Some(choice) => Some(*choice),
                    None => {
                        self.errors.add(name, validation::invalid_choice(&raw));
                        None
                    }
                }
            }
        }
    }

    /// A required reference to another row by primary key.
    pub fn reference(&mut self, name: &str) -> Option<DbId> {
        match self.field(name) {
            None => {
                self.missing(name);
                None
            }
            Some(Value::Null) => {
                self.errors.add(name, validation::MAY_NOT_BE_NULL);
                None
            }
            Some(value) => self.parse_id(name, value),
        }
    }

    /// An optional reference; `null` clears it.
    pub fn nullable_reference(&mut self, name: &str) -> Patch<DbId> {
        match self.field(name) {
            None => Patch::Keep,
            Some(Value::Null) => Patch::Clear,
            Some(value) => match self.parse_id(name, value) {
                Some(id) => Patch::Set(id),
                None => Patch::Keep,
            },
        }
    }

    /// A decimal number given either as a JSON number or a numeric string.
    pub fn decimal(&mut self, name: &str) -> Option<Decimal> {
        let raw = match self.field(name) {
            None => {
                self.missing(name);
                return None;
            }
            Some(Value::Null) => {
                self.errors.add(name, validation::MAY_NOT_BE_NULL);
                return None;
            }
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(_) => {
                self.errors.add(name, validation::INVALID_NUMBER);
                return None;
            }
        };
        match raw.parse::<Decimal>().or_else(|_| Decimal::from_scientific(&raw)) {
            Ok(value) => Some(value),
            Err(_) => {
                self.errors.add(name, validation::INVALID_NUMBER);
                None
            }
        }
    }

    /// A JSON array. A missing array in create mode yields an empty slice.
    pub fn list(&mut self, name: &str) -> Option<&'a [Value]> {
        match self.field(name) {
            None => match self.mode {
                Mode::Create => Some(&[]),
                Mode::Patch => None,
            },
            Some(Value::Null) => {
                self.errors.add(name, validation::MAY_NOT_BE_NULL);
                None
            }
            Some(Value::Array(items)) => Some(items.as_slice()),
            Some(other) => {
                self.errors.add(name, validation::not_a_list(json_kind(other)));
                None
            }
        }
    }

    fn field(&self, name: &str) -> Option<&'a Value> {
        self.body.get(name)
    }

    fn missing(&mut self, name: &str) {
        if self.mode == Mode::Create {
            self.errors.add(name, validation::REQUIRED);
        }
    }

    fn check_length(&mut self, name: &str, value: &str, rule: TextRule) -> bool {
        match rule.max_length {
            Some(max) if value.chars().count() > max => {
                self.errors.add(name, validation::too_long(max));
                false
            }
            _ => true,
        }
    }

    fn parse_id(&mut self, name: &str, value: &Value) -> Option<DbId> {
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<DbId>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.add(name, validation::INVALID_INTEGER);
        }
        parsed
    }
}

/// Human name of a JSON value's type, as used in list errors.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
