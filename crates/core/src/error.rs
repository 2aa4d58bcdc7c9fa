use crate::types::DbId;
use crate::validation::FieldErrors;

/// Detail message for requests that carry no credentials.
pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
/// Detail message for a malformed, expired, or forged bearer token.
pub const INVALID_TOKEN: &str = "Invalid token.";
/// Detail message for a valid token whose user is gone or deactivated.
pub const INACTIVE_USER: &str = "User inactive or deleted.";
/// Detail message for an authenticated caller failing a permission rule.
pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        CoreError::Validation(errors)
    }
}
