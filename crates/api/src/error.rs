use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use classifieds_core::advertisement::{
    ADVERTISEMENT_CHARACTERISTIC_TAKEN, CATEGORY_CHARACTERISTIC_TAKEN, CATEGORY_NAME_TAKEN,
    CHARACTERISTIC_NAME_TAKEN, PRICE_NEGATIVE,
};
use classifieds_core::error::CoreError;
use classifieds_core::location::COUNTRY_NAME_TAKEN;
use classifieds_core::user::{EMAIL_TAKEN, PHONE_NUMBER_TAKEN, USERNAME_TAKEN};
use classifieds_core::validation::{FieldErrors, NON_FIELD_ERRORS};
use serde_json::json;

/// Detail returned for unknown ids and unknown routes.
pub const NOT_FOUND: &str = "Not found.";
/// Detail returned for every 500 response; the cause is only logged.
pub const SERVER_ERROR: &str = "A server error occurred.";
/// Detail returned when a write references a row that vanished mid-request.
pub const MISSING_REFERENCE: &str = "Referenced object does not exist.";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Validation errors render as a `field -> [messages]` object; everything
/// else renders as `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `classifieds_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A request-level problem reported as a detail message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A known route was hit with an unsupported method.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),

    /// No route matches the request path.
    #[error("Route not found")]
    RouteNotFound,

    /// An internal error with a human-readable message (logged, not returned).
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Core(CoreError::Validation(errors))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => detail(StatusCode::NOT_FOUND, NOT_FOUND),
                CoreError::Validation(errors) => field_errors(errors),
                CoreError::Unauthorized(msg) => unauthorized(&msg),
                CoreError::Forbidden(msg) => detail(StatusCode::FORBIDDEN, &msg),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
                }
            },

            AppError::Database(err) => classify_sqlx_error(&err),

            AppError::BadRequest(msg) => detail(StatusCode::BAD_REQUEST, &msg),
            AppError::MethodNotAllowed(method) => detail(
                StatusCode::METHOD_NOT_ALLOWED,
                &format!("Method \"{method}\" not allowed."),
            ),
            AppError::RouteNotFound => detail(StatusCode::NOT_FOUND, NOT_FOUND),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
            }
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn field_errors(errors: FieldErrors) -> Response {
    (StatusCode::BAD_REQUEST, Json(errors)).into_response()
}

fn unauthorized(message: &str) -> Response {
    let mut response = detail(StatusCode::UNAUTHORIZED, message);
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer realm=\"api\""));
    response
}

/// Classify a sqlx error into an HTTP response.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on `uq_*` constraints map to the same field errors the
///   handlers' pre-checks produce.
/// - Foreign-key and check violations map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> Response {
    match err {
        sqlx::Error::RowNotFound => detail(StatusCode::NOT_FOUND, NOT_FOUND),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") if constraint.starts_with("uq_") => {
                    tracing::debug!(constraint, "Unique constraint violation");
                    field_errors(unique_violation_errors(constraint))
                }
                // foreign_key_violation
                Some("23503") => {
                    tracing::debug!(constraint, "Foreign key violation");
                    detail(StatusCode::BAD_REQUEST, MISSING_REFERENCE)
                }
                // check_violation
                Some("23514") if constraint == "ck_advertisements_price" => {
                    field_errors(FieldErrors::single("price", PRICE_NEGATIVE))
                }
                _ => {
                    tracing::error!(error = %db_err, "Database error");
                    detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
                }
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
        }
    }
}

/// Field errors equivalent to a violated unique constraint.
pub fn unique_violation_errors(constraint: &str) -> FieldErrors {
    let (field, message) = match constraint {
        "uq_users_username" => ("username", USERNAME_TAKEN),
        "uq_users_email" => ("email", EMAIL_TAKEN),
        "uq_users_phone_number" => ("phone_number", PHONE_NUMBER_TAKEN),
        "uq_countries_name" => ("name", COUNTRY_NAME_TAKEN),
        "uq_categories_name" => ("name", CATEGORY_NAME_TAKEN),
        "uq_characteristics_name" => ("name", CHARACTERISTIC_NAME_TAKEN),
        "uq_category_characteristics_category_characteristic" => {
            (NON_FIELD_ERRORS, CATEGORY_CHARACTERISTIC_TAKEN)
        }
        "uq_advertisement_characteristics_advertisement_characteristic" => {
            (NON_FIELD_ERRORS, ADVERTISEMENT_CHARACTERISTIC_TAKEN)
        }
        _ => (NON_FIELD_ERRORS, "Duplicate value."),
    };
    FieldErrors::single(field, message)
}
