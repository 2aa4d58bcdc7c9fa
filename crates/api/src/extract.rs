//! Request extractors whose rejections render as JSON [`AppError`]s.
//!
//! Handlers read body fields out of [`JsonBody`] with
//! [`classifieds_core::payload::Payload`] so that every missing, null or
//! mistyped field is reported by name instead of failing deserialization as
//! a whole.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use classifieds_core::payload::json_kind;
use classifieds_core::types::DbId;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// A JSON object request body. An empty body reads as `{}`.
#[derive(Debug, Clone, Default)]
pub struct JsonBody(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(Map::new()));
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(JsonBody(map)),
            Ok(other) => Err(AppError::BadRequest(format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_kind(&other)
            ))),
            Err(e) => Err(AppError::BadRequest(format!("JSON parse error - {e}"))),
        }
    }
}

/// The `{id}` segment of an item route. An id that does not parse as an
/// integer cannot name a row, so it is a 404 like any unknown id.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub DbId);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<DbId>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection.body_text(), "Unparseable path id");
                AppError::RouteNotFound
            })?;
        Ok(IdPath(id))
    }
}

/// Query string parameters of a list route.
#[derive(Debug, Clone, Default)]
pub struct ListQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ListQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(ListQuery(params))
    }
}
