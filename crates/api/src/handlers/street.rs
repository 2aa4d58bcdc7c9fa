//! Handlers for the `/streets` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use classifieds_core::error::CoreError;
use classifieds_core::location::LOCATION_NAME_MAX_LENGTH;
use classifieds_core::payload::{Mode, Payload, TextRule};
use classifieds_core::types::DbId;
use classifieds_core::validation::does_not_exist;
use classifieds_db::models::location::{CreateStreet, Street, UpdateStreet};
use classifieds_db::repositories::{CityRepo, StreetRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{IdPath, JsonBody, ListQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::query::CityFilter;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Street",
        id,
    })
}

async fn read_city(state: &AppState, payload: &mut Payload<'_>) -> AppResult<Option<DbId>> {
    let city_id = payload.reference("city");
    if let Some(id) = city_id {
        if CityRepo::find_by_id(&state.pool, id).await?.is_none() {
            payload.reject("city", does_not_exist(id));
            return Ok(None);
        }
    }
    Ok(city_id)
}

/// POST /api/v1/streets
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<Street>)> {
    let mut payload = Payload::new(&body, Mode::Create);
    let name = payload.text("name", TextRule::max(LOCATION_NAME_MAX_LENGTH));
    let city_id = read_city(&state, &mut payload).await?;
    let (name, city_id) = payload.finish_with(name.zip(city_id))?;

    let row = StreetRepo::create(&state.pool, &CreateStreet { name, city_id }).await?;
    tracing::info!(street_id = row.id, city_id, user_id = staff.user_id, "Street created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/v1/streets
///
/// Supports `?city=<id>`.
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    ListQuery(params): ListQuery<CityFilter>,
) -> AppResult<Json<Vec<Street>>> {
    let rows = StreetRepo::list(&state.pool, params.city, params.limit, params.offset).await?;
    Ok(Json(rows.into_iter().map(Street::from).collect()))
}

/// GET /api/v1/streets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Street>> {
    let row = StreetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(row.into()))
}

/// PATCH /api/v1/streets/{id}
///
/// Moving a street to another city re-points the city and country of every
/// user placed on it.
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody,
) -> AppResult<Json<Street>> {
    StreetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let mut payload = Payload::new(&body, Mode::Patch);
    let name = payload.text("name", TextRule::max(LOCATION_NAME_MAX_LENGTH));
    let city_id = read_city(&state, &mut payload).await?;
    payload.finish()?;

    let row = StreetRepo::update(&state.pool, id, &UpdateStreet { name, city_id })
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(street_id = id, user_id = staff.user_id, "Street updated");
    Ok(Json(row.into()))
}

/// DELETE /api/v1/streets/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    if StreetRepo::delete(&state.pool, id).await? {
        tracing::info!(street_id = id, user_id = staff.user_id, "Street deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
