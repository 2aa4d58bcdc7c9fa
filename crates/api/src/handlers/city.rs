//! Handlers for the `/cities` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use classifieds_core::error::CoreError;
use classifieds_core::location::LOCATION_NAME_MAX_LENGTH;
use classifieds_core::payload::{Mode, Payload, TextRule};
use classifieds_core::types::DbId;
use classifieds_core::validation::does_not_exist;
use classifieds_db::models::location::{City, CreateCity, UpdateCity};
use classifieds_db::repositories::{CityRepo, CountryRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{IdPath, JsonBody, ListQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::query::CountryFilter;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "City", id })
}

/// Read the `country` reference and confirm the row exists.
async fn read_country(state: &AppState, payload: &mut Payload<'_>) -> AppResult<Option<DbId>> {
    let country_id = payload.reference("country");
    if let Some(id) = country_id {
        if !CountryRepo::exists(&state.pool, id).await? {
            payload.reject("country", does_not_exist(id));
            return Ok(None);
        }
    }
    Ok(country_id)
}

/// POST /api/v1/cities
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<City>)> {
    let mut payload = Payload::new(&body, Mode::Create);
    let name = payload.text("name", TextRule::max(LOCATION_NAME_MAX_LENGTH));
    let country_id = read_country(&state, &mut payload).await?;
    let (name, country_id) = payload.finish_with(name.zip(country_id))?;

    let row = CityRepo::create(&state.pool, &CreateCity { name, country_id }).await?;
    tracing::info!(city_id = row.id, country_id, user_id = staff.user_id, "City created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/v1/cities
///
/// Supports `?country=<id>`.
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    ListQuery(params): ListQuery<CountryFilter>,
) -> AppResult<Json<Vec<City>>> {
    let rows = CityRepo::list(&state.pool, params.country, params.limit, params.offset).await?;
    Ok(Json(rows.into_iter().map(City::from).collect()))
}

/// GET /api/v1/cities/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<City>> {
    let row = CityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(row.into()))
}

/// PATCH /api/v1/cities/{id}
///
/// Moving a city to another country also moves the country pointer of every
/// user placed in it.
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody,
) -> AppResult<Json<City>> {
    CityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let mut payload = Payload::new(&body, Mode::Patch);
    let name = payload.text("name", TextRule::max(LOCATION_NAME_MAX_LENGTH));
    let country_id = read_country(&state, &mut payload).await?;
    payload.finish()?;

    let input = UpdateCity { name, country_id };
    let row = CityRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(city_id = id, user_id = staff.user_id, "City updated");
    Ok(Json(row.into()))
}

/// DELETE /api/v1/cities/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    if CityRepo::delete(&state.pool, id).await? {
        tracing::info!(city_id = id, user_id = staff.user_id, "City deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
