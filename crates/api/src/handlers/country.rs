//! Handlers for the `/countries` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use classifieds_core::error::CoreError;
use classifieds_core::location::{COUNTRY_NAME_TAKEN, LOCATION_NAME_MAX_LENGTH};
use classifieds_core::payload::{Mode, Payload, TextRule};
use classifieds_core::types::DbId;
use classifieds_db::models::location::Country;
use classifieds_db::repositories::CountryRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{IdPath, JsonBody, ListQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::query::PaginationParams;
use crate::state::AppState;

/// Read and validate the `name` field, including the uniqueness check.
async fn read_name(
    state: &AppState,
    payload: &mut Payload<'_>,
    exclude_id: Option<DbId>,
) -> AppResult<Option<String>> {
    let name = payload.text("name", TextRule::max(LOCATION_NAME_MAX_LENGTH));
    if let Some(name) = &name {
        if CountryRepo::name_taken(&state.pool, name, exclude_id).await? {
            payload.reject("name", COUNTRY_NAME_TAKEN);
        }
    }
    Ok(name)
}

/// POST /api/v1/countries
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<Country>)> {
    let mut payload = Payload::new(&body, Mode::Create);
    let name = read_name(&state, &mut payload, None).await?;
    let name = payload.finish_with(name)?;

    let country = CountryRepo::create(&state.pool, &name).await?;
    tracing::info!(country_id = country.id, user_id = staff.user_id, "Country created");
    Ok((StatusCode::CREATED, Json(country)))
}

/// GET /api/v1/countries
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    ListQuery(params): ListQuery<PaginationParams>,
) -> AppResult<Json<Vec<Country>>> {
    let countries = CountryRepo::list(&state.pool, params.limit, params.offset).await?;
    Ok(Json(countries))
}

/// GET /api/v1/countries/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Country>> {
    let country = CountryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Country",
            id,
        }))?;
    Ok(Json(country))
}

/// PATCH /api/v1/countries/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody,
) -> AppResult<Json<Country>> {
    if !CountryRepo::exists(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Country",
            id,
        }));
    }

    let mut payload = Payload::new(&body, Mode::Patch);
    let name = read_name(&state, &mut payload, Some(id)).await?;
    payload.finish()?;

    let country = CountryRepo::update(&state.pool, id, name.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Country",
            id,
        }))?;
    tracing::info!(country_id = id, user_id = staff.user_id, "Country updated");
    Ok(Json(country))
}

/// DELETE /api/v1/countries/{id}
///
/// Cascades to the country's cities and their streets.
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    if CountryRepo::delete(&state.pool, id).await? {
        tracing::info!(country_id = id, user_id = staff.user_id, "Country deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Country",
            id,
        }))
    }
}
