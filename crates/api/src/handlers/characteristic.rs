//! Handlers for the `/characteristics` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use classifieds_core::advertisement::{CATALOG_NAME_MAX_LENGTH, CHARACTERISTIC_NAME_TAKEN};
use classifieds_core::error::CoreError;
use classifieds_core::payload::{Mode, Payload, TextRule};
use classifieds_core::types::DbId;
use classifieds_db::models::catalog::Characteristic;
use classifieds_db::repositories::CharacteristicRepo;

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
    let name = payload.text("name", TextRule::max(CATALOG_NAME_MAX_LENGTH));
    if let Some(name) = &name {
        if CharacteristicRepo::name_taken(&state.pool, name, exclude_id).await? {
            payload.reject("name", CHARACTERISTIC_NAME_TAKEN);
        }
    }
    Ok(name)
}

/// POST /api/v1/characteristics
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<Characteristic>)> {
    let mut payload = Payload::new(&body, Mode::Create);
    let name = read_name(&state, &mut payload, None).await?;
    let name = payload.finish_with(name)?;

    let characteristic = CharacteristicRepo::create(&state.pool, &name).await?;
    tracing::info!(characteristic_id = characteristic.id, user_id = staff.user_id, "Characteristic created");
    Ok((StatusCode::CREATED, Json(characteristic)))
}

/// GET /api/v1/characteristics
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    ListQuery(params): ListQuery<PaginationParams>,
) -> AppResult<Json<Vec<Characteristic>>> {
    let characteristics = CharacteristicRepo::list(&state.pool, params.limit, params.offset).await?;
    Ok(Json(characteristics))
}

/// GET /api/v1/characteristics/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Characteristic>> {
    let characteristic = CharacteristicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Characteristic",
            id,
        }))?;
    Ok(Json(characteristic))
}

/// PATCH /api/v1/characteristics/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody,
) -> AppResult<Json<Characteristic>> {
    CharacteristicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Characteristic",
            id,
        }))?;

    let mut payload = Payload::new(&body, Mode::Patch);
    let name = read_name(&state, &mut payload, Some(id)).await?;
    payload.finish()?;

    let characteristic = CharacteristicRepo::update(&state.pool, id, name.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Characteristic",
            id,
        }))?;
    tracing::info!(characteristic_id = id, user_id = staff.user_id, "Characteristic updated");
    Ok(Json(characteristic))
}

/// DELETE /api/v1/characteristics/{id}
///
/// Cascades to every declaration and advertisement value using it.
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    if CharacteristicRepo::delete(&state.pool, id).await? {
        tracing::info!(characteristic_id = id, user_id = staff.user_id, "Characteristic deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Characteristic",
            id,
        }))
    }
}
