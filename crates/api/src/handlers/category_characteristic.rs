//! Handlers for the `/category-characteristics` resource: which
//! characteristics an advertisement of a given category may carry.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use classifieds_core::advertisement::CATEGORY_CHARACTERISTIC_TAKEN;
use classifieds_core::error::CoreError;
use classifieds_core::payload::{Mode, Payload};
use classifieds_core::types::DbId;
use classifieds_core::validation::{does_not_exist, NON_FIELD_ERRORS};
use classifieds_db::models::catalog::{CategoryCharacteristic, UpdateCategoryCharacteristic};
use classifieds_db::repositories::{CategoryCharacteristicRepo, CategoryRepo, CharacteristicRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{IdPath, JsonBody, ListQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::query::CategoryFilter;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "CategoryCharacteristic",
        id,
    })
}

/// Read both references, confirming each row exists.
async fn read_pair(
    state: &AppState,
    payload: &mut Payload<'_>,
) -> AppResult<(Option<DbId>, Option<DbId>)> {
    let mut category_id = payload.reference("category");
    let mut characteristic_id = payload.reference("characteristic");

    if let Some(id) = category_id {
        if !CategoryRepo::exists(&state.pool, id).await? {
            payload.reject("category", does_not_exist(id));
            category_id = None;
        }
    }
    if let Some(id) = characteristic_id {
        if CharacteristicRepo::find_by_id(&state.pool, id).await?.is_none() {
            payload.reject("characteristic", does_not_exist(id));
            characteristic_id = None;
        }
    }
    Ok((category_id, characteristic_id))
}

/// POST /api/v1/category-characteristics
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<CategoryCharacteristic>)> {
    let mut payload = Payload::new(&body, Mode::Create);
    let (category_id, characteristic_id) = read_pair(&state, &mut payload).await?;
    if let (Some(category), Some(characteristic)) = (category_id, characteristic_id) {
        if CategoryCharacteristicRepo::pair_exists(&state.pool, category, characteristic, None)
            .await?
        {
            payload.reject(NON_FIELD_ERRORS, CATEGORY_CHARACTERISTIC_TAKEN);
        }
    }
    let (category_id, characteristic_id) =
        payload.finish_with(category_id.zip(characteristic_id))?;

    let row =
        CategoryCharacteristicRepo::create(&state.pool, category_id, characteristic_id).await?;
    tracing::info!(
        category_characteristic_id = row.id,
        category_id,
        characteristic_id,
        user_id = staff.user_id,
        "Characteristic declared for category"
    );
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/v1/category-characteristics
///
/// Supports `?category=<id>`.
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    ListQuery(params): ListQuery<CategoryFilter>,
) -> AppResult<Json<Vec<CategoryCharacteristic>>> {
    let rows =
        CategoryCharacteristicRepo::list(&state.pool, params.category, params.limit, params.offset)
            .await?;
    Ok(Json(rows.into_iter().map(CategoryCharacteristic::from).collect()))
}

/// GET /api/v1/category-characteristics/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<CategoryCharacteristic>> {
    let row = CategoryCharacteristicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(row.into()))
}

/// PATCH /api/v1/category-characteristics/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody,
) -> AppResult<Json<CategoryCharacteristic>> {
    let current = CategoryCharacteristicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let mut payload = Payload::new(&body, Mode::Patch);
    let (category_id, characteristic_id) = read_pair(&state, &mut payload).await?;
    if payload.errors().is_empty() && (category_id.is_some() || characteristic_id.is_some()) {
        let category = category_id.unwrap_or(current.category_id);
        let characteristic = characteristic_id.unwrap_or(current.characteristic_id);
        if CategoryCharacteristicRepo::pair_exists(&state.pool, category, characteristic, Some(id))
            .await?
        {
            payload.reject(NON_FIELD_ERRORS, CATEGORY_CHARACTERISTIC_TAKEN);
        }
    }
    payload.finish()?;

    let input = UpdateCategoryCharacteristic {
        category_id,
        characteristic_id,
    };
    let row = CategoryCharacteristicRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        category_characteristic_id = id,
        user_id = staff.user_id,
        "Declaration updated"
    );
    Ok(Json(row.into()))
}

/// DELETE /api/v1/category-characteristics/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    if CategoryCharacteristicRepo::delete(&state.pool, id).await? {
        tracing::info!(
            category_characteristic_id = id,
            user_id = staff.user_id,
            "Declaration deleted"
        );
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
