//! Handlers for the `/advertisement-characteristics` resource: single
//! characteristic values of advertisements the caller may manage.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use classifieds_core::access::{listing_scope, Action, Resource};
use classifieds_core::advertisement::{
    not_declared, ADVERTISEMENT_CHARACTERISTIC_TAKEN, CHARACTERISTIC_VALUE_MAX_LENGTH,
};
use classifieds_core::error::CoreError;
use classifieds_core::payload::{Mode, Payload, TextRule};
use classifieds_core::types::DbId;
use classifieds_core::validation::{does_not_exist, NON_FIELD_ERRORS};
use classifieds_db::models::advertisement::{
    AdvertisementCharacteristic, AdvertisementCharacteristicRow, CreateAdvertisementCharacteristic,
    UpdateAdvertisementCharacteristic,
};
use classifieds_db::repositories::{
    AdvertisementCharacteristicRepo, AdvertisementRepo, CategoryCharacteristicRepo,
    CharacteristicRepo,
};

use crate::error::{AppError, AppResult};
use crate::extract::{IdPath, JsonBody, ListQuery};
use crate::middleware::auth::AuthUser;
use crate::query::AdvertisementCharacteristicParams;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "AdvertisementCharacteristic",
        id,
    })
}

async fn find(state: &AppState, id: DbId) -> AppResult<AdvertisementCharacteristicRow> {
    AdvertisementCharacteristicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Read the `characteristic` reference and check it exists and is declared
/// for `category_id`.
async fn read_characteristic(
    state: &AppState,
    payload: &mut Payload<'_>,
    category_id: Option<DbId>,
) -> AppResult<Option<DbId>> {
    let Some(id) = payload.reference("characteristic") else {
        return Ok(None);
    };
    if CharacteristicRepo::find_by_id(&state.pool, id).await?.is_none() {
        payload.reject("characteristic", does_not_exist(id));
        return Ok(None);
    }
    if let Some(category_id) = category_id {
        let declared =
            CategoryCharacteristicRepo::declared_for(&state.pool, category_id, &[id]).await?;
        if !declared.contains(&id) {
            payload.reject("characteristic", not_declared(id));
            return Ok(None);
        }
    }
    Ok(Some(id))
}

/// POST /api/v1/advertisement-characteristics
///
/// The caller must be allowed to manage the target advertisement.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<AdvertisementCharacteristic>)> {
    let mut payload = Payload::new(&body, Mode::Create);

    let mut advertisement = None;
    if let Some(id) = payload.reference("advertisement") {
        match AdvertisementRepo::find_by_id(&state.pool, id).await? {
            Some(ad) => {
                user.authorize(Resource::Listing, Action::Update, Some(ad.author_id))?;
                advertisement = Some(ad);
            }
            None => payload.reject("advertisement", does_not_exist(id)),
        }
    }

    let category_id = advertisement.as_ref().map(|ad| ad.category_id);
    let characteristic_id = read_characteristic(&state, &mut payload, category_id).await?;
    let value = payload.text("value", TextRule::max(CHARACTERISTIC_VALUE_MAX_LENGTH));

    let advertisement_id = advertisement.map(|ad| ad.id);
    if let (Some(ad), Some(characteristic)) = (advertisement_id, characteristic_id) {
        if AdvertisementCharacteristicRepo::pair_exists(&state.pool, ad, characteristic, None)
            .await?
        {
            payload.reject(NON_FIELD_ERRORS, ADVERTISEMENT_CHARACTERISTIC_TAKEN);
        }
    }
    let ((advertisement_id, characteristic_id), value) =
        payload.finish_with(advertisement_id.zip(characteristic_id).zip(value))?;

    let input = CreateAdvertisementCharacteristic {
        advertisement_id,
        characteristic_id,
        value,
    };
    let row = AdvertisementCharacteristicRepo::create(&state.pool, &input).await?;
    tracing::info!(
        advertisement_characteristic_id = row.id,
        advertisement_id,
        characteristic_id,
        user_id = user.user_id,
        "Advertisement characteristic created"
    );
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/v1/advertisement-characteristics
///
/// Supports `?advertisement=<id>`; `?author=<id>` is honoured for staff only.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    ListQuery(params): ListQuery<AdvertisementCharacteristicParams>,
) -> AppResult<Json<Vec<AdvertisementCharacteristic>>> {
    user.authorize(Resource::Listing, Action::List, None)?;

    let rows = AdvertisementCharacteristicRepo::list(
        &state.pool,
        listing_scope(user.caller(), params.author),
        params.advertisement,
        params.limit,
        params.offset,
    )
    .await?;
    Ok(Json(rows.into_iter().map(AdvertisementCharacteristic::from).collect()))
}

/// GET /api/v1/advertisement-characteristics/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<AdvertisementCharacteristic>> {
    let row = find(&state, id).await?;
    user.authorize(Resource::Listing, Action::Retrieve, Some(row.author_id))?;
    Ok(Json(row.into()))
}

/// PATCH /api/v1/advertisement-characteristics/{id}
///
/// Only `characteristic` and `value` can change; the row stays attached to
/// its advertisement.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody,
) -> AppResult<Json<AdvertisementCharacteristic>> {
    let row = find(&state, id).await?;
    user.authorize(Resource::Listing, Action::Update, Some(row.author_id))?;

    let category_id = AdvertisementRepo::find_by_id(&state.pool, row.advertisement_id)
        .await?
        .map(|ad| ad.category_id);

    let mut payload = Payload::new(&body, Mode::Patch);
    let characteristic_id = read_characteristic(&state, &mut payload, category_id).await?;
    let value = payload.text("value", TextRule::max(CHARACTERISTIC_VALUE_MAX_LENGTH));
    if let Some(characteristic) = characteristic_id {
        if AdvertisementCharacteristicRepo::pair_exists(
            &state.pool,
            row.advertisement_id,
            characteristic,
            Some(id),
        )
        .await?
        {
            payload.reject(NON_FIELD_ERRORS, ADVERTISEMENT_CHARACTERISTIC_TAKEN);
        }
    }
    payload.finish()?;

    let input = UpdateAdvertisementCharacteristic {
        characteristic_id,
        value,
    };
    let row = AdvertisementCharacteristicRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        advertisement_characteristic_id = id,
        user_id = user.user_id,
        "Advertisement characteristic updated"
    );
    Ok(Json(row.into()))
}

/// DELETE /api/v1/advertisement-characteristics/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    let row = find(&state, id).await?;
    user.authorize(Resource::Listing, Action::Delete, Some(row.author_id))?;

    if AdvertisementCharacteristicRepo::delete(&state.pool, id).await? {
        tracing::info!(
            advertisement_characteristic_id = id,
            user_id = user.user_id,
            "Advertisement characteristic deleted"
        );
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
