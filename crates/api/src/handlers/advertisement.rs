//! Handlers for the `/advertisements` resource.
//!
//! An advertisement is always written together with its characteristic set.
//! Non-staff callers only ever see and manage their own advertisements.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use classifieds_core::access::{listing_scope, Action, Resource};
use classifieds_core::advertisement::{
    check_characteristic_set, read_characteristics, validate_price, CharacteristicValue,
    ADVERTISEMENT_NAME_MAX_LENGTH,
};
use classifieds_core::error::CoreError;
use classifieds_core::payload::{Mode, Payload, TextRule};
use classifieds_core::types::DbId;
use classifieds_core::validation::does_not_exist;
use classifieds_db::models::advertisement::{
    Advertisement, AdvertisementFilter, AdvertisementResponse, CreateAdvertisement,
    UpdateAdvertisement,
};
use classifieds_db::repositories::{
    AdvertisementRepo, CategoryCharacteristicRepo, CategoryRepo, CharacteristicRepo,
};
use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};
use crate::extract::{IdPath, JsonBody, ListQuery};
use crate::middleware::auth::AuthUser;
use crate::query::AdvertisementParams;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Advertisement",
        id,
    })
}

async fn find(state: &AppState, id: DbId) -> AppResult<Advertisement> {
    AdvertisementRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Load the characteristic rows of `ad` and build the response.
async fn respond(state: &AppState, ad: Advertisement) -> AppResult<AdvertisementResponse> {
    let rows = AdvertisementRepo::characteristics_for(&state.pool, &[ad.id]).await?;
    Ok(AdvertisementResponse::assemble(ad, &rows))
}

fn read_price(payload: &mut Payload<'_>) -> Option<Decimal> {
    let price = payload.decimal("price")?;
    let errors = validate_price(&price);
    if errors.is_empty() {
        return Some(price);
    }
    for message in errors {
        payload.reject("price", message);
    }
    None
}

async fn read_category(state: &AppState, payload: &mut Payload<'_>) -> AppResult<Option<DbId>> {
    let category_id = payload.reference("category");
    if let Some(id) = category_id {
        if !CategoryRepo::exists(&state.pool, id).await? {
            payload.reject("category", does_not_exist(id));
            return Ok(None);
        }
    }
    Ok(category_id)
}

/// Parse the `characteristics` array if present. Item errors are recorded on
/// the payload.
fn read_values(payload: &mut Payload<'_>) -> Option<Vec<CharacteristicValue>> {
    let items = payload.list("characteristics")?;
    match read_characteristics(items) {
        Ok(values) => Some(values),
        Err(errors) => {
            payload.absorb(errors);
            None
        }
    }
}

/// Check `values` against the catalog entries of `category_id`.
async fn check_values(
    state: &AppState,
    payload: &mut Payload<'_>,
    category_id: DbId,
    values: &[CharacteristicValue],
) -> AppResult<()> {
    let ids: Vec<DbId> = values.iter().map(|v| v.characteristic_id).collect();
    let existing = CharacteristicRepo::existing_ids(&state.pool, &ids).await?;
    let declared = CategoryCharacteristicRepo::declared_for(&state.pool, category_id, &ids).await?;
    payload.absorb(check_characteristic_set(values, &existing, &declared));
    Ok(())
}

/// POST /api/v1/advertisements
///
/// The author is always the caller and `viewed_count` always starts at 0.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<AdvertisementResponse>)> {
    user.authorize(Resource::Listing, Action::Create, None)?;

    let mut payload = Payload::new(&body, Mode::Create);
    let name = payload.text("name", TextRule::max(ADVERTISEMENT_NAME_MAX_LENGTH));
    let description = payload.nullable_text("description", TextRule::unbounded());
    let category_id = read_category(&state, &mut payload).await?;
    let price = read_price(&mut payload);
    let characteristics = read_values(&mut payload).unwrap_or_default();
    if let Some(category_id) = category_id {
        check_values(&state, &mut payload, category_id, &characteristics).await?;
    }
    let ((name, category_id), price) = payload.finish_with(name.zip(category_id).zip(price))?;

    let input = CreateAdvertisement {
        name,
        description: description.apply(None),
        author_id: user.user_id,
        category_id,
        price,
        characteristics,
    };
    let ad = AdvertisementRepo::create(&state.pool, &input).await?;
    tracing::info!(
        advertisement_id = ad.id,
        author_id = ad.author_id,
        category_id,
        characteristics = input.characteristics.len(),
        "Advertisement created"
    );
    Ok((StatusCode::CREATED, Json(respond(&state, ad).await?)))
}

/// GET /api/v1/advertisements
///
/// Supports `?author=<id>` and `?category=<id>`. The author filter is pinned
/// to the caller unless the caller is staff.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    ListQuery(params): ListQuery<AdvertisementParams>,
) -> AppResult<Json<Vec<AdvertisementResponse>>> {
    user.authorize(Resource::Listing, Action::List, None)?;

    let filter = AdvertisementFilter {
        author_id: listing_scope(user.caller(), params.author),
        category_id: params.category,
        limit: params.limit,
        offset: params.offset,
    };
    let ads = AdvertisementRepo::list(&state.pool, &filter).await?;
    let ids: Vec<DbId> = ads.iter().map(|ad| ad.id).collect();
    let rows = AdvertisementRepo::characteristics_for(&state.pool, &ids).await?;

    Ok(Json(
        ads.into_iter()
            .map(|ad| AdvertisementResponse::assemble(ad, &rows))
            .collect(),
    ))
}

/// GET /api/v1/advertisements/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<AdvertisementResponse>> {
    let ad = find(&state, id).await?;
    user.authorize(Resource::Listing, Action::Retrieve, Some(ad.author_id))?;
    Ok(Json(respond(&state, ad).await?))
}

/// PATCH /api/v1/advertisements/{id}
///
/// A supplied `characteristics` array replaces the whole set. Changing the
/// category re-checks the kept set against the new category.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody,
) -> AppResult<Json<AdvertisementResponse>> {
    let ad = find(&state, id).await?;
    user.authorize(Resource::Listing, Action::Update, Some(ad.author_id))?;

    let mut payload = Payload::new(&body, Mode::Patch);
    let name = payload.text("name", TextRule::max(ADVERTISEMENT_NAME_MAX_LENGTH));
    let description = payload.nullable_text("description", TextRule::unbounded());
    let category_id = read_category(&state, &mut payload).await?;
    let price = read_price(&mut payload);
    let characteristics = read_values(&mut payload);

    let effective_category = category_id.unwrap_or(ad.category_id);
    match &characteristics {
        Some(values) => check_values(&state, &mut payload, effective_category, values).await?,
        None if category_id.is_some_and(|c| c != ad.category_id) => {
            let kept: Vec<CharacteristicValue> =
                AdvertisementRepo::characteristics_for(&state.pool, &[id])
                    .await?
                    .into_iter()
                    .map(|row| CharacteristicValue {
                        characteristic_id: row.characteristic_id,
                        value: row.value,
                    })
                    .collect();
            check_values(&state, &mut payload, effective_category, &kept).await?;
        }
        None => {}
    }
    payload.finish()?;

    let input = UpdateAdvertisement {
        name,
        description,
        category_id,
        price,
        characteristics,
    };
    let ad = AdvertisementRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        advertisement_id = id,
        user_id = user.user_id,
        replaced_characteristics = input.characteristics.is_some(),
        "Advertisement updated"
    );
    Ok(Json(respond(&state, ad).await?))
}

/// DELETE /api/v1/advertisements/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    let ad = find(&state, id).await?;
    user.authorize(Resource::Listing, Action::Delete, Some(ad.author_id))?;

    if AdvertisementRepo::delete(&state.pool, id).await? {
        tracing::info!(advertisement_id = id, user_id = user.user_id, "Advertisement deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use classifieds_core::payload::Patch;
    use serde_json::{json, Map, Value};

    use super::*;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn negative_price_is_a_field_error() {
        let map = body(json!({"price": "-1"}));
        let mut payload = Payload::new(&map, Mode::Create);
        assert_eq!(read_price(&mut payload), None);
        let errors = payload.finish().unwrap_err();
        assert_eq!(
            errors.get("price").unwrap(),
            [classifieds_core::advertisement::PRICE_NEGATIVE]
        );
    }

    #[test]
    fn missing_characteristics_in_patch_mode_keeps_set() {
        let map = body(json!({"name": "Bike"}));
        let mut payload = Payload::new(&map, Mode::Patch);
        assert_eq!(read_values(&mut payload), None);
        assert!(payload.finish().is_ok());
    }

    #[test]
    fn malformed_characteristic_items_are_absorbed() {
        let map = body(json!({"characteristics": [{"characteristic": 1}]}));
        let mut payload = Payload::new(&map, Mode::Create);
        assert_eq!(read_values(&mut payload), None);
        let errors = payload.finish().unwrap_err();
        assert!(errors.contains("characteristics"));
    }

    #[test]
    fn blank_description_creates_without_one() {
        let map = body(json!({"description": ""}));
        let mut payload = Payload::new(&map, Mode::Create);
        let description = payload.nullable_text("description", TextRule::unbounded());
        assert_eq!(description, Patch::Clear);
        assert_eq!(description.apply(None), None);
    }
}
