//! Handlers for the `/categories` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use classifieds_core::advertisement::{CATALOG_NAME_MAX_LENGTH, CATEGORY_NAME_TAKEN};
use classifieds_core::error::CoreError;
use classifieds_core::payload::{Mode, Payload, TextRule};
use classifieds_core::types::DbId;
use classifieds_db::models::catalog::Category;
use classifieds_db::repositories::CategoryRepo;

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
        if CategoryRepo::name_taken(&state.pool, name, exclude_id).await? {
            payload.reject("name", CATEGORY_NAME_TAKEN);
        }
    }
    Ok(name)
}

/// POST /api/v1/categories
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<Category>)> {
    let mut payload = Payload::new(&body, Mode::Create);
    let name = read_name(&state, &mut payload, None).await?;
    let name = payload.finish_with(name)?;

    let category = CategoryRepo::create(&state.pool, &name).await?;
    tracing::info!(category_id = category.id, user_id = staff.user_id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/categories
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    ListQuery(params): ListQuery<PaginationParams>,
) -> AppResult<Json<Vec<Category>>> {
    let categories = CategoryRepo::list(&state.pool, params.limit, params.offset).await?;
    Ok(Json(categories))
}

/// GET /api/v1/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Category>> {
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;
    Ok(Json(category))
}

/// PATCH /api/v1/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody,
) -> AppResult<Json<Category>> {
    if !CategoryRepo::exists(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }));
    }

    let mut payload = Payload::new(&body, Mode::Patch);
    let name = read_name(&state, &mut payload, Some(id)).await?;
    payload.finish()?;

    let category = CategoryRepo::update(&state.pool, id, name.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;
    tracing::info!(category_id = id, user_id = staff.user_id, "Category updated");
    Ok(Json(category))
}

/// DELETE /api/v1/categories/{id}
///
/// Cascades to the category's characteristic declarations and advertisements.
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    if CategoryRepo::delete(&state.pool, id).await? {
        tracing::info!(category_id = id, user_id = staff.user_id, "Category deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))
    }
}
