//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use classifieds_core::access::{self, Action, Caller, Resource};
use classifieds_core::error::{CoreError, INACTIVE_USER, INVALID_TOKEN, NOT_AUTHENTICATED};
use classifieds_core::types::DbId;
use classifieds_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// The token only carries the user id; the account is re-read on every
/// request so a deactivated user is refused even with an unexpired token.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub username: String,
    pub is_staff: bool,
}

impl AuthUser {
    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.user_id,
            is_staff: self.is_staff,
        }
    }

    /// Check `action` on a `resource` row owned by `owner` against the access
    /// policy, rejecting with 403 on denial.
    pub fn authorize(
        &self,
        resource: Resource,
        action: Action,
        owner: Option<DbId>,
    ) -> AppResult<()> {
        access::authorize(resource, action, Some(self.caller()), owner)
            .map_err(|denial| AppError::Core(denial.into()))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| unauthorized(NOT_AUTHENTICATED))?;

        let claims =
            validate_token(token, &state.config.jwt).map_err(|_| unauthorized(INVALID_TOKEN))?;

        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| unauthorized(INACTIVE_USER))?;

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
            is_staff: user.is_staff,
        })
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}
