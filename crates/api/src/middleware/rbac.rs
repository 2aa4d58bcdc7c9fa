//! Role-based access control extractors.
//!
//! Wraps [`AuthUser`] and rejects requests from non-staff accounts, so
//! staff-only routes enforce the rule at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use classifieds_core::error::{CoreError, PERMISSION_DENIED};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a staff account. Rejects with 401 when unauthenticated and 403
/// otherwise.
///
/// ```ignore
/// async fn staff_only(RequireStaff(user): RequireStaff) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_staff {
            return Err(AppError::Core(CoreError::Forbidden(
                PERMISSION_DENIED.into(),
            )));
        }
        Ok(RequireStaff(user))
    }
}
