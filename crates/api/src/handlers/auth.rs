//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::Json;
use classifieds_core::error::CoreError;
use classifieds_core::payload::{Mode, Payload};
use classifieds_db::models::user::UserResponse;
use classifieds_db::repositories::UserRepo;
use serde::Serialize;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";
const ACCOUNT_DEACTIVATED: &str = "User account is disabled.";

/// Successful response of `POST /auth/token`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()))
}

/// POST /api/v1/auth/token
///
/// Exchange `username` + `password` for a bearer token.
pub async fn issue_token(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<TokenResponse>> {
    let mut payload = Payload::new(&body, Mode::Create);
    let username = payload.secret("username");
    let password = payload.secret("password");
    let (username, password) = payload.finish_with(username.zip(password))?;

    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_valid = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Rejected login with wrong password");
        return Err(invalid_credentials());
    }

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(ACCOUNT_DEACTIVATED.into())));
    }

    UserRepo::record_login(&state.pool, user.id).await?;

    let access_token = generate_access_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    tracing::info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.expires_in_secs(),
        user: user.into(),
    }))
}
