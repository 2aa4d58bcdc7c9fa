//! Startup tasks run before the server accepts connections.

use classifieds_core::location::Placement;
use classifieds_core::password_policy::check_strength;
use classifieds_core::user::DEFAULT_USER_TYPE;
use classifieds_db::models::user::CreateUser;
use classifieds_db::repositories::UserRepo;
use classifieds_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::StaffAccount;
use crate::error::{AppError, AppResult};

/// Create the configured staff account unless a user with that username
/// already exists. An existing account is left untouched.
pub async fn ensure_staff_account(pool: &DbPool, account: &StaffAccount) -> AppResult<()> {
    if let Some(existing) = UserRepo::find_by_username(pool, &account.username).await? {
        if !existing.is_staff {
            tracing::warn!(
                user_id = existing.id,
                username = %existing.username,
                "Bootstrap username belongs to a non-staff account; leaving it unchanged"
            );
        }
        return Ok(());
    }

    let weaknesses = check_strength(&account.password);
    if !weaknesses.is_empty() {
        tracing::warn!(?weaknesses, "Bootstrap staff password fails the strength rules");
    }

    let password_hash = hash_password(&account.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let input = CreateUser {
        username: account.username.clone(),
        email: account.email.clone(),
        phone_number: account.phone_number.clone(),
        password_hash,
        user_type: DEFAULT_USER_TYPE.to_string(),
        is_staff: true,
        placement: Placement::default(),
    };
    let user = UserRepo::create(pool, &input).await?;
    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap staff account created");
    Ok(())
}
