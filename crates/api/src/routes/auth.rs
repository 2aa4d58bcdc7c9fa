//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /token    -> issue_token (public)
/// ```
pub fn router() -> Router<AppState> {
    let issue = post(auth::issue_token).fallback(super::method_not_allowed);
    Router::new()
        .route("/auth/token", issue.clone())
        .route("/auth/token/", issue)
}
