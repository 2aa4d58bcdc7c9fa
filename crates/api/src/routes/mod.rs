pub mod advertisement;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod location;
pub mod user;

use axum::http::Method;
use axum::routing::MethodRouter;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/token                                  issue bearer token (public)
///
/// /countries, /cities, /streets                location hierarchy
/// /categories, /characteristics                catalog
/// /category-characteristics                    characteristics allowed per category
/// /advertisements                              listings with their characteristics
/// /advertisement-characteristics               single characteristic values
/// /users, /users/me                            accounts
/// ```
///
/// Every collection answers `GET`/`POST` on `/<name>` and `GET`/`PATCH`/
/// `DELETE` on `/<name>/{id}`, with or without a trailing slash.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(location::router())
        .merge(catalog::router())
        .merge(advertisement::router())
        .merge(user::router())
}

/// Register a collection route and an item route under `path`, each with and
/// without a trailing slash.
fn resource(
    path: &str,
    collection: MethodRouter<AppState>,
    item: MethodRouter<AppState>,
) -> Router<AppState> {
    let collection = collection.fallback(method_not_allowed);
    let item = item.fallback(method_not_allowed);
    Router::new()
        .route(path, collection.clone())
        .route(&format!("{path}/"), collection)
        .route(&format!("{path}/{{id}}"), item.clone())
        .route(&format!("{path}/{{id}}/"), item)
}

/// Fallback for a known path requested with an unsupported method.
async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method)
}
