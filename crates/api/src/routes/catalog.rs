//! Route definitions for categories, characteristics and their associations.

use axum::routing::get;
use axum::Router;

use crate::handlers::{category, category_characteristic, characteristic};
use crate::state::AppState;

use super::resource;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(resource(
            "/categories",
            get(category::list).post(category::create),
            get(category::get_by_id)
                .patch(category::update)
                .delete(category::delete),
        ))
        .merge(resource(
            "/characteristics",
            get(characteristic::list).post(characteristic::create),
            get(characteristic::get_by_id)
                .patch(characteristic::update)
                .delete(characteristic::delete),
        ))
        .merge(resource(
            "/category-characteristics",
            get(category_characteristic::list).post(category_characteristic::create),
            get(category_characteristic::get_by_id)
                .patch(category_characteristic::update)
                .delete(category_characteristic::delete),
        ))
}
