use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::list_categories;

pub fn init_categories_router() -> Router<AppState> {
    Router::new().route("/", get(list_categories))
}
