use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

use super::controller::{create_review, reviews_about_me, reviews_by_order};

pub fn init_reviews_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/order/{order_id}", get(reviews_by_order))
        .route("/about-me", get(reviews_about_me))
}
