use axum::Router;
use axum::routing::{get, put};

use crate::state::AppState;

use super::controller::{
    cancel_order, confirm_order, create_order, deliver_order, get_order, list_orders,
};

pub fn init_orders_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{id}", get(get_order))
        .route("/{id}/deliver", put(deliver_order))
        .route("/{id}/confirm", put(confirm_order))
        .route("/{id}/cancel", put(cancel_order))
}
