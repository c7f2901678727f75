use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    delete_product, get_product, list_products, my_products, publish_product, update_product,
    update_product_status,
};

pub fn init_products_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(publish_product))
        .route("/my", get(my_products))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/status", put(update_product_status))
}
