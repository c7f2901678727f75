use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

use super::controller::{
    audit_product, batch_audit_products, create_category, dashboard_stats, delete_category,
    get_any_order, get_category_tree, get_user, list_all_categories, list_all_orders,
    list_all_products, list_pending_products, list_users, remove_product, statistics_overview,
    takedown_product, update_category, update_category_status, update_user_status,
};

pub fn init_admin_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/status", put(update_user_status))
        .route("/products/pending", get(list_pending_products))
        .route("/products", get(list_all_products))
        .route("/products/review", post(audit_product))
        .route("/products/review/batch", post(batch_audit_products))
        .route("/products/{id}/takedown", put(takedown_product))
        .route("/products/{id}", delete(remove_product))
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_any_order))
        .route("/categories/tree", get(get_category_tree))
        .route("/categories", get(list_all_categories).post(create_category))
        .route(
            "/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/categories/{id}/status", put(update_category_status))
        .route("/stats/dashboard", get(dashboard_stats))
        .route("/statistics/overview", get(statistics_overview))
}
