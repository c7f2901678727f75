use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::auth::resolve_identity;
use crate::middleware::role::require_admin;
use crate::modules::admin::router::init_admin_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::categories::router::init_categories_router;
use crate::modules::favorites::router::init_favorites_router;
use crate::modules::files::router::init_files_router;
use crate::modules::orders::router::init_orders_router;
use crate::modules::products::router::init_products_router;
use crate::modules::reviews::router::init_reviews_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;
use crate::utils::file_storage::FileStorage as _;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

pub fn init_router(state: AppState) -> Router {
    // Sits above the storage cap so oversized uploads reach the storage
    // check and its structured error instead of a bare 413.
    let body_limit = DefaultBodyLimit::max(state.storage.max_file_size() + 1024);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest("/users", init_users_router())
                .nest("/products", init_products_router())
                .nest("/orders", init_orders_router())
                .nest("/favorites", init_favorites_router())
                .nest("/reviews", init_reviews_router())
                .nest("/categories", init_categories_router())
                .nest("/files", init_files_router())
                .nest(
                    "/admin",
                    init_admin_router().route_layer(middleware::from_fn(require_admin)),
                )
                // Identity resolves once here; everything below reads extensions.
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    resolve_identity,
                ))
                .layer(body_limit),
        )
        .nest_service("/uploads", ServeDir::new(state.storage.base_dir()))
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
