use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::middleware::auth::{CurrentUser, MaybeUser};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    MyProductsParams, PaginatedProductsResponse, Product, ProductDetailResponse, ProductDto,
    ProductFilterParams, UpdateProductStatusDto,
};
use super::service::ProductService;

/// Browse products with filters and sorting
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductFilterParams),
    responses(
        (status = 200, description = "Paginated product list", body = PaginatedProductsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Products"
)]
#[instrument(skip(state, filters))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(filters): Query<ProductFilterParams>,
) -> Result<Json<PaginatedProductsResponse>, AppError> {
    let page = ProductService::list(&state.db, filters).await?;
    Ok(Json(page))
}

/// The authenticated user's own listings
#[utoipa::path(
    get,
    path = "/api/products/my",
    params(MyProductsParams),
    responses(
        (status = 200, description = "Paginated product list", body = PaginatedProductsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn my_products(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Query(params): Query<MyProductsParams>,
) -> Result<Json<PaginatedProductsResponse>, AppError> {
    let page = ProductService::list_mine(&state.db, ctx.user_id, params).await?;
    Ok(Json(page))
}

/// Product detail; increments the view counter
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product detail", body = ProductDetailResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Products"
)]
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<ProductDetailResponse>, AppError> {
    let detail = ProductService::detail(&state.db, id, viewer.map(|c| c.user_id)).await?;
    Ok(Json(detail))
}

/// Publish a new product (starts in pending review)
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductDto,
    responses(
        (status = 201, description = "Product created awaiting review", body = Product),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn publish_product(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    ValidatedJson(dto): ValidatedJson<ProductDto>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = ProductService::publish(&state.db, ctx.user_id, dto).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product's content fields (owner only, full replace)
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    request_body = ProductDto,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Product already sold", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<ProductDto>,
) -> Result<Json<Product>, AppError> {
    let product = ProductService::update(&state.db, ctx.user_id, id, dto).await?;
    Ok(Json(product))
}

/// Delist or relist a product (owner only)
#[utoipa::path(
    put,
    path = "/api/products/{id}/status",
    params(("id" = i64, Path, description = "Product id")),
    request_body = UpdateProductStatusDto,
    responses(
        (status = 204, description = "Status updated"),
        (status = 400, description = "Transition not allowed from current status", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Status changed concurrently", body = ErrorResponse),
        (status = 422, description = "Target status out of domain", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_product_status(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateProductStatusDto>,
) -> Result<StatusCode, AppError> {
    ProductService::update_status(&state.db, ctx.user_id, id, dto.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a product (owner only, not after it sold)
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Product already sold", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    ProductService::delete(&state.db, ctx.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
