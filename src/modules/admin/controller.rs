use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::categories::model::{Category, CategoryTreeNode};
use crate::modules::orders::model::{OrderResponse, PaginatedOrdersResponse};
use crate::modules::products::model::PaginatedProductsResponse;
use crate::modules::users::model::User;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    AdminOrderFilterParams, AdminProductFilterParams, AdminUserFilterParams, AuditProductDto,
    CategoryDto, DashboardStatsResponse, PaginatedUsersResponse, PendingProductParams,
    StatisticsOverviewResponse, UpdateCategoryStatusDto, UpdateUserStatusDto,
};
use super::service::AdminService;

/// Search and page through all accounts
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(AdminUserFilterParams),
    responses(
        (status = 200, description = "Paginated user list", body = PaginatedUsersResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<AdminUserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let page = AdminService::list_users(&state.db, params).await?;
    Ok(Json(page))
}

/// A single account's profile
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User profile", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user = AdminService::get_user(&state.db, id).await?;
    Ok(Json(user))
}

/// Enable or disable an account
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/status",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserStatusDto,
    responses(
        (status = 204, description = "Status updated"),
        (status = 400, description = "Admin accounts cannot be disabled", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Unknown status value", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_user_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateUserStatusDto>,
) -> Result<StatusCode, AppError> {
    AdminService::update_user_status(&state.db, id, dto.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The review queue of freshly published products
#[utoipa::path(
    get,
    path = "/api/admin/products/pending",
    params(PendingProductParams),
    responses(
        (status = 200, description = "Paginated pending products", body = PaginatedProductsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn list_pending_products(
    State(state): State<AppState>,
    Query(params): Query<PendingProductParams>,
) -> Result<Json<PaginatedProductsResponse>, AppError> {
    let page = AdminService::pending_products(&state.db, params).await?;
    Ok(Json(page))
}

/// All products in any state
#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(AdminProductFilterParams),
    responses(
        (status = 200, description = "Paginated product list", body = PaginatedProductsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn list_all_products(
    State(state): State<AppState>,
    Query(params): Query<AdminProductFilterParams>,
) -> Result<Json<PaginatedProductsResponse>, AppError> {
    let page = AdminService::list_products(&state.db, params).await?;
    Ok(Json(page))
}

/// Approve or reject a pending product
#[utoipa::path(
    post,
    path = "/api/admin/products/review",
    request_body = AuditProductDto,
    responses(
        (status = 204, description = "Decision applied"),
        (status = 400, description = "Product is not awaiting review", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Product reviewed concurrently", body = ErrorResponse),
        (status = 422, description = "Invalid audit status", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn audit_product(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<AuditProductDto>,
) -> Result<StatusCode, AppError> {
    AdminService::audit_product(&state.db, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply several audit decisions in one call, stopping at the first failure
#[utoipa::path(
    post,
    path = "/api/admin/products/review/batch",
    request_body = Vec<AuditProductDto>,
    responses(
        (status = 204, description = "All decisions applied"),
        (status = 400, description = "A product was not awaiting review", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "A product was not found", body = ErrorResponse),
        (status = 422, description = "Invalid audit status", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, items))]
pub async fn batch_audit_products(
    State(state): State<AppState>,
    Json(items): Json<Vec<AuditProductDto>>,
) -> Result<StatusCode, AppError> {
    AdminService::batch_audit(&state.db, items).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Force-delist a product that violates the rules
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}/takedown",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product delisted"),
        (status = 400, description = "Sold products cannot be taken down", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Product sold concurrently", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn takedown_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    AdminService::takedown_product(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a product in any state
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn remove_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    AdminService::delete_product(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Every order in the system
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(AdminOrderFilterParams),
    responses(
        (status = 200, description = "Paginated order list", body = PaginatedOrdersResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn list_all_orders(
    State(state): State<AppState>,
    Query(params): Query<AdminOrderFilterParams>,
) -> Result<Json<PaginatedOrdersResponse>, AppError> {
    let page = AdminService::list_orders(&state.db, params).await?;
    Ok(Json(page))
}

/// Any order's detail
#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order detail", body = OrderResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_any_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, AppError> {
    // Admin access bypasses the party check; the caller id is unused.
    let order = crate::modules::orders::service::OrderService::detail(&state.db, 0, true, id).await?;
    Ok(Json(order))
}

/// All categories as a tree, disabled ones included
#[utoipa::path(
    get,
    path = "/api/admin/categories/tree",
    responses(
        (status = 200, description = "Category tree", body = Vec<CategoryTreeNode>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_category_tree(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryTreeNode>>, AppError> {
    let tree = AdminService::category_tree(&state.db).await?;
    Ok(Json(tree))
}

/// Flat list of all categories, disabled ones included
#[utoipa::path(
    get,
    path = "/api/admin/categories",
    responses(
        (status = 200, description = "Category list", body = Vec<Category>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_all_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = AdminService::list_categories(&state.db).await?;
    Ok(Json(categories))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CategoryDto,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CategoryDto>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = AdminService::create_category(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Replace a category's fields
#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    request_body = CategoryDto,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<CategoryDto>,
) -> Result<Json<Category>, AppError> {
    let category = AdminService::update_category(&state.db, id, dto).await?;
    Ok(Json(category))
}

/// Delete a category with no children and no products
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category still referenced", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    AdminService::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Enable or disable a category
#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}/status",
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategoryStatusDto,
    responses(
        (status = 204, description = "Status updated"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 422, description = "Unknown status value", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_category_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateCategoryStatusDto>,
) -> Result<StatusCode, AppError> {
    AdminService::update_category_status(&state.db, id, dto.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Headline counts for the dashboard
#[utoipa::path(
    get,
    path = "/api/admin/stats/dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStatsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStatsResponse>, AppError> {
    let stats = AdminService::dashboard(&state.db).await?;
    Ok(Json(stats))
}

/// Totals plus daily, weekly and monthly windows
#[utoipa::path(
    get,
    path = "/api/admin/statistics/overview",
    responses(
        (status = 200, description = "Statistics overview", body = StatisticsOverviewResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn statistics_overview(
    State(state): State<AppState>,
) -> Result<Json<StatisticsOverviewResponse>, AppError> {
    let overview = AdminService::overview(&state.db).await?;
    Ok(Json(overview))
}
