use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::middleware::auth::CurrentUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{CreateOrderDto, Order, OrderFilterParams, OrderResponse, PaginatedOrdersResponse};
use super::service::OrderService;

/// Place an order for an on-sale product
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderDto,
    responses(
        (status = 201, description = "Order created awaiting shipment", body = Order),
        (status = 400, description = "Product is not on sale", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Product bought by someone else first", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Orders",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    ValidatedJson(dto): ValidatedJson<CreateOrderDto>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = OrderService::create(&state.db, ctx.user_id, dto).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// The authenticated user's orders as buyer or seller
#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderFilterParams),
    responses(
        (status = 200, description = "Paginated order list", body = PaginatedOrdersResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Orders",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Query(params): Query<OrderFilterParams>,
) -> Result<Json<PaginatedOrdersResponse>, AppError> {
    let page = OrderService::list(&state.db, ctx.user_id, params).await?;
    Ok(Json(page))
}

/// Order detail, visible to the buyer, the seller and admins
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order detail", body = OrderResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not a party to this order", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Orders",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = OrderService::detail(&state.db, ctx.user_id, ctx.is_admin(), id).await?;
    Ok(Json(order))
}

/// Mark an order as shipped (seller only)
#[utoipa::path(
    put,
    path = "/api/orders/{id}/deliver",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order marked as shipped"),
        (status = 400, description = "Order not awaiting shipment", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not the seller", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 409, description = "Status changed concurrently", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Orders",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn deliver_order(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    OrderService::deliver(&state.db, ctx.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Confirm receipt and complete the order (buyer only)
#[utoipa::path(
    put,
    path = "/api/orders/{id}/confirm",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order completed"),
        (status = 400, description = "Order not awaiting receipt", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not the buyer", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 409, description = "Status changed concurrently", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Orders",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn confirm_order(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    OrderService::confirm(&state.db, ctx.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Cancel an order before shipment (either party)
#[utoipa::path(
    put,
    path = "/api/orders/{id}/cancel",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order cancelled, product back on sale"),
        (status = 400, description = "Order past the cancellable stage", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not a party to this order", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 409, description = "Status changed concurrently", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Orders",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn cancel_order(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    OrderService::cancel(&state.db, ctx.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
