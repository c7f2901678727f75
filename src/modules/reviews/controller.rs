use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::middleware::auth::CurrentUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{AboutMeParams, CreateReviewDto, PaginatedReviewsResponse, Review, ReviewResponse};
use super::service::ReviewService;

/// Review a completed order
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewDto,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Order is not completed", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not a party to this order", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 409, description = "Order already reviewed by the caller", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reviews",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_review(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    ValidatedJson(dto): ValidatedJson<CreateReviewDto>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let review = ReviewService::create(&state.db, ctx.user_id, dto).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Reviews attached to one order
#[utoipa::path(
    get,
    path = "/api/reviews/order/{order_id}",
    params(("order_id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Reviews for the order", body = [ReviewResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reviews",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn reviews_by_order(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
    Path(order_id): Path<i64>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let reviews = ReviewService::list_by_order(&state.db, order_id).await?;
    Ok(Json(reviews))
}

/// Reviews other users left about the caller
#[utoipa::path(
    get,
    path = "/api/reviews/about-me",
    params(AboutMeParams),
    responses(
        (status = 200, description = "Paginated review list", body = PaginatedReviewsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reviews",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn reviews_about_me(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Query(params): Query<AboutMeParams>,
) -> Result<Json<PaginatedReviewsResponse>, AppError> {
    let page = ReviewService::about_me(&state.db, ctx.user_id, params).await?;
    Ok(Json(page))
}
