use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::middleware::auth::CurrentUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::model::{FavoritesParams, PaginatedFavoritesResponse};
use super::service::FavoriteService;

/// Add a product to the caller's favorites
#[utoipa::path(
    post,
    path = "/api/favorites/{product_id}",
    params(("product_id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Favorite added"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Already favorited", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Favorites",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn add_favorite(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(product_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    FavoriteService::add(&state.db, ctx.user_id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a product from the caller's favorites
#[utoipa::path(
    delete,
    path = "/api/favorites/{product_id}",
    params(("product_id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Favorite removed"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Product was not favorited", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Favorites",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(product_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    FavoriteService::remove(&state.db, ctx.user_id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the caller's favorited products
#[utoipa::path(
    get,
    path = "/api/favorites",
    params(FavoritesParams),
    responses(
        (status = 200, description = "Paginated favorites", body = PaginatedFavoritesResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Favorites",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn list_favorites(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Query(params): Query<FavoritesParams>,
) -> Result<Json<PaginatedFavoritesResponse>, AppError> {
    let page = FavoriteService::list(&state.db, ctx.user_id, params.pagination).await?;
    Ok(Json(page))
}
