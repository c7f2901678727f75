use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::model::Category;
use super::service::CategoryService;

/// List enabled categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Enabled categories in display order", body = [Category]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Categories"
)]
#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    let categories = CategoryService::list_enabled(&state.db).await?;
    Ok(Json(categories))
}
