use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::modules::products::model::ProductDetailResponse;
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct FavoritesParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Favorites listing: each entry carries `is_favorite: true` so clients
/// can reuse their product card rendering unchanged.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedFavoritesResponse {
    pub data: Vec<ProductDetailResponse>,
    pub meta: PaginationMeta,
}
