use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

/// A post-completion rating left by one order party about the other.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Review {
    pub id: i64,
    pub order_id: i64,
    pub reviewer_id: i64,
    pub reviewed_id: i64,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A review joined with both parties' usernames for display.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct ReviewResponse {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub review: Review,
    pub reviewer_name: String,
    pub reviewed_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReviewDto {
    pub order_id: i64,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 500, message = "comment must be at most 500 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct AboutMeParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedReviewsResponse {
    pub data: Vec<ReviewResponse>,
    pub meta: PaginationMeta,
}
