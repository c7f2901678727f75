//! Admin DTOs: moderation requests, management filters, and the two
//! statistics response shapes.
//!
//! The admin surface reuses the entity types of the feature modules
//! ([`User`](crate::modules::users::model::User),
//! [`ProductWithMeta`](crate::modules::products::model::ProductWithMeta),
//! [`OrderResponse`](crate::modules::orders::model::OrderResponse),
//! [`Category`](crate::modules::categories::model::Category)); only the
//! request and aggregate shapes live here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::modules::users::model::User;
use crate::utils::pagination::{PaginationMeta, PaginationParams};
use crate::utils::serde::{deserialize_optional_i16, deserialize_optional_i64};

/// Filters for the admin user list. Keyword matches username, email,
/// and phone.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct AdminUserFilterParams {
    pub keyword: Option<String>,
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i16")]
    pub status: Option<i16>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

/// Enable or disable an account. Raw integer so the service can reject
/// out-of-domain targets with its own message.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserStatusDto {
    pub status: i16,
}

/// Review queue filters. The queue is always pending-review products,
/// so there is no status field.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct PendingProductParams {
    /// Matches against title and description.
    pub keyword: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub category_id: Option<i64>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Filters for the unrestricted admin product list.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct AdminProductFilterParams {
    /// Matches against title and description.
    pub keyword: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i16")]
    pub status: Option<i16>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// One moderation decision: approve (status 1) or reject (status 4) a
/// pending product. The reason is logged, not stored.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AuditProductDto {
    pub product_id: i64,
    pub status: i16,
    #[validate(length(max = 500, message = "reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct AdminOrderFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_i16")]
    pub status: Option<i16>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

fn default_root_parent() -> i64 {
    0
}

fn default_enabled() -> i16 {
    1
}

/// Create/update payload for a category. Absent fields take the
/// defaults of a fresh enabled root category.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryDto {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub name: String,
    #[serde(default = "default_root_parent")]
    pub parent_id: i64,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_enabled")]
    pub status: i16,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryStatusDto {
    pub status: i16,
}

/// The headline numbers on the admin dashboard. `total_amount` sums
/// completed orders only.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStatsResponse {
    pub user_count: i64,
    pub product_count: i64,
    pub order_count: i64,
    pub total_amount: Decimal,
    pub pending_review_count: i64,
}

/// Totals plus today / last-7-days / last-30-days windows for every
/// entity, and the current on-sale count. Amounts follow the dashboard
/// rule: completed orders only, windowed by creation time.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticsOverviewResponse {
    pub total_users: i64,
    pub today_users: i64,
    pub week_users: i64,
    pub month_users: i64,

    pub total_products: i64,
    pub today_products: i64,
    pub week_products: i64,
    pub month_products: i64,
    pub on_sale_products: i64,

    pub total_orders: i64,
    pub today_orders: i64,
    pub week_orders: i64,
    pub month_orders: i64,
    pub total_amount: Decimal,
    pub today_amount: Decimal,
    pub week_amount: Decimal,
    pub month_amount: Decimal,
}
