//! Product data models and DTOs.
//!
//! # Core Types
//!
//! - [`Product`] - Listing entity
//! - [`ProductStatus`] - Lifecycle state, stored as SMALLINT
//! - [`TransactionType`] - How buyer and seller exchange the goods
//! - [`ProductWithMeta`] - Listing joined with owner and category names
//!
//! # Request DTOs
//!
//! - [`ProductDto`] - Publish/update payload (updates replace every
//!   content field)
//! - [`UpdateProductStatusDto`] - Owner delist/relist toggle
//! - [`ProductFilterParams`] / [`MyProductsParams`] - Listing filters

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::utils::pagination::{PaginationMeta, PaginationParams};
use crate::utils::serde::{
    deserialize_optional_decimal, deserialize_optional_i16, deserialize_optional_i64,
};

/// Listing lifecycle state.
///
/// `Sold` is only entered through order creation and only left again
/// through cancellation of the order that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
#[serde(into = "i16", try_from = "i16")]
pub enum ProductStatus {
    PendingReview = 0,
    OnSale = 1,
    Delisted = 2,
    Sold = 3,
    Rejected = 4,
}

impl From<ProductStatus> for i16 {
    fn from(status: ProductStatus) -> i16 {
        status as i16
    }
}

impl TryFrom<i16> for ProductStatus {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::PendingReview),
            1 => Ok(Self::OnSale),
            2 => Ok(Self::Delisted),
            3 => Ok(Self::Sold),
            4 => Ok(Self::Rejected),
            other => Err(format!("invalid product status: {}", other)),
        }
    }
}

/// How the goods change hands.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[repr(i16)]
#[serde(into = "i16", try_from = "i16")]
pub enum TransactionType {
    FaceToFace = 0,
    Mail = 1,
    #[default]
    Either = 2,
}

impl From<TransactionType> for i16 {
    fn from(tt: TransactionType) -> i16 {
        tt as i16
    }
}

impl TryFrom<i16> for TransactionType {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::FaceToFace),
            1 => Ok(Self::Mail),
            2 => Ok(Self::Either),
            other => Err(format!("invalid transaction type: {}", other)),
        }
    }
}

/// A listed product.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Product {
    pub id: i64,
    pub owner_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub images: Vec<String>,
    pub condition: Option<String>,
    pub transaction_type: TransactionType,
    pub view_count: i32,
    pub favorite_count: i32,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product joined with its owner's username and category name, the
/// shape list and detail endpoints return. `category_name` is `None`
/// when the category was deleted after the product was listed.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct ProductWithMeta {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub product: Product,
    pub owner_username: String,
    pub category_name: Option<String>,
}

/// Detail response: the joined product plus whether the caller has
/// favorited it (always `false` for anonymous viewers).
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductWithMeta,
    pub is_favorite: bool,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(ValidationError::new("price")
            .with_message("Price must be greater than zero".into()));
    }
    Ok(())
}

/// Publish/update payload. Updates are full replacements: every content
/// field is written, optional ones clearing to null when absent.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductDto {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    pub category_id: i64,
    #[validate(custom(function = validate_price))]
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    #[validate(length(min = 1, message = "at least one image is required"))]
    pub images: Vec<String>,
    pub condition: Option<String>,
    #[serde(default)]
    pub transaction_type: TransactionType,
}

/// Owner toggle between `OnSale` and `Delisted`. Raw integer so the
/// service can reject out-of-domain targets with its own message.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProductStatusDto {
    pub status: i16,
}

/// Sort orders for the public listing. Anything absent falls back to
/// newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    ViewCount,
    FavoriteCount,
}

impl ProductSort {
    /// ORDER BY fragment; fixed identifiers, never user input.
    pub fn order_clause(self) -> &'static str {
        match self {
            Self::PriceAsc => "p.price ASC",
            Self::PriceDesc => "p.price DESC",
            Self::ViewCount => "p.view_count DESC",
            Self::FavoriteCount => "p.favorite_count DESC",
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct ProductFilterParams {
    /// Matches against title and description.
    pub keyword: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub max_price: Option<Decimal>,
    /// Raw status filter; storefront clients send `1` (on sale).
    #[serde(default, deserialize_with = "deserialize_optional_i16")]
    pub status: Option<i16>,
    pub sort: Option<ProductSort>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct MyProductsParams {
    #[serde(default, deserialize_with = "deserialize_optional_i16")]
    pub status: Option<i16>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedProductsResponse {
    pub data: Vec<ProductWithMeta>,
    pub meta: PaginationMeta,
}
