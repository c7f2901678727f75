//! Order data models and DTOs.
//!
//! An order snapshots the product price at purchase time and keeps its
//! own `product_id` reference without a foreign key, so admin-deleted
//! products never orphan the transaction record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::modules::products::model::TransactionType;
use crate::utils::pagination::{PaginationMeta, PaginationParams};
use crate::utils::serde::deserialize_optional_i16;

/// Order lifecycle state. There is no payment step; orders are created
/// directly awaiting shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
#[serde(into = "i16", try_from = "i16")]
pub enum OrderStatus {
    AwaitingShipment = 1,
    AwaitingReceipt = 2,
    Completed = 3,
    Cancelled = 4,
}

impl From<OrderStatus> for i16 {
    fn from(status: OrderStatus) -> i16 {
        status as i16
    }
}

impl TryFrom<i16> for OrderStatus {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::AwaitingShipment),
            2 => Ok(Self::AwaitingReceipt),
            3 => Ok(Self::Completed),
            4 => Ok(Self::Cancelled),
            other => Err(format!("invalid order status: {}", other)),
        }
    }
}

/// A transaction between a buyer and a seller over one product.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Order {
    pub id: i64,
    pub order_no: String,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub total_price: Decimal,
    pub transaction_type: TransactionType,
    pub status: OrderStatus,
    pub remark: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// An order joined with party usernames and a product snapshot for
/// display. Product fields are `None` when the listing was deleted by
/// an admin after the sale.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct OrderResponse {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub order: Order,
    pub buyer_name: String,
    pub seller_name: String,
    pub product_title: Option<String>,
    pub product_image: Option<String>,
}

/// Order creation payload. The transaction type is the buyer's choice;
/// `Mail` requires a delivery address.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderDto {
    pub product_id: i64,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[validate(length(max = 500, message = "remark must be at most 500 characters"))]
    pub remark: Option<String>,
    #[validate(length(max = 255, message = "address must be at most 255 characters"))]
    pub address: Option<String>,
}

/// Which side of the caller's orders to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderView {
    #[default]
    Buyer,
    Seller,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct OrderFilterParams {
    /// `buyer` (default) lists purchases, `seller` lists sales.
    #[serde(rename = "type")]
    pub view: Option<OrderView>,
    #[serde(default, deserialize_with = "deserialize_optional_i16")]
    pub status: Option<i16>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedOrdersResponse {
    pub data: Vec<OrderResponse>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format_is_integer() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::AwaitingShipment).unwrap(),
            "1"
        );
        let parsed: OrderStatus = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, OrderStatus::Completed);
    }

    #[test]
    fn test_status_rejects_out_of_domain() {
        // there is no status 0: orders begin life awaiting shipment
        assert!(serde_json::from_str::<OrderStatus>("0").is_err());
        assert!(serde_json::from_str::<OrderStatus>("5").is_err());
    }

    #[test]
    fn test_view_defaults_to_buyer() {
        assert_eq!(OrderView::default(), OrderView::Buyer);
        let view: OrderView = serde_json::from_str(r#""seller""#).unwrap();
        assert_eq!(view, OrderView::Seller);
    }

    #[test]
    fn test_filter_params_use_type_as_wire_name() {
        let params: OrderFilterParams =
            serde_json::from_str(r#"{"type":"seller","status":"2"}"#).unwrap();
        assert_eq!(params.view, Some(OrderView::Seller));
        assert_eq!(params.status, Some(2));
    }

    #[test]
    fn test_create_dto_defaults_transaction_type() {
        let dto: CreateOrderDto = serde_json::from_str(r#"{"product_id": 9}"#).unwrap();
        assert_eq!(dto.transaction_type, TransactionType::Either);
        assert!(dto.address.is_none());
    }
}
