use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::products::model::{ProductStatus, TransactionType};
use crate::modules::products::service::ProductService;
use crate::utils::errors::AppError;

use super::model::{
    CreateOrderDto, Order, OrderFilterParams, OrderResponse, OrderStatus, OrderView,
    PaginatedOrdersResponse,
};

const ORDER_COLUMNS: &str =
    "id, order_no, buyer_id, seller_id, product_id, quantity, total_price, transaction_type, \
     status, remark, address, created_at, updated_at, completed_at";

/// Joined projection for order responses. The product join is LEFT so
/// orders survive admin-deleted listings; `images[1]` is NULL for both a
/// missing product and an empty image list.
pub(crate) const ORDER_META_COLUMNS: &str =
    "o.id, o.order_no, o.buyer_id, o.seller_id, o.product_id, o.quantity, o.total_price, \
     o.transaction_type, o.status, o.remark, o.address, o.created_at, o.updated_at, \
     o.completed_at, b.username AS buyer_name, s.username AS seller_name, \
     p.title AS product_title, p.images[1] AS product_image";

pub(crate) const ORDER_JOINS: &str = "FROM orders o \
     JOIN users b ON b.id = o.buyer_id \
     JOIN users s ON s.id = o.seller_id \
     LEFT JOIN products p ON p.id = o.product_id";

fn generate_order_no() -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("ORD{}{}", Utc::now().timestamp_millis(), suffix)
}

pub struct OrderService;

impl OrderService {
    /// Create an order for an on-sale product.
    ///
    /// The insert and the product's `on-sale -> sold` flip are one
    /// transaction, and the flip is guarded by the expected prior status:
    /// when two buyers race, exactly one guarded update applies and the
    /// loser gets `Conflict`.
    #[instrument(skip(db, dto), fields(product_id = dto.product_id))]
    pub async fn create(db: &PgPool, buyer_id: i64, dto: CreateOrderDto) -> Result<Order, AppError> {
        let product = ProductService::get(db, dto.product_id).await?;

        if product.status != ProductStatus::OnSale {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Product is not on sale"
            )));
        }
        if product.owner_id == buyer_id {
            return Err(AppError::validation(anyhow::anyhow!(
                "You cannot buy your own product"
            )));
        }
        if dto.transaction_type == TransactionType::Mail
            && dto.address.as_deref().map(str::trim).unwrap_or("").is_empty()
        {
            return Err(AppError::validation(anyhow::anyhow!(
                "Mail orders require a delivery address"
            )));
        }

        let mut tx = db.begin().await?;

        // The pre-check above is only advisory; this guarded write is the
        // actual gate against concurrent purchases.
        let flipped = sqlx::query(
            "UPDATE products SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(product.id)
        .bind(ProductStatus::Sold)
        .bind(ProductStatus::OnSale)
        .execute(&mut *tx)
        .await?;
        if flipped.rows_affected() == 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Someone else bought this product first"
            )));
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders
                (order_no, buyer_id, seller_id, product_id, quantity, total_price,
                 transaction_type, status, remark, address)
             VALUES ($1, $2, $3, $4, 1, $5, $6, $7, $8, $9)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(generate_order_no())
        .bind(buyer_id)
        .bind(product.owner_id)
        .bind(product.id)
        .bind(product.price)
        .bind(dto.transaction_type)
        .bind(OrderStatus::AwaitingShipment)
        .bind(&dto.remark)
        .bind(&dto.address)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        crate::metrics::track_order_created();
        tracing::info!(order_id = order.id, order_no = %order.order_no, buyer_id, "Order created");
        Ok(order)
    }

    /// Seller marks the goods as shipped (or the face-to-face handoff as
    /// agreed).
    #[instrument(skip(db))]
    pub async fn deliver(db: &PgPool, caller_id: i64, order_id: i64) -> Result<(), AppError> {
        let order = Self::get(db, order_id).await?;
        if order.seller_id != caller_id {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Only the seller can mark an order delivered"
            )));
        }
        if order.status != OrderStatus::AwaitingShipment {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Order is not awaiting shipment"
            )));
        }

        let result = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(order_id)
        .bind(OrderStatus::AwaitingReceipt)
        .bind(OrderStatus::AwaitingShipment)
        .execute(db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Order status changed concurrently"
            )));
        }

        tracing::info!(order_id, caller_id, "Order delivered");
        Ok(())
    }

    /// Buyer confirms receipt, completing the order.
    #[instrument(skip(db))]
    pub async fn confirm(db: &PgPool, caller_id: i64, order_id: i64) -> Result<(), AppError> {
        let order = Self::get(db, order_id).await?;
        if order.buyer_id != caller_id {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Only the buyer can confirm receipt"
            )));
        }
        if order.status != OrderStatus::AwaitingReceipt {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Order is not awaiting receipt"
            )));
        }

        let result = sqlx::query(
            "UPDATE orders SET status = $2, completed_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND status = $3",
        )
        .bind(order_id)
        .bind(OrderStatus::Completed)
        .bind(OrderStatus::AwaitingReceipt)
        .execute(db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Order status changed concurrently"
            )));
        }

        crate::metrics::track_order_completed();
        tracing::info!(order_id, caller_id, "Order completed");
        Ok(())
    }

    /// Either party cancels before shipment. The order flip and the
    /// product's `sold -> on-sale` revert are one transaction. The revert
    /// tolerates zero rows: the product may have been admin-deleted, and
    /// the guarded order update is the conflict gate.
    #[instrument(skip(db))]
    pub async fn cancel(db: &PgPool, caller_id: i64, order_id: i64) -> Result<(), AppError> {
        let order = Self::get(db, order_id).await?;
        if order.buyer_id != caller_id && order.seller_id != caller_id {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Not a party to this order"
            )));
        }
        if order.status != OrderStatus::AwaitingShipment {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Only orders awaiting shipment can be cancelled"
            )));
        }

        let mut tx = db.begin().await?;

        let cancelled = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(order_id)
        .bind(OrderStatus::Cancelled)
        .bind(OrderStatus::AwaitingShipment)
        .execute(&mut *tx)
        .await?;
        if cancelled.rows_affected() == 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Order status changed concurrently"
            )));
        }

        sqlx::query(
            "UPDATE products SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(order.product_id)
        .bind(ProductStatus::OnSale)
        .bind(ProductStatus::Sold)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        crate::metrics::track_order_cancelled();
        tracing::info!(order_id, caller_id, "Order cancelled");
        Ok(())
    }

    /// Joined order detail, visible to the two parties and admins only.
    #[instrument(skip(db))]
    pub async fn detail(
        db: &PgPool,
        caller_id: i64,
        caller_is_admin: bool,
        order_id: i64,
    ) -> Result<OrderResponse, AppError> {
        let order = sqlx::query_as::<_, OrderResponse>(&format!(
            "SELECT {ORDER_META_COLUMNS} {ORDER_JOINS} WHERE o.id = $1"
        ))
        .bind(order_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Order not found")))?;

        if !caller_is_admin
            && order.order.buyer_id != caller_id
            && order.order.seller_id != caller_id
        {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Not a party to this order"
            )));
        }

        Ok(order)
    }

    /// The caller's orders on one side of the table, newest first.
    #[instrument(skip(db, params))]
    pub async fn list(
        db: &PgPool,
        user_id: i64,
        params: OrderFilterParams,
    ) -> Result<PaginatedOrdersResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let side_column = match params.view.unwrap_or_default() {
            OrderView::Buyer => "o.buyer_id",
            OrderView::Seller => "o.seller_id",
        };
        let status_clause = if params.status.is_some() {
            " AND o.status = $2"
        } else {
            ""
        };

        let count_query =
            format!("SELECT COUNT(*) FROM orders o WHERE {side_column} = $1{status_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query).bind(user_id);
        if let Some(status) = params.status {
            count_sql = count_sql.bind(status);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {ORDER_META_COLUMNS} {ORDER_JOINS} WHERE {side_column} = $1{status_clause} \
             ORDER BY o.created_at DESC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, OrderResponse>(&data_query).bind(user_id);
        if let Some(status) = params.status {
            data_sql = data_sql.bind(status);
        }
        let orders = data_sql.fetch_all(db).await?;

        Ok(PaginatedOrdersResponse {
            data: orders,
            meta: params.pagination.meta(total),
        })
    }

    pub(crate) async fn get(db: &PgPool, order_id: i64) -> Result<Order, AppError> {
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(order_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Order not found")))
    }
}
