use sqlx::PgPool;
use tracing::instrument;

use crate::modules::orders::model::OrderStatus;
use crate::modules::orders::service::OrderService;
use crate::utils::errors::AppError;

use super::model::{
    AboutMeParams, CreateReviewDto, PaginatedReviewsResponse, Review, ReviewResponse,
};

const REVIEW_COLUMNS: &str =
    "id, order_id, reviewer_id, reviewed_id, rating, comment, created_at";

const REVIEW_META_COLUMNS: &str =
    "r.id, r.order_id, r.reviewer_id, r.reviewed_id, r.rating, r.comment, r.created_at, \
     rv.username AS reviewer_name, rd.username AS reviewed_name";

const REVIEW_JOINS: &str = "FROM reviews r \
     JOIN users rv ON rv.id = r.reviewer_id \
     JOIN users rd ON rd.id = r.reviewed_id";

pub struct ReviewService;

impl ReviewService {
    /// Review a completed order. Each party reviews the other at most once;
    /// the reviewed user is derived from the order, never from the payload.
    #[instrument(skip(db, dto), fields(order_id = dto.order_id))]
    pub async fn create(
        db: &PgPool,
        reviewer_id: i64,
        dto: CreateReviewDto,
    ) -> Result<Review, AppError> {
        let order = OrderService::get(db, dto.order_id).await?;

        if order.status != OrderStatus::Completed {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Only completed orders can be reviewed"
            )));
        }
        if order.buyer_id != reviewer_id && order.seller_id != reviewer_id {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Not a party to this order"
            )));
        }

        let already_reviewed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE order_id = $1 AND reviewer_id = $2)",
        )
        .bind(dto.order_id)
        .bind(reviewer_id)
        .fetch_one(db)
        .await?;
        if already_reviewed {
            return Err(AppError::conflict(anyhow::anyhow!(
                "You have already reviewed this order"
            )));
        }

        let reviewed_id = if order.buyer_id == reviewer_id {
            order.seller_id
        } else {
            order.buyer_id
        };

        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (order_id, reviewer_id, reviewed_id, rating, comment)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(dto.order_id)
        .bind(reviewer_id)
        .bind(reviewed_id)
        .bind(dto.rating)
        .bind(&dto.comment)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                AppError::conflict(anyhow::anyhow!("You have already reviewed this order"))
            } else {
                AppError::internal(e)
            }
        })?;

        tracing::info!(review_id = review.id, reviewer_id, order_no = %order.order_no, "Review created");
        Ok(review)
    }

    /// Both parties' reviews of one order, oldest first.
    #[instrument(skip(db))]
    pub async fn list_by_order(db: &PgPool, order_id: i64) -> Result<Vec<ReviewResponse>, AppError> {
        let reviews = sqlx::query_as::<_, ReviewResponse>(&format!(
            "SELECT {REVIEW_META_COLUMNS} {REVIEW_JOINS} \
             WHERE r.order_id = $1 ORDER BY r.created_at ASC, r.id ASC"
        ))
        .bind(order_id)
        .fetch_all(db)
        .await?;

        Ok(reviews)
    }

    /// Reviews left about the caller, newest first.
    #[instrument(skip(db, params))]
    pub async fn about_me(
        db: &PgPool,
        user_id: i64,
        params: AboutMeParams,
    ) -> Result<PaginatedReviewsResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reviews r WHERE r.reviewed_id = $1",
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;

        let reviews = sqlx::query_as::<_, ReviewResponse>(&format!(
            "SELECT {REVIEW_META_COLUMNS} {REVIEW_JOINS} \
             WHERE r.reviewed_id = $1 ORDER BY r.created_at DESC \
             LIMIT {limit} OFFSET {offset}"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(PaginatedReviewsResponse {
            data: reviews,
            meta: params.pagination.meta(total),
        })
    }
}
