use sqlx::PgPool;
use tracing::instrument;

use crate::modules::products::model::{ProductDetailResponse, ProductWithMeta};
use crate::modules::products::service::PRODUCT_META_COLUMNS;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationParams;

use super::model::PaginatedFavoritesResponse;

pub struct FavoriteService;

impl FavoriteService {
    /// Add a product to the caller's favorites. The row insert and the
    /// counter increment happen in one transaction so the counter stays
    /// in lockstep with row existence.
    #[instrument(skip(db))]
    pub async fn add(db: &PgPool, user_id: i64, product_id: i64) -> Result<(), AppError> {
        let product_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(db)
                .await?;
        if !product_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Product not found")));
        }

        let mut tx = db.begin().await?;

        sqlx::query("INSERT INTO favorites (user_id, product_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::conflict(anyhow::anyhow!(
                            "Product already in favorites"
                        ));
                    }
                    // Product deleted between the check and the insert.
                    if db_err.is_foreign_key_violation() {
                        return AppError::not_found(anyhow::anyhow!("Product not found"));
                    }
                }
                AppError::internal(e)
            })?;

        sqlx::query("UPDATE products SET favorite_count = favorite_count + 1 WHERE id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(user_id, product_id, "Favorite added");
        Ok(())
    }

    /// Remove a favorite. Removing something never favorited is an
    /// explicit error, not a silent no-op.
    #[instrument(skip(db))]
    pub async fn remove(db: &PgPool, user_id: i64, product_id: i64) -> Result<(), AppError> {
        let mut tx = db.begin().await?;

        let deleted = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Product is not in your favorites"
            )));
        }

        // Guarded so the counter can never go below zero.
        sqlx::query(
            "UPDATE products SET favorite_count = favorite_count - 1
             WHERE id = $1 AND favorite_count > 0",
        )
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(user_id, product_id, "Favorite removed");
        Ok(())
    }

    /// The caller's favorited products, most recently favorited first.
    #[instrument(skip(db, pagination))]
    pub async fn list(
        db: &PgPool,
        user_id: i64,
        pagination: PaginationParams,
    ) -> Result<PaginatedFavoritesResponse, AppError> {
        let limit = pagination.limit();
        let offset = pagination.offset();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(db)
            .await?;

        let products = sqlx::query_as::<_, ProductWithMeta>(&format!(
            "SELECT {PRODUCT_META_COLUMNS} FROM favorites f
             JOIN products p ON p.id = f.product_id
             JOIN users u ON u.id = p.owner_id
             LEFT JOIN categories c ON c.id = p.category_id
             WHERE f.user_id = $1
             ORDER BY f.created_at DESC
             LIMIT {limit} OFFSET {offset}"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(PaginatedFavoritesResponse {
            data: products
                .into_iter()
                .map(|product| ProductDetailResponse {
                    product,
                    is_favorite: true,
                })
                .collect(),
            meta: pagination.meta(total),
        })
    }
}
