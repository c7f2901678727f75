use sqlx::PgPool;
use tracing::instrument;

use crate::utils::errors::AppError;

use super::model::{
    MyProductsParams, PaginatedProductsResponse, Product, ProductDetailResponse, ProductDto,
    ProductFilterParams, ProductSort, ProductStatus, ProductWithMeta,
};

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, owner_id, category_id, title, description, price, original_price, images, condition, \
     transaction_type, view_count, favorite_count, status, created_at, updated_at";

/// Joined projection for list/detail responses. The favorites module
/// reuses the column list with its own FROM clause.
pub(crate) const PRODUCT_META_COLUMNS: &str =
    "p.id, p.owner_id, p.category_id, p.title, p.description, p.price, p.original_price, \
     p.images, p.condition, p.transaction_type, p.view_count, p.favorite_count, p.status, \
     p.created_at, p.updated_at, u.username AS owner_username, c.name AS category_name";

pub(crate) const PRODUCT_JOINS: &str = "FROM products p \
     JOIN users u ON u.id = p.owner_id \
     LEFT JOIN categories c ON c.id = p.category_id";

pub struct ProductService;

impl ProductService {
    /// Publish a new listing. It starts in `PendingReview` regardless of
    /// input and only reaches the storefront after an admin approves it.
    #[instrument(skip(db, dto))]
    pub async fn publish(db: &PgPool, owner_id: i64, dto: ProductDto) -> Result<Product, AppError> {
        Self::check_category(db, dto.category_id).await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products
                (owner_id, category_id, title, description, price, original_price, images,
                 condition, transaction_type, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(dto.category_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.price)
        .bind(dto.original_price)
        .bind(&dto.images)
        .bind(&dto.condition)
        .bind(dto.transaction_type)
        .bind(ProductStatus::PendingReview)
        .fetch_one(db)
        .await?;

        crate::metrics::track_product_published();
        tracing::info!(product_id = product.id, owner_id, "Product published, awaiting review");
        Ok(product)
    }

    /// Full-replace update of content fields. Status is never touched
    /// here and sold products are immutable.
    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        caller_id: i64,
        product_id: i64,
        dto: ProductDto,
    ) -> Result<Product, AppError> {
        let product = Self::get(db, product_id).await?;
        if product.owner_id != caller_id {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Not the owner of this product"
            )));
        }
        if product.status == ProductStatus::Sold {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Sold products cannot be modified"
            )));
        }

        Self::check_category(db, dto.category_id).await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET
                category_id = $2,
                title = $3,
                description = $4,
                price = $5,
                original_price = $6,
                images = $7,
                condition = $8,
                transaction_type = $9,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product_id)
        .bind(dto.category_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.price)
        .bind(dto.original_price)
        .bind(&dto.images)
        .bind(&dto.condition)
        .bind(dto.transaction_type)
        .fetch_one(db)
        .await?;

        tracing::info!(product_id, caller_id, "Product updated");
        Ok(product)
    }

    /// Owner toggle between `OnSale` and `Delisted`. Any other target or
    /// starting state is refused; the write itself is guarded by the
    /// expected prior status so a concurrent transition surfaces as a
    /// conflict instead of silently winning.
    #[instrument(skip(db))]
    pub async fn update_status(
        db: &PgPool,
        caller_id: i64,
        product_id: i64,
        status: i16,
    ) -> Result<(), AppError> {
        let target = ProductStatus::try_from(status).map_err(|_| {
            AppError::validation(anyhow::anyhow!(
                "Status can only be set to 1 (on sale) or 2 (delisted)"
            ))
        })?;

        let expected = match target {
            ProductStatus::Delisted => ProductStatus::OnSale,
            ProductStatus::OnSale => ProductStatus::Delisted,
            _ => {
                return Err(AppError::validation(anyhow::anyhow!(
                    "Status can only be set to 1 (on sale) or 2 (delisted)"
                )));
            }
        };

        let product = Self::get(db, product_id).await?;
        if product.owner_id != caller_id {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Not the owner of this product"
            )));
        }
        if product.status != expected {
            let msg = match target {
                ProductStatus::Delisted => "Only on-sale products can be delisted",
                _ => "Only delisted products can be relisted",
            };
            return Err(AppError::invariant(anyhow::anyhow!(msg)));
        }

        let result = sqlx::query(
            "UPDATE products SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(product_id)
        .bind(target)
        .bind(expected)
        .execute(db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Product status changed concurrently, reload and retry"
            )));
        }

        tracing::info!(product_id, caller_id, new_status = status, "Product status toggled");
        Ok(())
    }

    /// Owner delete. Sold products must keep existing for their order
    /// history, so they cannot be deleted by the owner.
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, caller_id: i64, product_id: i64) -> Result<(), AppError> {
        let product = Self::get(db, product_id).await?;
        if product.owner_id != caller_id {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Not the owner of this product"
            )));
        }
        if product.status == ProductStatus::Sold {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Sold products cannot be deleted"
            )));
        }

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(db)
            .await?;

        tracing::info!(product_id, caller_id, "Product deleted by owner");
        Ok(())
    }

    /// Detail view. Increments the view counter first (atomically), then
    /// reads the joined row. `viewer` controls the favorite flag.
    #[instrument(skip(db))]
    pub async fn detail(
        db: &PgPool,
        product_id: i64,
        viewer: Option<i64>,
    ) -> Result<ProductDetailResponse, AppError> {
        let touched = sqlx::query("UPDATE products SET view_count = view_count + 1 WHERE id = $1")
            .bind(product_id)
            .execute(db)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Product not found")));
        }

        let product = sqlx::query_as::<_, ProductWithMeta>(&format!(
            "SELECT {PRODUCT_META_COLUMNS} {PRODUCT_JOINS} WHERE p.id = $1"
        ))
        .bind(product_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Product not found")))?;

        let is_favorite = match viewer {
            Some(user_id) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND product_id = $2)",
                )
                .bind(user_id)
                .bind(product_id)
                .fetch_one(db)
                .await?
            }
            None => false,
        };

        Ok(ProductDetailResponse {
            product,
            is_favorite,
        })
    }

    /// Public browse with optional filters. The status filter passes
    /// through untouched; storefront clients send `1` for on-sale.
    #[instrument(skip(db, filters))]
    pub async fn list(
        db: &PgPool,
        filters: ProductFilterParams,
    ) -> Result<PaginatedProductsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut n = 0usize;
        if filters.category_id.is_some() {
            n += 1;
            where_clause.push_str(&format!(" AND p.category_id = ${}", n));
        }
        if filters.min_price.is_some() {
            n += 1;
            where_clause.push_str(&format!(" AND p.price >= ${}", n));
        }
        if filters.max_price.is_some() {
            n += 1;
            where_clause.push_str(&format!(" AND p.price <= ${}", n));
        }
        if filters.status.is_some() {
            n += 1;
            where_clause.push_str(&format!(" AND p.status = ${}", n));
        }
        if let Some(keyword) = &filters.keyword
            && !keyword.is_empty()
        {
            n += 1;
            where_clause.push_str(&format!(
                " AND (p.title ILIKE ${0} OR p.description ILIKE ${0})",
                n
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM products p WHERE TRUE{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(category_id) = filters.category_id {
            count_sql = count_sql.bind(category_id);
        }
        if let Some(min_price) = filters.min_price {
            count_sql = count_sql.bind(min_price);
        }
        if let Some(max_price) = filters.max_price {
            count_sql = count_sql.bind(max_price);
        }
        if let Some(status) = filters.status {
            count_sql = count_sql.bind(status);
        }
        if let Some(keyword) = &filters.keyword
            && !keyword.is_empty()
        {
            count_sql = count_sql.bind(format!("%{}%", keyword));
        }
        let total = count_sql.fetch_one(db).await?;

        let order_clause = filters
            .sort
            .map(ProductSort::order_clause)
            .unwrap_or("p.created_at DESC");
        let data_query = format!(
            "SELECT {PRODUCT_META_COLUMNS} {PRODUCT_JOINS} WHERE TRUE{where_clause} ORDER BY {order_clause} \
             LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, ProductWithMeta>(&data_query);
        if let Some(category_id) = filters.category_id {
            data_sql = data_sql.bind(category_id);
        }
        if let Some(min_price) = filters.min_price {
            data_sql = data_sql.bind(min_price);
        }
        if let Some(max_price) = filters.max_price {
            data_sql = data_sql.bind(max_price);
        }
        if let Some(status) = filters.status {
            data_sql = data_sql.bind(status);
        }
        if let Some(keyword) = &filters.keyword
            && !keyword.is_empty()
        {
            data_sql = data_sql.bind(format!("%{}%", keyword));
        }
        let products = data_sql.fetch_all(db).await?;

        Ok(PaginatedProductsResponse {
            meta: filters.pagination.meta(total),
            data: products,
        })
    }

    /// The caller's own listings, newest first, optionally filtered by
    /// status.
    #[instrument(skip(db, params))]
    pub async fn list_mine(
        db: &PgPool,
        owner_id: i64,
        params: MyProductsParams,
    ) -> Result<PaginatedProductsResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let status_clause = if params.status.is_some() {
            " AND p.status = $2"
        } else {
            ""
        };

        let count_query =
            format!("SELECT COUNT(*) FROM products p WHERE p.owner_id = $1{status_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query).bind(owner_id);
        if let Some(status) = params.status {
            count_sql = count_sql.bind(status);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {PRODUCT_META_COLUMNS} {PRODUCT_JOINS} WHERE p.owner_id = $1{status_clause} \
             ORDER BY p.created_at DESC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, ProductWithMeta>(&data_query).bind(owner_id);
        if let Some(status) = params.status {
            data_sql = data_sql.bind(status);
        }
        let products = data_sql.fetch_all(db).await?;

        Ok(PaginatedProductsResponse {
            meta: params.pagination.meta(total),
            data: products,
        })
    }

    pub(crate) async fn get(db: &PgPool, product_id: i64) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Product not found")))
    }

    async fn check_category(db: &PgPool, category_id: i64) -> Result<(), AppError> {
        let ok: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND status = 1)",
        )
        .bind(category_id)
        .fetch_one(db)
        .await?;
        if !ok {
            return Err(AppError::validation(anyhow::anyhow!(
                "Unknown or disabled category"
            )));
        }
        Ok(())
    }
}
