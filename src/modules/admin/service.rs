use chrono::{Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::categories::model::{Category, CategoryStatus, CategoryTreeNode};
use crate::modules::categories::service::CATEGORY_COLUMNS;
use crate::modules::orders::model::{OrderResponse, OrderStatus, PaginatedOrdersResponse};
use crate::modules::orders::service::{ORDER_JOINS, ORDER_META_COLUMNS};
use crate::modules::products::model::{PaginatedProductsResponse, ProductStatus, ProductWithMeta};
use crate::modules::products::service::{PRODUCT_JOINS, PRODUCT_META_COLUMNS, ProductService};
use crate::modules::users::model::{USER_COLUMNS, User, UserRole, UserStatus};
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;

use super::model::{
    AdminOrderFilterParams, AdminProductFilterParams, AdminUserFilterParams, AuditProductDto,
    CategoryDto, DashboardStatsResponse, PaginatedUsersResponse, PendingProductParams,
    StatisticsOverviewResponse,
};

pub struct AdminService;

impl AdminService {
    /// User list with optional keyword (username, email, phone),
    /// department, and status filters.
    #[instrument(skip(db, params))]
    pub async fn list_users(
        db: &PgPool,
        params: AdminUserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let mut where_clause = String::new();
        let mut n = 0usize;
        if let Some(keyword) = &params.keyword
            && !keyword.is_empty()
        {
            n += 1;
            where_clause.push_str(&format!(
                " AND (username ILIKE ${0} OR email ILIKE ${0} OR phone ILIKE ${0})",
                n
            ));
        }
        if let Some(department) = &params.department
            && !department.is_empty()
        {
            n += 1;
            where_clause.push_str(&format!(" AND department = ${}", n));
        }
        if params.status.is_some() {
            n += 1;
            where_clause.push_str(&format!(" AND status = ${}", n));
        }

        let count_query = format!("SELECT COUNT(*) FROM users WHERE TRUE{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(keyword) = &params.keyword
            && !keyword.is_empty()
        {
            count_sql = count_sql.bind(format!("%{}%", keyword));
        }
        if let Some(department) = &params.department
            && !department.is_empty()
        {
            count_sql = count_sql.bind(department);
        }
        if let Some(status) = params.status {
            count_sql = count_sql.bind(status);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE TRUE{where_clause} \
             ORDER BY created_at DESC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, User>(&data_query);
        if let Some(keyword) = &params.keyword
            && !keyword.is_empty()
        {
            data_sql = data_sql.bind(format!("%{}%", keyword));
        }
        if let Some(department) = &params.department
            && !department.is_empty()
        {
            data_sql = data_sql.bind(department);
        }
        if let Some(status) = params.status {
            data_sql = data_sql.bind(status);
        }
        let users = data_sql.fetch_all(db).await?;

        Ok(PaginatedUsersResponse {
            data: users,
            meta: params.pagination.meta(total),
        })
    }

    pub async fn get_user(db: &PgPool, user_id: i64) -> Result<User, AppError> {
        UserService::get_profile(db, user_id).await
    }

    /// Enable or disable an account. Admin accounts cannot be disabled;
    /// there is no path back into the system once the last admin locks
    /// itself out.
    #[instrument(skip(db))]
    pub async fn update_user_status(
        db: &PgPool,
        user_id: i64,
        status: i16,
    ) -> Result<(), AppError> {
        let target = UserStatus::try_from(status).map_err(|_| {
            AppError::validation(anyhow::anyhow!(
                "Status can only be set to 0 (disabled) or 1 (active)"
            ))
        })?;

        let user = Self::get_user(db, user_id).await?;
        if user.role == UserRole::Admin && target == UserStatus::Disabled {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Admin accounts cannot be disabled"
            )));
        }

        let result = sqlx::query("UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(target)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        tracing::info!(user_id, new_status = status, "User status updated by admin");
        Ok(())
    }

    /// The review queue: pending products with optional keyword and
    /// category filters.
    #[instrument(skip(db, params))]
    pub async fn pending_products(
        db: &PgPool,
        params: PendingProductParams,
    ) -> Result<PaginatedProductsResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let mut where_clause = String::from(" AND p.status = $1");
        let mut n = 1usize;
        if params.category_id.is_some() {
            n += 1;
            where_clause.push_str(&format!(" AND p.category_id = ${}", n));
        }
        if let Some(keyword) = &params.keyword
            && !keyword.is_empty()
        {
            n += 1;
            where_clause.push_str(&format!(
                " AND (p.title ILIKE ${0} OR p.description ILIKE ${0})",
                n
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM products p WHERE TRUE{where_clause}");
        let mut count_sql =
            sqlx::query_scalar::<_, i64>(&count_query).bind(ProductStatus::PendingReview);
        if let Some(category_id) = params.category_id {
            count_sql = count_sql.bind(category_id);
        }
        if let Some(keyword) = &params.keyword
            && !keyword.is_empty()
        {
            count_sql = count_sql.bind(format!("%{}%", keyword));
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {PRODUCT_META_COLUMNS} {PRODUCT_JOINS} WHERE TRUE{where_clause} \
             ORDER BY p.created_at DESC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql =
            sqlx::query_as::<_, ProductWithMeta>(&data_query).bind(ProductStatus::PendingReview);
        if let Some(category_id) = params.category_id {
            data_sql = data_sql.bind(category_id);
        }
        if let Some(keyword) = &params.keyword
            && !keyword.is_empty()
        {
            data_sql = data_sql.bind(format!("%{}%", keyword));
        }
        let products = data_sql.fetch_all(db).await?;

        Ok(PaginatedProductsResponse {
            data: products,
            meta: params.pagination.meta(total),
        })
    }

    /// Every product regardless of status, for the admin catalogue view.
    #[instrument(skip(db, params))]
    pub async fn list_products(
        db: &PgPool,
        params: AdminProductFilterParams,
    ) -> Result<PaginatedProductsResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let mut where_clause = String::new();
        let mut n = 0usize;
        if params.category_id.is_some() {
            n += 1;
            where_clause.push_str(&format!(" AND p.category_id = ${}", n));
        }
        if params.status.is_some() {
            n += 1;
            where_clause.push_str(&format!(" AND p.status = ${}", n));
        }
        if let Some(keyword) = &params.keyword
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
        if let Some(category_id) = params.category_id {
            count_sql = count_sql.bind(category_id);
        }
        if let Some(status) = params.status {
            count_sql = count_sql.bind(status);
        }
        if let Some(keyword) = &params.keyword
            && !keyword.is_empty()
        {
            count_sql = count_sql.bind(format!("%{}%", keyword));
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {PRODUCT_META_COLUMNS} {PRODUCT_JOINS} WHERE TRUE{where_clause} \
             ORDER BY p.created_at DESC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, ProductWithMeta>(&data_query);
        if let Some(category_id) = params.category_id {
            data_sql = data_sql.bind(category_id);
        }
        if let Some(status) = params.status {
            data_sql = data_sql.bind(status);
        }
        if let Some(keyword) = &params.keyword
            && !keyword.is_empty()
        {
            data_sql = data_sql.bind(format!("%{}%", keyword));
        }
        let products = data_sql.fetch_all(db).await?;

        Ok(PaginatedProductsResponse {
            data: products,
            meta: params.pagination.meta(total),
        })
    }

    /// Decide one pending product: approve onto the storefront or
    /// reject it. Only pending products can be audited, and the guarded
    /// write keeps a racing second decision from applying twice.
    #[instrument(skip(db, dto), fields(product_id = dto.product_id))]
    pub async fn audit_product(db: &PgPool, dto: AuditProductDto) -> Result<(), AppError> {
        let decision = match ProductStatus::try_from(dto.status) {
            Ok(status @ (ProductStatus::OnSale | ProductStatus::Rejected)) => status,
            _ => {
                return Err(AppError::validation(anyhow::anyhow!(
                    "Audit status must be 1 (approve) or 4 (reject)"
                )));
            }
        };

        let product = ProductService::get(db, dto.product_id).await?;
        if product.status != ProductStatus::PendingReview {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Product is not awaiting review"
            )));
        }

        let result = sqlx::query(
            "UPDATE products SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(dto.product_id)
        .bind(decision)
        .bind(ProductStatus::PendingReview)
        .execute(db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Product left the review queue concurrently"
            )));
        }

        let outcome = if decision == ProductStatus::OnSale {
            "approved"
        } else {
            "rejected"
        };
        crate::metrics::track_product_audited(outcome);
        tracing::info!(
            product_id = dto.product_id,
            outcome,
            reason = dto.reason.as_deref().unwrap_or(""),
            "Product audited"
        );
        Ok(())
    }

    /// Decisions apply in order; the first failure stops the batch and
    /// earlier decisions stay applied.
    #[instrument(skip(db, items), fields(count = items.len()))]
    pub async fn batch_audit(db: &PgPool, items: Vec<AuditProductDto>) -> Result<(), AppError> {
        for dto in items {
            Self::audit_product(db, dto).await?;
        }
        Ok(())
    }

    /// Force-delist a product. Sold products are left alone: their state
    /// belongs to the order that bought them.
    #[instrument(skip(db))]
    pub async fn takedown_product(db: &PgPool, product_id: i64) -> Result<(), AppError> {
        let product = ProductService::get(db, product_id).await?;
        if product.status == ProductStatus::Sold {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Sold products cannot be taken down"
            )));
        }

        let result = sqlx::query(
            "UPDATE products SET status = $2, updated_at = NOW() WHERE id = $1 AND status <> $3",
        )
        .bind(product_id)
        .bind(ProductStatus::Delisted)
        .bind(ProductStatus::Sold)
        .execute(db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Product was sold concurrently"
            )));
        }

        tracing::info!(product_id, "Product taken down by admin");
        Ok(())
    }

    /// Remove a product outright, whatever its state. Orders keep their
    /// snapshot (no foreign key), favorites cascade away.
    #[instrument(skip(db))]
    pub async fn delete_product(db: &PgPool, product_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Product not found")));
        }

        tracing::info!(product_id, "Product deleted by admin");
        Ok(())
    }

    /// Every order in the system, optionally filtered by status.
    #[instrument(skip(db, params))]
    pub async fn list_orders(
        db: &PgPool,
        params: AdminOrderFilterParams,
    ) -> Result<PaginatedOrdersResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let status_clause = if params.status.is_some() {
            " WHERE o.status = $1"
        } else {
            ""
        };

        let count_query = format!("SELECT COUNT(*) FROM orders o{status_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(status) = params.status {
            count_sql = count_sql.bind(status);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {ORDER_META_COLUMNS} {ORDER_JOINS}{status_clause} \
             ORDER BY o.created_at DESC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, OrderResponse>(&data_query);
        if let Some(status) = params.status {
            data_sql = data_sql.bind(status);
        }
        let orders = data_sql.fetch_all(db).await?;

        Ok(PaginatedOrdersResponse {
            data: orders,
            meta: params.pagination.meta(total),
        })
    }

    /// Every category including disabled ones, in display order.
    #[instrument(skip(db))]
    pub async fn list_categories(db: &PgPool) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY sort_order ASC, id ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(categories)
    }

    /// The category tree, assembled in memory from `parent_id` links.
    #[instrument(skip(db))]
    pub async fn category_tree(db: &PgPool) -> Result<Vec<CategoryTreeNode>, AppError> {
        let categories = Self::list_categories(db).await?;
        Ok(build_tree(&categories, 0))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_category(db: &PgPool, dto: CategoryDto) -> Result<Category, AppError> {
        let status = parse_category_status(dto.status)?;
        if dto.parent_id != 0 {
            Self::check_parent(db, dto.parent_id).await?;
        }

        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name, parent_id, sort_order, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(dto.parent_id)
        .bind(dto.sort_order)
        .bind(status)
        .fetch_one(db)
        .await?;

        tracing::info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Full replacement of a category's fields.
    #[instrument(skip(db, dto))]
    pub async fn update_category(
        db: &PgPool,
        category_id: i64,
        dto: CategoryDto,
    ) -> Result<Category, AppError> {
        let status = parse_category_status(dto.status)?;
        if dto.parent_id == category_id {
            return Err(AppError::validation(anyhow::anyhow!(
                "Category cannot be its own parent"
            )));
        }
        if dto.parent_id != 0 {
            Self::check_parent(db, dto.parent_id).await?;
        }

        let category = sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories SET name = $2, parent_id = $3, sort_order = $4, status = $5
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(category_id)
        .bind(&dto.name)
        .bind(dto.parent_id)
        .bind(dto.sort_order)
        .bind(status)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Category not found")))?;

        tracing::info!(category_id, "Category updated");
        Ok(category)
    }

    /// A category can only go once nothing references it: child
    /// categories and products both block deletion.
    #[instrument(skip(db))]
    pub async fn delete_category(db: &PgPool, category_id: i64) -> Result<(), AppError> {
        let has_children: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE parent_id = $1)")
                .bind(category_id)
                .fetch_one(db)
                .await?;
        if has_children {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Category has child categories"
            )));
        }

        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(db)
                .await?;
        if product_count > 0 {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Category still has products"
            )));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Category not found")));
        }

        tracing::info!(category_id, "Category deleted");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn update_category_status(
        db: &PgPool,
        category_id: i64,
        status: i16,
    ) -> Result<(), AppError> {
        let target = parse_category_status(status)?;

        let result = sqlx::query("UPDATE categories SET status = $2 WHERE id = $1")
            .bind(category_id)
            .bind(target)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Category not found")));
        }

        tracing::info!(category_id, new_status = status, "Category status updated");
        Ok(())
    }

    /// Headline numbers for the dashboard. The amount counts completed
    /// orders only; cancelled and in-flight money is not revenue.
    #[instrument(skip(db))]
    pub async fn dashboard(db: &PgPool) -> Result<DashboardStatsResponse, AppError> {
        let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;

        let (product_count, pending_review_count): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COUNT(*) FILTER (WHERE status = $1) FROM products")
                .bind(ProductStatus::PendingReview)
                .fetch_one(db)
                .await?;

        let (order_count, total_amount): (i64, Decimal) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_price) FILTER (WHERE status = $1), 0) FROM orders",
        )
        .bind(OrderStatus::Completed)
        .fetch_one(db)
        .await?;

        Ok(DashboardStatsResponse {
            user_count,
            product_count,
            order_count,
            total_amount,
            pending_review_count,
        })
    }

    /// Totals plus today / 7-day / 30-day windows, one aggregate query
    /// per table.
    #[instrument(skip(db))]
    pub async fn overview(db: &PgPool) -> Result<StatisticsOverviewResponse, AppError> {
        let now = Utc::now();
        let today_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let week_start = now - Duration::days(7);
        let month_start = now - Duration::days(30);

        let (total_users, today_users, week_users, month_users): (i64, i64, i64, i64) =
            sqlx::query_as(
                "SELECT COUNT(*),
                        COUNT(*) FILTER (WHERE created_at >= $1),
                        COUNT(*) FILTER (WHERE created_at >= $2),
                        COUNT(*) FILTER (WHERE created_at >= $3)
                 FROM users",
            )
            .bind(today_start)
            .bind(week_start)
            .bind(month_start)
            .fetch_one(db)
            .await?;

        let (total_products, today_products, week_products, month_products, on_sale_products): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE created_at >= $1),
                    COUNT(*) FILTER (WHERE created_at >= $2),
                    COUNT(*) FILTER (WHERE created_at >= $3),
                    COUNT(*) FILTER (WHERE status = $4)
             FROM products",
        )
        .bind(today_start)
        .bind(week_start)
        .bind(month_start)
        .bind(ProductStatus::OnSale)
        .fetch_one(db)
        .await?;

        let (
            total_orders,
            today_orders,
            week_orders,
            month_orders,
            total_amount,
            today_amount,
            week_amount,
            month_amount,
        ): (i64, i64, i64, i64, Decimal, Decimal, Decimal, Decimal) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE created_at >= $1),
                    COUNT(*) FILTER (WHERE created_at >= $2),
                    COUNT(*) FILTER (WHERE created_at >= $3),
                    COALESCE(SUM(total_price) FILTER (WHERE status = $4), 0),
                    COALESCE(SUM(total_price) FILTER (WHERE status = $4 AND created_at >= $1), 0),
                    COALESCE(SUM(total_price) FILTER (WHERE status = $4 AND created_at >= $2), 0),
                    COALESCE(SUM(total_price) FILTER (WHERE status = $4 AND created_at >= $3), 0)
             FROM orders",
        )
        .bind(today_start)
        .bind(week_start)
        .bind(month_start)
        .bind(OrderStatus::Completed)
        .fetch_one(db)
        .await?;

        Ok(StatisticsOverviewResponse {
            total_users,
            today_users,
            week_users,
            month_users,
            total_products,
            today_products,
            week_products,
            month_products,
            on_sale_products,
            total_orders,
            today_orders,
            week_orders,
            month_orders,
            total_amount,
            today_amount,
            week_amount,
            month_amount,
        })
    }

    async fn check_parent(db: &PgPool, parent_id: i64) -> Result<(), AppError> {
        let ok: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(parent_id)
            .fetch_one(db)
            .await?;
        if !ok {
            return Err(AppError::validation(anyhow::anyhow!(
                "Parent category does not exist"
            )));
        }
        Ok(())
    }
}

fn parse_category_status(status: i16) -> Result<CategoryStatus, AppError> {
    CategoryStatus::try_from(status).map_err(|_| {
        AppError::validation(anyhow::anyhow!(
            "Status can only be 0 (disabled) or 1 (enabled)"
        ))
    })
}

fn build_tree(categories: &[Category], parent_id: i64) -> Vec<CategoryTreeNode> {
    categories
        .iter()
        .filter(|category| category.parent_id == parent_id)
        .map(|category| CategoryTreeNode {
            category: category.clone(),
            children: build_tree(categories, category.id),
        })
        .collect()
}
