use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::admin::model::{
    AdminOrderFilterParams, AdminProductFilterParams, AdminUserFilterParams, AuditProductDto,
    CategoryDto, DashboardStatsResponse, PaginatedUsersResponse, PendingProductParams,
    StatisticsOverviewResponse, UpdateCategoryStatusDto, UpdateUserStatusDto,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse, RegisterRequestDto};
use crate::modules::categories::model::{Category, CategoryStatus, CategoryTreeNode};
use crate::modules::favorites::model::{FavoritesParams, PaginatedFavoritesResponse};
use crate::modules::files::model::UploadResponse;
use crate::modules::orders::model::{
    CreateOrderDto, Order, OrderFilterParams, OrderResponse, OrderStatus, OrderView,
    PaginatedOrdersResponse,
};
use crate::modules::products::model::{
    MyProductsParams, PaginatedProductsResponse, Product, ProductDetailResponse, ProductDto,
    ProductFilterParams, ProductSort, ProductStatus, ProductWithMeta, TransactionType,
    UpdateProductStatusDto,
};
use crate::modules::reviews::model::{
    AboutMeParams, CreateReviewDto, PaginatedReviewsResponse, Review, ReviewResponse,
};
use crate::modules::users::model::{
    AvatarResponse, ChangePasswordDto, UpdateProfileDto, User, UserRole, UserStatus,
};
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::update_me,
        crate::modules::users::controller::change_password,
        crate::modules::users::controller::upload_avatar,
        crate::modules::users::controller::delete_me,
        crate::modules::products::controller::list_products,
        crate::modules::products::controller::my_products,
        crate::modules::products::controller::get_product,
        crate::modules::products::controller::publish_product,
        crate::modules::products::controller::update_product,
        crate::modules::products::controller::update_product_status,
        crate::modules::products::controller::delete_product,
        crate::modules::orders::controller::create_order,
        crate::modules::orders::controller::list_orders,
        crate::modules::orders::controller::get_order,
        crate::modules::orders::controller::deliver_order,
        crate::modules::orders::controller::confirm_order,
        crate::modules::orders::controller::cancel_order,
        crate::modules::favorites::controller::add_favorite,
        crate::modules::favorites::controller::remove_favorite,
        crate::modules::favorites::controller::list_favorites,
        crate::modules::reviews::controller::create_review,
        crate::modules::reviews::controller::reviews_by_order,
        crate::modules::reviews::controller::reviews_about_me,
        crate::modules::categories::controller::list_categories,
        crate::modules::files::controller::upload_file,
        crate::modules::admin::controller::list_users,
        crate::modules::admin::controller::get_user,
        crate::modules::admin::controller::update_user_status,
        crate::modules::admin::controller::list_pending_products,
        crate::modules::admin::controller::list_all_products,
        crate::modules::admin::controller::audit_product,
        crate::modules::admin::controller::batch_audit_products,
        crate::modules::admin::controller::takedown_product,
        crate::modules::admin::controller::remove_product,
        crate::modules::admin::controller::list_all_orders,
        crate::modules::admin::controller::get_any_order,
        crate::modules::admin::controller::get_category_tree,
        crate::modules::admin::controller::list_all_categories,
        crate::modules::admin::controller::create_category,
        crate::modules::admin::controller::update_category,
        crate::modules::admin::controller::delete_category,
        crate::modules::admin::controller::update_category_status,
        crate::modules::admin::controller::dashboard_stats,
        crate::modules::admin::controller::statistics_overview,
    ),
    components(
        schemas(
            User,
            UserRole,
            UserStatus,
            UpdateProfileDto,
            ChangePasswordDto,
            AvatarResponse,
            RegisterRequestDto,
            LoginRequest,
            LoginResponse,
            ErrorResponse,
            Product,
            ProductStatus,
            TransactionType,
            ProductWithMeta,
            ProductDetailResponse,
            ProductDto,
            UpdateProductStatusDto,
            ProductSort,
            ProductFilterParams,
            MyProductsParams,
            PaginatedProductsResponse,
            Order,
            OrderStatus,
            OrderView,
            OrderResponse,
            CreateOrderDto,
            OrderFilterParams,
            PaginatedOrdersResponse,
            FavoritesParams,
            PaginatedFavoritesResponse,
            Review,
            ReviewResponse,
            CreateReviewDto,
            AboutMeParams,
            PaginatedReviewsResponse,
            Category,
            CategoryStatus,
            CategoryTreeNode,
            UploadResponse,
            AdminUserFilterParams,
            PaginatedUsersResponse,
            UpdateUserStatusDto,
            PendingProductParams,
            AdminProductFilterParams,
            AuditProductDto,
            AdminOrderFilterParams,
            CategoryDto,
            UpdateCategoryStatusDto,
            DashboardStatsResponse,
            StatisticsOverviewResponse,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Users", description = "Profile management endpoints"),
        (name = "Products", description = "Product lifecycle and search"),
        (name = "Orders", description = "Order lifecycle endpoints"),
        (name = "Favorites", description = "Personal favorites list"),
        (name = "Reviews", description = "Per-order reviews"),
        (name = "Categories", description = "Public category listing"),
        (name = "Files", description = "Image upload"),
        (name = "Admin", description = "Moderation, categories and statistics")
    ),
    info(
        title = "CampusSwap API",
        version = "0.1.0",
        description = "A campus second-hand marketplace REST API built with Rust, Axum, and PostgreSQL featuring JWT-based authentication.",
        contact(
            name = "API Support",
            email = "support@campusswap.dev"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
