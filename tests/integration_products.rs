mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use campusswap::config::cors::CorsConfig;
use campusswap::config::jwt::JwtConfig;
use campusswap::config::rate_limit::RateLimitConfig;
use campusswap::config::storage::StorageConfig;
use campusswap::modules::products::model::ProductStatus;
use campusswap::modules::users::model::UserRole;
use campusswap::router::init_router;
use campusswap::state::AppState;
use campusswap::utils::file_storage::LocalFileStorage;
use common::{
    SEEDED_CATEGORY_ID, create_test_product, create_test_user, generate_unique_username,
};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

async fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    let storage_config = StorageConfig {
        upload_dir: std::env::temp_dir().join("campusswap-test-uploads"),
        public_base_url: "http://localhost:3000/uploads".to_string(),
        max_upload_bytes: 5 * 1024 * 1024,
        allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
    };
    let state = AppState {
        db: pool,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::default(),
        storage: Arc::new(LocalFileStorage::from_config(&storage_config)),
    };
    init_router(state)
}

async fn get_auth_token(app: axum::Router, account: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "account": account,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

fn publish_body(title: &str) -> String {
    serde_json::to_string(&json!({
        "title": title,
        "description": "Hardly used, pick up at the north gate",
        "category_id": SEEDED_CATEGORY_ID,
        "price": "45.00",
        "original_price": "89.90",
        "images": ["http://localhost:3000/uploads/image/demo.jpg"],
        "condition": "like new"
    }))
    .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_publish_product(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let password = "testpass123";
    create_test_user(&mut tx, &username, password, UserRole::User).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &username, password).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(publish_body("Linear Algebra, 4th ed")))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["title"], "Linear Algebra, 4th ed");
    // New listings always wait for review
    assert_eq!(body["status"], 0);
    assert_eq!(body["price"], "45.00");
    assert_eq!(body["view_count"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_publish_requires_auth(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("content-type", "application/json")
        .body(Body::from(publish_body("Desk lamp")))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_publish_unknown_category(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let password = "testpass123";
    create_test_user(&mut tx, &username, password, UserRole::User).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &username, password).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "title": "Mystery box",
                "description": "No category fits this",
                "category_id": 99999,
                "price": "10.00",
                "images": ["http://localhost:3000/uploads/image/demo.jpg"]
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_publish_rejects_zero_price(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let password = "testpass123";
    create_test_user(&mut tx, &username, password, UserRole::User).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &username, password).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "title": "Freebie",
                "description": "Giving this away",
                "category_id": SEEDED_CATEGORY_ID,
                "price": "0.00",
                "images": ["http://localhost:3000/uploads/image/demo.jpg"]
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_filters_by_status(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let owner = create_test_user(&mut tx, &username, "testpass123", UserRole::User).await;
    let on_sale =
        create_test_product(&mut tx, owner.id, SEEDED_CATEGORY_ID, ProductStatus::OnSale).await;
    create_test_product(
        &mut tx,
        owner.id,
        SEEDED_CATEGORY_ID,
        ProductStatus::PendingReview,
    )
    .await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    // Storefront view: on-sale only
    let request = Request::builder()
        .method("GET")
        .uri("/api/products?status=1")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], on_sale.id);
    assert_eq!(body["data"][0]["owner_username"], username.as_str());
    assert_eq!(body["data"][0]["category_name"], "Textbooks");

    // No filter: both rows visible
    let request = Request::builder()
        .method("GET")
        .uri("/api/products")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["meta"]["total"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_keyword_search(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let password = "testpass123";
    create_test_user(&mut tx, &username, password, UserRole::User).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &username, password).await;

    for title in ["Mountain bike", "Road bike helmet", "Desk lamp"] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/products")
            .header("authorization", format!("Bearer {}", token))
            .header("content-type", "application/json")
            .body(Body::from(publish_body(title)))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let request = Request::builder()
        .method("GET")
        .uri("/api/products?keyword=bike")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["meta"]["total"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_product_detail(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let owner = create_test_user(&mut tx, &username, "testpass123", UserRole::User).await;
    let product =
        create_test_product(&mut tx, owner.id, SEEDED_CATEGORY_ID, ProductStatus::OnSale).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/products/{}", product.id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["id"], product.id);
    assert_eq!(body["owner_username"], username.as_str());
    assert_eq!(body["category_name"], "Textbooks");
    // Anonymous viewers never see a favorite flag set
    assert_eq!(body["is_favorite"], false);
    // The view itself was counted
    assert_eq!(body["view_count"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_product_not_found(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/products/424242")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_own_product(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let password = "testpass123";
    let owner = create_test_user(&mut tx, &username, password, UserRole::User).await;
    let product =
        create_test_product(&mut tx, owner.id, SEEDED_CATEGORY_ID, ProductStatus::OnSale).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &username, password).await;

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/products/{}", product.id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(publish_body("Renamed listing")))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["title"], "Renamed listing");
    assert_eq!(body["price"], "45.00");
    // Editing content does not reset the review state
    assert_eq!(body["status"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_product_not_owner(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let owner_name = generate_unique_username();
    let other_name = generate_unique_username();
    let password = "testpass123";
    let owner = create_test_user(&mut tx, &owner_name, password, UserRole::User).await;
    create_test_user(&mut tx, &other_name, password, UserRole::User).await;
    let product =
        create_test_product(&mut tx, owner.id, SEEDED_CATEGORY_ID, ProductStatus::OnSale).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &other_name, password).await;

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/products/{}", product.id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(publish_body("Hijacked listing")))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delist_and_relist(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let password = "testpass123";
    let owner = create_test_user(&mut tx, &username, password, UserRole::User).await;
    let product =
        create_test_product(&mut tx, owner.id, SEEDED_CATEGORY_ID, ProductStatus::OnSale).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &username, password).await;

    let delist = Request::builder()
        .method("PUT")
        .uri(format!("/api/products/{}/status", product.id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status": 2}"#))
        .unwrap();
    let response = app.clone().oneshot(delist).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Delisting twice is refused: the product is no longer on sale
    let delist_again = Request::builder()
        .method("PUT")
        .uri(format!("/api/products/{}/status", product.id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status": 2}"#))
        .unwrap();
    let response = app.clone().oneshot(delist_again).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let relist = Request::builder()
        .method("PUT")
        .uri(format!("/api/products/{}/status", product.id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status": 1}"#))
        .unwrap();
    let response = app.clone().oneshot(relist).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let status: i16 = sqlx::query_scalar("SELECT status FROM products WHERE id = $1")
        .bind(product.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_status_toggle_rejects_other_targets(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let password = "testpass123";
    let owner = create_test_user(&mut tx, &username, password, UserRole::User).await;
    let product =
        create_test_product(&mut tx, owner.id, SEEDED_CATEGORY_ID, ProductStatus::OnSale).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &username, password).await;

    // Owners cannot mark their product sold by hand
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/products/{}/status", product.id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status": 3}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_own_product(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let password = "testpass123";
    let owner = create_test_user(&mut tx, &username, password, UserRole::User).await;
    let product =
        create_test_product(&mut tx, owner.id, SEEDED_CATEGORY_ID, ProductStatus::Delisted).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &username, password).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/products/{}", product.id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/products/{}", product.id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_sold_product_refused(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let password = "testpass123";
    let owner = create_test_user(&mut tx, &username, password, UserRole::User).await;
    let product =
        create_test_product(&mut tx, owner.id, SEEDED_CATEGORY_ID, ProductStatus::Sold).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &username, password).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/products/{}", product.id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_my_products(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let mine = generate_unique_username();
    let theirs = generate_unique_username();
    let password = "testpass123";
    let me = create_test_user(&mut tx, &mine, password, UserRole::User).await;
    let other = create_test_user(&mut tx, &theirs, password, UserRole::User).await;
    create_test_product(&mut tx, me.id, SEEDED_CATEGORY_ID, ProductStatus::OnSale).await;
    create_test_product(&mut tx, me.id, SEEDED_CATEGORY_ID, ProductStatus::Delisted).await;
    create_test_product(&mut tx, other.id, SEEDED_CATEGORY_ID, ProductStatus::OnSale).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &mine, password).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/products/my")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["meta"]["total"], 2);

    // Status narrows within the caller's listings
    let request = Request::builder()
        .method("GET")
        .uri("/api/products/my?status=2")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["status"], 2);
}
