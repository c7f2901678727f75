mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use campusswap::config::cors::CorsConfig;
use campusswap::config::jwt::JwtConfig;
use campusswap::config::rate_limit::RateLimitConfig;
use campusswap::config::storage::StorageConfig;
use campusswap::modules::users::model::UserRole;
use campusswap::router::init_router;
use campusswap::state::AppState;
use campusswap::utils::file_storage::LocalFileStorage;
use common::{create_test_category, create_test_user, generate_unique_username};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x01];

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

async fn logged_in_user(pool: &PgPool, app: axum::Router) -> String {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let password = "testpass123";
    create_test_user(&mut tx, &username, password, UserRole::User).await;
    tx.commit().await.unwrap();
    get_auth_token(app, &username, password).await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_categories_is_public(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/categories")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let categories = body.as_array().unwrap();

    assert_eq!(categories.len(), 6);
    // Display order follows sort_order
    assert_eq!(categories[0]["name"], "Textbooks");
    assert_eq!(categories.last().unwrap()["name"], "Other");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_disabled_categories_stay_hidden(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let visible = create_test_category(&mut tx, "Board Games", 0).await;
    let hidden = create_test_category(&mut tx, "Retired Section", 0).await;
    sqlx::query("UPDATE categories SET status = 0 WHERE id = $1")
        .bind(hidden)
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/categories")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let categories = body.as_array().unwrap();

    assert_eq!(categories.len(), 7);
    assert!(categories.iter().any(|c| c["id"] == visible));
    assert!(!categories.iter().any(|c| c["id"] == hidden));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_image(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let token = logged_in_user(&pool, app.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/files/upload")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "image/png")
        .body(Body::from(PNG_BYTES))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let key = body["key"].as_str().unwrap();
    assert!(key.starts_with("image/"));
    assert!(key.ends_with(".png"));
    let url = body["url"].as_str().unwrap();
    assert_eq!(url, format!("http://localhost:3000/uploads/{}", key));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_avatar_kind(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let token = logged_in_user(&pool, app.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/files/upload?type=avatar")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "image/jpeg")
        .body(Body::from(vec![0xFF, 0xD8, 0xFF, 0xE0]))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let key = body["key"].as_str().unwrap();
    assert!(key.starts_with("avatar/"));
    assert!(key.ends_with(".jpg"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_rejects_unknown_kind(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let token = logged_in_user(&pool, app.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/files/upload?type=script")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "image/png")
        .body(Body::from(PNG_BYTES))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_requires_auth(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/files/upload")
        .header("content-type", "image/png")
        .body(Body::from(PNG_BYTES))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_rejects_unsupported_content_type(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let token = logged_in_user(&pool, app.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/files/upload")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "text/plain")
        .body(Body::from("not an image"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "validation");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_rejects_missing_content_type(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let token = logged_in_user(&pool, app.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/files/upload")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(PNG_BYTES))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_rejects_oversized_body(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let token = logged_in_user(&pool, app.clone()).await;

    // One byte past the configured cap
    let request = Request::builder()
        .method("POST")
        .uri("/api/files/upload")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "image/png")
        .body(Body::from(vec![0u8; 5 * 1024 * 1024 + 1]))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_uploaded_file_is_served_back(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let token = logged_in_user(&pool, app.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/files/upload")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "image/png")
        .body(Body::from(PNG_BYTES))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let key = body["key"].as_str().unwrap();

    let request = Request::builder()
        .method("GET")
        .uri(format!("/uploads/{}", key))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let served = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(served.as_ref(), PNG_BYTES);
}
