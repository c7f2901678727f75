use campusswap::modules::orders::model::OrderStatus;
use campusswap::modules::products::model::ProductStatus;
use campusswap::modules::users::model::UserRole;
use campusswap::utils::password::hash_password;
use rust_decimal::Decimal;
#[allow(unused_imports)]
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// First seeded root category from the migrations (Textbooks).
#[allow(dead_code)]
pub const SEEDED_CATEGORY_ID: i64 = 1;

#[allow(dead_code)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub password: String,
}

#[allow(dead_code)]
pub struct TestProduct {
    pub id: i64,
    pub price: Decimal,
}

pub async fn create_test_user(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
    password: &str,
    role: UserRole,
) -> TestUser {
    let hashed = hash_password(password).unwrap();

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (username, password, email, role)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(username)
    .bind(&hashed)
    .bind(format!("{}@campus.test", username))
    .bind(role)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestUser {
        id,
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[allow(dead_code)]
pub async fn disable_user(tx: &mut Transaction<'_, Postgres>, user_id: i64) {
    sqlx::query("UPDATE users SET status = 0 WHERE id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .unwrap();
}

#[allow(dead_code)]
pub async fn create_test_product(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: i64,
    category_id: i64,
    status: ProductStatus,
) -> TestProduct {
    let price = Decimal::new(5000, 2); // 50.00

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO products (owner_id, category_id, title, description, price, images, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id",
    )
    .bind(owner_id)
    .bind(category_id)
    .bind(format!("Test product {}", Uuid::new_v4().simple()))
    .bind("A well-loved test item")
    .bind(price)
    .bind(vec!["http://localhost:3000/uploads/image/test.jpg".to_string()])
    .bind(status)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestProduct { id, price }
}

#[allow(dead_code)]
pub async fn create_test_order(
    tx: &mut Transaction<'_, Postgres>,
    buyer_id: i64,
    seller_id: i64,
    product_id: i64,
    status: OrderStatus,
) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO orders
            (order_no, buyer_id, seller_id, product_id, quantity, total_price,
             transaction_type, status)
         VALUES ($1, $2, $3, $4, 1, $5, 2, $6)
         RETURNING id",
    )
    .bind(format!("ORDTEST{}", Uuid::new_v4().simple()))
    .bind(buyer_id)
    .bind(seller_id)
    .bind(product_id)
    .bind(Decimal::new(5000, 2))
    .bind(status)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    id
}

#[allow(dead_code)]
pub async fn create_test_category(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    parent_id: i64,
) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO categories (name, parent_id, sort_order)
         VALUES ($1, $2, 10)
         RETURNING id",
    )
    .bind(name)
    .bind(parent_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    id
}

pub fn generate_unique_username() -> String {
    format!("u{}", &Uuid::new_v4().simple().to_string()[..12])
}

#[allow(dead_code)]
pub fn generate_unique_email() -> String {
    format!("test-{}@campus.test", Uuid::new_v4())
}
