pub mod admin;
pub mod auth;
pub mod categories;
pub mod favorites;
pub mod files;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
