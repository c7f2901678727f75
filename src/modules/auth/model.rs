use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::modules::users::model::User;

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

// Login request structure
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username, email, or phone number
    #[validate(length(min = 1, message = "account is required"))]
    pub account: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

// Login response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(length(min = 3, max = 30, message = "username must be 3-30 characters"))]
    pub username: String,
    #[validate(length(min = 6, max = 64, message = "password must be 6-64 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "real_name must not be empty"))]
    pub real_name: Option<String>,
    #[validate(email(message = "email is not valid"))]
    pub email: Option<String>,
    #[validate(length(min = 5, max = 20, message = "phone must be 5-20 characters"))]
    pub phone: Option<String>,
    pub student_id: Option<String>,
    pub department: Option<String>,
}
