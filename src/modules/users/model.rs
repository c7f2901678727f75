//! User data models and DTOs.
//!
//! # Core Types
//!
//! - [`User`] - User entity as stored, minus the password hash
//! - [`UserRole`] - `user` | `admin`, stored as a Postgres enum
//! - [`UserStatus`] - active/disabled flag stored as SMALLINT
//!
//! # Request DTOs
//!
//! - [`UpdateProfileDto`] - Update profile fields
//! - [`ChangePasswordDto`] - Change password (current password required)
//!
//! The password hash never appears on any of these types; queries select
//! every column except `password` and the login path uses a private row
//! struct instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Account role. Admin accounts are minted through the CLI, never through
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Account status. Disabled accounts cannot log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
#[serde(into = "i16", try_from = "i16")]
pub enum UserStatus {
    Disabled = 0,
    Active = 1,
}

impl From<UserStatus> for i16 {
    fn from(status: UserStatus) -> i16 {
        status as i16
    }
}

impl TryFrom<i16> for UserStatus {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Disabled),
            1 => Ok(Self::Active),
            other => Err(format!("invalid user status: {}", other)),
        }
    }
}

/// Column list matching [`User`], shared by every query that loads one.
/// Keeping it next to the struct makes a drifted SELECT easy to spot.
pub(crate) const USER_COLUMNS: &str = "id, username, real_name, email, phone, avatar, \
                                       student_id, department, role, status, created_at, \
                                       updated_at";

/// A user account.
///
/// This struct deliberately omits the password hash; the login path reads
/// it through a private row type inside the auth service.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub real_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for updating the caller's own profile.
///
/// Only the supplied fields change. Email and phone are re-checked for
/// cross-user uniqueness before the write.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, message = "real_name must not be empty"))]
    pub real_name: Option<String>,
    #[validate(email(message = "email is not valid"))]
    pub email: Option<String>,
    #[validate(length(min = 5, max = 20, message = "phone must be 5-20 characters"))]
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub student_id: Option<String>,
    pub department: Option<String>,
}

/// DTO for changing the caller's password.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[validate(length(min = 1, message = "current password is required"))]
    #[serde(alias = "old_password")]
    pub current_password: String,
    #[validate(length(min = 6, max = 64, message = "new password must be 6-64 characters"))]
    pub new_password: String,
}

/// Response for the avatar upload endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvatarResponse {
    pub avatar: String,
}
