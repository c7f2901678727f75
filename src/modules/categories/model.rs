use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Category visibility. Disabled categories stay out of the public
/// listing but keep their products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
#[serde(into = "i16", try_from = "i16")]
pub enum CategoryStatus {
    Disabled = 0,
    Enabled = 1,
}

impl From<CategoryStatus> for i16 {
    fn from(status: CategoryStatus) -> i16 {
        status as i16
    }
}

impl TryFrom<i16> for CategoryStatus {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Disabled),
            1 => Ok(Self::Enabled),
            other => Err(format!("invalid category status: {}", other)),
        }
    }
}

/// A product category. Categories form a two-level tree through
/// `parent_id`; `0` marks a root category.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: i64,
    pub sort_order: i32,
    pub status: CategoryStatus,
    pub created_at: DateTime<Utc>,
}

/// A category with its children attached, for the admin tree view.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryTreeNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryTreeNode>,
}
