use sqlx::PgPool;
use tracing::instrument;

use crate::utils::errors::AppError;

use super::model::Category;

pub(crate) const CATEGORY_COLUMNS: &str = "id, name, parent_id, sort_order, status, created_at";

pub struct CategoryService;

impl CategoryService {
    /// Enabled categories in display order, for browse filters and the
    /// publish form.
    #[instrument(skip(db))]
    pub async fn list_enabled(db: &PgPool) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE status = 1
             ORDER BY sort_order ASC, id ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(categories)
    }
}
