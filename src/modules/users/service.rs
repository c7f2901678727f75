use sqlx::PgPool;
use tracing::instrument;

use crate::utils::errors::AppError;
use crate::utils::password::{hash_password, verify_password};

use super::model::{ChangePasswordDto, USER_COLUMNS, UpdateProfileDto, User};

pub struct UserService;

impl UserService {
    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, user_id: i64) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    /// Partial profile update; absent fields keep their current value.
    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        user_id: i64,
        dto: UpdateProfileDto,
    ) -> Result<User, AppError> {
        if let Some(email) = &dto.email {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id <> $2)")
                    .bind(email)
                    .bind(user_id)
                    .fetch_one(db)
                    .await?;
            if taken {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Email already in use by another account"
                )));
            }
        }

        if let Some(phone) = &dto.phone {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1 AND id <> $2)")
                    .bind(phone)
                    .bind(user_id)
                    .fetch_one(db)
                    .await?;
            if taken {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Phone number already in use by another account"
                )));
            }
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                real_name = COALESCE($2, real_name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                avatar = COALESCE($5, avatar),
                student_id = COALESCE($6, student_id),
                department = COALESCE($7, department),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&dto.real_name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(&dto.avatar)
        .bind(&dto.student_id)
        .bind(&dto.department)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            // Backstop for a concurrent registration between the check and
            // the write.
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "Email or phone already in use by another account"
                ));
            }
            AppError::internal(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        tracing::info!(user_id, "Profile updated");
        Ok(user)
    }

    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        user_id: i64,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let stored_hash: String = sqlx::query_scalar("SELECT password FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        if !verify_password(&dto.current_password, &stored_hash)? {
            return Err(AppError::validation(anyhow::anyhow!(
                "Current password is incorrect"
            )));
        }

        let new_hash = hash_password(&dto.new_password)?;
        sqlx::query("UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(&new_hash)
            .execute(db)
            .await?;

        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    #[instrument(skip(db, avatar_url))]
    pub async fn update_avatar(db: &PgPool, user_id: i64, avatar_url: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET avatar = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(avatar_url)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }
        Ok(())
    }

    /// Deletes the caller's account together with their listed products.
    ///
    /// Accounts that appear on any order (either side) are refused: orders
    /// are a shared record between two parties and keep snapshots of both.
    #[instrument(skip(db))]
    pub async fn delete_account(db: &PgPool, user_id: i64) -> Result<(), AppError> {
        let has_orders: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE buyer_id = $1 OR seller_id = $1)",
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;
        if has_orders {
            return Err(AppError::invariant(anyhow::anyhow!(
                "Account with order history cannot be deleted"
            )));
        }

        let mut tx = db.begin().await?;

        // Favorites referencing these products go away through ON DELETE
        // CASCADE, as do the caller's own favorite rows.
        sqlx::query("DELETE FROM products WHERE owner_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        tx.commit().await?;
        tracing::info!(user_id, "Account deleted");
        Ok(())
    }
}
