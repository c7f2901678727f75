use sqlx::PgPool;
use tracing::instrument;

use crate::config::jwt::JwtConfig;
use crate::modules::users::model::{USER_COLUMNS, User, UserRole, UserStatus};
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::{hash_password, verify_password};

use super::model::{LoginRequest, LoginResponse, RegisterRequestDto};

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto), fields(username = %dto.username))]
    pub async fn register(db: &PgPool, dto: RegisterRequestDto) -> Result<User, AppError> {
        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(&dto.username)
                .fetch_one(db)
                .await?;
        if username_taken {
            return Err(AppError::conflict(anyhow::anyhow!("Username already taken")));
        }

        if let Some(email) = &dto.email {
            let email_taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                    .bind(email)
                    .fetch_one(db)
                    .await?;
            if email_taken {
                return Err(AppError::conflict(anyhow::anyhow!("Email already registered")));
            }
        }

        if let Some(phone) = &dto.phone {
            let phone_taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)")
                    .bind(phone)
                    .fetch_one(db)
                    .await?;
            if phone_taken {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Phone number already registered"
                )));
            }
        }

        let hashed_password = hash_password(&dto.password)?;

        // Unique indexes still back the pre-checks under concurrent registration.
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password, real_name, email, phone, student_id, department)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.username)
        .bind(&hashed_password)
        .bind(&dto.real_name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(&dto.student_id)
        .bind(&dto.department)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "Username, email, or phone already registered"
                ));
            }
            e.into()
        })?;

        crate::metrics::track_user_registered();
        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    #[instrument(skip(db, dto, jwt_config), fields(account = %dto.account))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        #[derive(sqlx::FromRow)]
        struct UserWithPassword {
            id: i64,
            username: String,
            password: String,
            real_name: Option<String>,
            email: Option<String>,
            phone: Option<String>,
            avatar: Option<String>,
            student_id: Option<String>,
            department: Option<String>,
            role: UserRole,
            status: UserStatus,
            created_at: chrono::DateTime<chrono::Utc>,
            updated_at: chrono::DateTime<chrono::Utc>,
        }

        let row = sqlx::query_as::<_, UserWithPassword>(&format!(
            "SELECT {USER_COLUMNS}, password FROM users
             WHERE username = $1 OR email = $1 OR phone = $1"
        ))
        .bind(&dto.account)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| {
            crate::metrics::track_login_failure("unknown_account");
            AppError::unauthenticated(anyhow::anyhow!("Invalid account or password"))
        })?;

        let is_valid = verify_password(&dto.password, &row.password)?;
        if !is_valid {
            crate::metrics::track_login_failure("bad_password");
            return Err(AppError::unauthenticated(anyhow::anyhow!(
                "Invalid account or password"
            )));
        }

        // Disabled is only reported once the credentials themselves check out.
        if row.status == UserStatus::Disabled {
            crate::metrics::track_login_failure("account_disabled");
            return Err(AppError::forbidden(anyhow::anyhow!("Account is disabled")));
        }

        let access_token = create_access_token(row.id, &row.username, &row.role, jwt_config)?;
        crate::metrics::track_jwt_issued();

        let user = User {
            id: row.id,
            username: row.username,
            real_name: row.real_name,
            email: row.email,
            phone: row.phone,
            avatar: row.avatar,
            student_id: row.student_id,
            department: row.department,
            role: row.role,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        crate::metrics::track_login_success(user.role.as_str());
        tracing::info!(user_id = user.id, "User logged in");
        Ok(LoginResponse { access_token, user })
    }
}
