use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::TypedHeader;
use axum_extra::headers::ContentType;
use tracing::instrument;

use crate::middleware::auth::CurrentUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::files::service::FileService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{AvatarResponse, ChangePasswordDto, UpdateProfileDto, User};
use super::service::UserService;

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user profile", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<User>, AppError> {
    let user = UserService::get_profile(&state.db, ctx.user_id).await?;
    Ok(Json(user))
}

/// Update the authenticated user's profile
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Updated profile", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 409, description = "Email or phone already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<User>, AppError> {
    let user = UserService::update_profile(&state.db, ctx.user_id, dto).await?;
    Ok(Json(user))
}

/// Change the authenticated user's password
#[utoipa::path(
    put,
    path = "/api/users/me/password",
    request_body = ChangePasswordDto,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 422, description = "Current password incorrect or new password invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<StatusCode, AppError> {
    UserService::change_password(&state.db, ctx.user_id, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a new avatar image (raw request body)
#[utoipa::path(
    post,
    path = "/api/users/me/avatar",
    request_body(content = Vec<u8>, description = "Raw image bytes", content_type = "image/jpeg"),
    responses(
        (status = 200, description = "Avatar stored and profile updated", body = AvatarResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 422, description = "Unsupported content type or file too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, content_type, body))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    content_type: Option<TypedHeader<ContentType>>,
    body: Bytes,
) -> Result<Json<AvatarResponse>, AppError> {
    let content_type = content_type
        .ok_or_else(|| AppError::validation(anyhow::anyhow!("Content-Type header is required")))?;

    let stored = FileService::store(
        state.storage.as_ref(),
        "avatar",
        &content_type.to_string(),
        &body,
    )
    .await?;
    UserService::update_avatar(&state.db, ctx.user_id, &stored.url).await?;

    Ok(Json(AvatarResponse { avatar: stored.url }))
}

/// Delete the authenticated user's account
#[utoipa::path(
    delete,
    path = "/api/users/me",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Account has order history", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<StatusCode, AppError> {
    UserService::delete_account(&state.db, ctx.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
