use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum_extra::TypedHeader;
use axum_extra::headers::ContentType;
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use crate::middleware::auth::CurrentUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::model::UploadResponse;
use super::service::FileService;

#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadParams {
    /// Upload kind, selects the storage subdirectory (`image` or `avatar`).
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Upload an image as the raw request body
#[utoipa::path(
    post,
    path = "/api/files/upload",
    params(UploadParams),
    request_body(content = Vec<u8>, description = "Raw image bytes", content_type = "image/jpeg"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 422, description = "Unsupported content type or file too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Files",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, content_type, body))]
pub async fn upload_file(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Query(params): Query<UploadParams>,
    content_type: Option<TypedHeader<ContentType>>,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let content_type = content_type
        .ok_or_else(|| AppError::validation(anyhow::anyhow!("Content-Type header is required")))?;
    let kind = params.kind.as_deref().unwrap_or("image");

    let stored = FileService::store(
        state.storage.as_ref(),
        kind,
        &content_type.to_string(),
        &body,
    )
    .await?;
    tracing::debug!(user_id = ctx.user_id, key = %stored.key, "Upload accepted");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: stored.url,
            key: stored.key,
        }),
    ))
}
