use serde::Serialize;
use utoipa::ToSchema;

/// Response for a stored upload. `url` is what clients embed (product
/// images, avatars); `key` identifies the file inside the storage backend.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
    pub key: String,
}
