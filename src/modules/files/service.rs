use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::AppError;
use crate::utils::file_storage::{FileStorage, StorageError};

/// Upload kinds double as the top-level directory of the storage key.
const ALLOWED_KINDS: [&str; 2] = ["image", "avatar"];

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub key: String,
    pub url: String,
}

pub struct FileService;

impl FileService {
    /// Store raw bytes and return the generated key and public URL.
    ///
    /// Keys look like `image/20250825/<uuid>.png`. The name is generated
    /// server-side, so it always passes the backend's key validation and
    /// never collides with client-chosen names.
    #[instrument(skip(storage, content_type, data))]
    pub async fn store(
        storage: &dyn FileStorage,
        kind: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<StoredFile, AppError> {
        if !ALLOWED_KINDS.contains(&kind) {
            return Err(AppError::validation(anyhow::anyhow!(
                "Unknown upload kind '{}'",
                kind
            )));
        }

        // Strip media type parameters ("; charset=...") before matching.
        let media_type = match content_type.split(';').next() {
            Some(t) => t.trim().to_ascii_lowercase(),
            None => String::new(),
        };

        storage
            .check_content(&media_type, data.len())
            .map_err(storage_error)?;

        let key = format!(
            "{}/{}/{}.{}",
            kind,
            Utc::now().format("%Y%m%d"),
            Uuid::new_v4().simple(),
            extension_for(&media_type)
        );

        storage.save(&key, data).await.map_err(storage_error)?;
        let url = storage.get_url(&key).map_err(storage_error)?;

        tracing::info!(%key, "File stored");
        Ok(StoredFile { key, url })
    }
}

fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Map storage failures onto the API error taxonomy. The blanket
/// `From` conversion would bucket these as internal, which is wrong for
/// client-caused rejections.
pub(crate) fn storage_error(e: StorageError) -> AppError {
    match e {
        StorageError::FileTooLarge { .. } | StorageError::UnsupportedContentType { .. } => {
            AppError::validation(e)
        }
        StorageError::NotFound => AppError::not_found(e),
        StorageError::IoError(_) | StorageError::InvalidKey(_) => AppError::internal(e),
    }
}
