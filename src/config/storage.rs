use std::env;
use std::path::PathBuf;

/// Upload storage configuration.
///
/// Uploaded files land under `upload_dir` and are served back to clients
/// at `public_base_url`, so the two must point at the same tree.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    pub allowed_content_types: Vec<String>,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));

        let public_base_url = env::var("UPLOAD_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/uploads".to_string())
            .trim_end_matches('/')
            .to_string();

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5 * 1024 * 1024); // 5 MiB

        let allowed_content_types = env::var("ALLOWED_UPLOAD_TYPES")
            .unwrap_or_else(|_| "image/jpeg,image/png,image/gif,image/webp".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            upload_dir,
            public_base_url,
            max_upload_bytes,
            allowed_content_types,
        }
    }
}
