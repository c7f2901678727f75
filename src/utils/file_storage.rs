//! Trait-based file storage so upload handling stays independent of the
//! backend (local disk today, object storage later).

use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::storage::StorageConfig;

pub trait FileStorage: Send + Sync {
    /// Persist `content` under `key` and return the storage key.
    fn save<'a>(
        &'a self,
        key: &'a str,
        content: &'a [u8],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<String, StorageError>> + Send + 'a>>;

    /// Delete a file by key. Deleting a missing file is not an error.
    fn delete<'a>(
        &'a self,
        key: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), StorageError>> + Send + 'a>>;

    /// Public URL under which `key` can be fetched.
    fn get_url(&self, key: &str) -> Result<String, StorageError>;

    /// Upper bound on accepted upload size, in bytes.
    fn max_file_size(&self) -> usize;

    /// Reject oversized or disallowed uploads before any byte is written.
    fn check_content(&self, content_type: &str, len: usize) -> Result<(), StorageError>;
}

#[derive(Debug)]
pub enum StorageError {
    FileTooLarge { max_bytes: usize },

    UnsupportedContentType {
        received: String,
        allowed: Vec<String>,
    },

    IoError(std::io::Error),

    NotFound,

    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileTooLarge { max_bytes } => {
                write!(f, "File exceeds maximum size of {} bytes", max_bytes)
            }
            Self::UnsupportedContentType { received, allowed } => {
                write!(
                    f,
                    "Content type '{}' not allowed. Allowed types: {}",
                    received,
                    allowed.join(", ")
                )
            }
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::NotFound => write!(f, "File not found"),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Files on local disk under `base_dir`, served back under `base_url`.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl LocalFileStorage {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            base_dir: config.upload_dir.clone(),
            base_url: config.public_base_url.clone(),
            max_file_size: config.max_upload_bytes,
            allowed_content_types: config.allowed_content_types.clone(),
        }
    }

    /// Directory the static file route serves from.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Keys are relative paths the server constructed itself; anything that
    /// could escape `base_dir` is rejected.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with '/'".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(
        &'a self,
        key: &'a str,
        content: &'a [u8],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<String, StorageError>> + Send + 'a>>
    {
        Box::pin(async move {
            Self::validate_key(key)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::FileTooLarge {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);

            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }

            fs::write(&file_path, content).await?;

            Ok(key.to_string())
        })
    }

    fn delete<'a>(
        &'a self,
        key: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), StorageError>> + Send + 'a>>
    {
        Box::pin(async move {
            Self::validate_key(key)?;

            let file_path = self.base_dir.join(key);

            match fs::remove_file(&file_path).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;

        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }

    fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    fn check_content(&self, content_type: &str, len: usize) -> Result<(), StorageError> {
        if len > self.max_file_size {
            return Err(StorageError::FileTooLarge {
                max_bytes: self.max_file_size,
            });
        }

        if !self
            .allowed_content_types
            .iter()
            .any(|allowed| allowed == content_type)
        {
            return Err(StorageError::UnsupportedContentType {
                received: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }
}
