//! Media storage collaborator.
//!
//! Product images are handed to a media store which returns a stored-asset
//! reference URL. The disk implementation writes under an uploads
//! directory that `main` serves statically; tests use the in-memory one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Allowed image extensions, matching the upload boundary of the admin UI.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Errors that can occur storing media.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The uploaded file has no or an unsupported extension.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The uploaded file is empty.
    #[error("uploaded file is empty")]
    EmptyFile,

    /// Filesystem error writing the asset.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored-asset reference: the URL path clients use to fetch the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef(pub String);

impl MediaRef {
    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Media storage collaborator.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an uploaded image and return its reference URL.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::UnsupportedFormat` for non-image uploads,
    /// `MediaError::EmptyFile` for zero-byte uploads, and `MediaError::Io`
    /// if the backing storage fails.
    async fn store(&self, filename: &str, bytes: Vec<u8>) -> Result<MediaRef, MediaError>;
}

/// Validate the extension of an uploaded filename.
fn validated_extension(filename: &str) -> Result<String, MediaError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| MediaError::UnsupportedFormat(filename.to_owned()))?;

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(MediaError::UnsupportedFormat(filename.to_owned()));
    }
    Ok(ext)
}

/// Disk-backed media store.
///
/// Assets are written to `dir` under a random name and referenced as
/// `/uploads/<name>`.
pub struct DiskMediaStore {
    dir: PathBuf,
}

impl DiskMediaStore {
    /// Create a disk media store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, MediaError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

#[async_trait]
impl MediaStore for DiskMediaStore {
    async fn store(&self, filename: &str, bytes: Vec<u8>) -> Result<MediaRef, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::EmptyFile);
        }
        let ext = validated_extension(filename)?;

        let name = format!("{}.{ext}", uuid::Uuid::new_v4());
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(asset = %name, "stored product image");
        Ok(MediaRef(format!("/uploads/{name}")))
    }
}

/// In-memory media store for tests: remembers nothing but the names.
#[derive(Default)]
pub struct NullMediaStore;

#[async_trait]
impl MediaStore for NullMediaStore {
    async fn store(&self, filename: &str, bytes: Vec<u8>) -> Result<MediaRef, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::EmptyFile);
        }
        let ext = validated_extension(filename)?;
        Ok(MediaRef(format!("/uploads/{}.{ext}", uuid::Uuid::new_v4())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_store_accepts_images() {
        let media = NullMediaStore;
        let asset = media
            .store("photo.PNG", vec![1, 2, 3])
            .await
            .unwrap();
        assert!(asset.as_str().starts_with("/uploads/"));
        assert!(asset.as_str().ends_with(".png"));
    }

    #[tokio::test]
    async fn test_rejects_unsupported_format() {
        let media = NullMediaStore;
        let err = media.store("malware.exe", vec![1]).await.unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_rejects_empty_file() {
        let media = NullMediaStore;
        let err = media.store("photo.jpg", Vec::new()).await.unwrap_err();
        assert!(matches!(err, MediaError::EmptyFile));
    }

    #[tokio::test]
    async fn test_disk_store_writes_file() {
        let dir = std::env::temp_dir().join(format!("voltline-media-{}", uuid::Uuid::new_v4()));
        let media = DiskMediaStore::new(&dir).unwrap();

        let asset = media.store("photo.jpg", vec![0xFF, 0xD8]).await.unwrap();
        let name = asset.as_str().trim_start_matches("/uploads/");
        assert!(dir.join(name).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
