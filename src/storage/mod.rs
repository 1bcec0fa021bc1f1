//! Object storage for profile images.
//!
//! Registration and profile update hand image bytes to an [`ObjectStorage`]
//! collaborator and record the returned public URL plus a storage
//! reference (used to delete the old image when it is replaced).

pub mod local;
pub mod remote;

use async_trait::async_trait;
use thiserror::Error;

pub use local::LocalImageStore;
pub use remote::RemoteImageStore;

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Publicly reachable URL of the stored image
    pub url: String,
    /// Opaque reference for later deletion
    pub reference: String,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image store request failed: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store image bytes under a new name derived from `filename`'s
    /// extension, returning its public URL and storage reference.
    async fn upload(&self, data: Vec<u8>, filename: &str) -> Result<StoredImage, StorageError>;

    /// Delete a previously stored image. Missing objects are not an error.
    async fn delete(&self, reference: &str) -> Result<(), StorageError>;
}

/// Image extensions accepted for upload and public serving
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "svg", "jpg", "jpeg", "gif", "webp"];

/// Get MIME type for an image extension
pub fn mime_for_ext(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Lowercased extension of a filename, if it is an allowed image type
pub fn image_extension(filename: &str) -> Option<String> {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Some(ext)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("photo.PNG").as_deref(), Some("png"));
        assert_eq!(image_extension("a.b.jpeg").as_deref(), Some("jpeg"));
        assert!(image_extension("script.exe").is_none());
        assert!(image_extension("noext").is_none());
    }

    #[test]
    fn test_mime_for_ext() {
        assert_eq!(mime_for_ext("png"), "image/png");
        assert_eq!(mime_for_ext("zzz"), "application/octet-stream");
    }
}
