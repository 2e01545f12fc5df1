use async_trait::async_trait;
use serde::Serialize;

use crate::core::error::AppError;

/// Metadata of an object stored in the remote media store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMedia {
    /// Opaque identifier used for later deletion (the object key)
    pub id: String,
    /// Publicly reachable URL
    pub url: String,
    /// Short format name, e.g. "png"
    pub format: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Size in bytes
    pub size: u64,
}

/// Remote store for product images.
///
/// The store keeps no reference back to products; callers decide what to
/// delete and when.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `data` and return where it lives
    async fn upload(&self, data: Vec<u8>, content_type: &str) -> Result<StoredMedia, AppError>;

    /// Remove a previously uploaded object
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// File extension and format name for an accepted image MIME type
pub fn image_format(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Read pixel dimensions from the image header, if it can be parsed
pub fn image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let size = imagesize::blob_size(data).ok()?;
    Some((
        u32::try_from(size.width).ok()?,
        u32::try_from(size.height).ok()?,
    ))
}
