use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::storage::StoredMedia;

/// Multipart form for an image upload (documentation only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadImageDto {
    /// JPEG, PNG, GIF or WebP image, at most 5 MB
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Stored image as returned by the upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageUploadResponseDto {
    /// Media store identifier; pass back in a product's `image_ids`
    #[schema(example = "public/products/01939f3c-5b1e-7cc2-9d3e-0f7c8b9a1d2e.png")]
    pub id: String,
    pub url: String,
    #[schema(example = "png")]
    pub format: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Size in bytes
    pub size: u64,
}

impl From<StoredMedia> for ImageUploadResponseDto {
    fn from(media: StoredMedia) -> Self {
        Self {
            id: media.id,
            url: media.url,
            format: media.format,
            width: media.width,
            height: media.height,
            size: media.size,
        }
    }
}
