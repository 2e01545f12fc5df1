use std::sync::Arc;

use base64::prelude::*;

use crate::core::error::{AppError, Result};
use crate::modules::storage::{MediaStore, StoredMedia};
use crate::shared::constants::ALLOWED_IMAGE_TYPES;

/// Image bytes taken out of a `data:` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Validates images and hands them to the media store
pub struct MediaService {
    store: Arc<dyn MediaStore>,
    max_size: usize,
}

impl MediaService {
    pub fn new(store: Arc<dyn MediaStore>, max_size: usize) -> Self {
        Self { store, max_size }
    }

    pub fn store(&self) -> Arc<dyn MediaStore> {
        Arc::clone(&self.store)
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Reject empty, oversized or non-image payloads
    pub fn validate(&self, data: &[u8], content_type: &str) -> Result<()> {
        if data.is_empty() {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }

        if data.len() > self.max_size {
            return Err(AppError::BadRequest(format!(
                "File size exceeds maximum allowed ({} MB)",
                self.max_size / (1024 * 1024)
            )));
        }

        if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
            return Err(AppError::BadRequest(format!(
                "Invalid file type '{}'. Only JPEG, PNG, GIF and WebP images are allowed",
                content_type
            )));
        }

        Ok(())
    }

    pub async fn upload_image(&self, data: Vec<u8>, content_type: &str) -> Result<StoredMedia> {
        self.validate(&data, content_type)?;

        let stored = self.store.upload(data, content_type).await?;
        tracing::info!(
            "Uploaded image {} ({} bytes, {})",
            stored.id,
            stored.size,
            stored.format
        );
        Ok(stored)
    }

    /// Parse and validate `data:image/<type>;base64,<payload>` without uploading
    pub fn decode_data_url(&self, data_url: &str) -> Result<DecodedImage> {
        let invalid = || {
            AppError::Validation(
                "image must be a base64 data URL (data:image/<type>;base64,...)".to_string(),
            )
        };

        let rest = data_url.trim().strip_prefix("data:").ok_or_else(invalid)?;
        let (meta, payload) = rest.split_once(',').ok_or_else(invalid)?;
        let content_type = meta.strip_suffix(";base64").ok_or_else(invalid)?;

        let data = BASE64_STANDARD
            .decode(payload.trim())
            .map_err(|e| AppError::Validation(format!("image is not valid base64: {}", e)))?;

        self.validate(&data, content_type)
            .map_err(|e| match e {
                AppError::BadRequest(msg) => AppError::Validation(msg),
                other => other,
            })?;

        Ok(DecodedImage {
            content_type: content_type.to_string(),
            data,
        })
    }

    pub async fn upload_decoded(&self, image: DecodedImage) -> Result<StoredMedia> {
        self.upload_image(image.data, &image.content_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::MAX_IMAGE_SIZE;
    use crate::shared::test_helpers::FakeMediaStore;
    use tokio_test::{assert_err, assert_ok};

    fn media_service(store: FakeMediaStore) -> (MediaService, Arc<FakeMediaStore>) {
        let store = Arc::new(store);
        (MediaService::new(store.clone(), MAX_IMAGE_SIZE), store)
    }

    #[test]
    fn test_validate_rejects_unsupported_type() {
        let (service, _) = media_service(FakeMediaStore::new());
        assert_err!(service.validate(b"%PDF-1.7", "application/pdf"));
        assert_ok!(service.validate(b"GIF89a", "image/gif"));
    }

    #[test]
    fn test_validate_rejects_oversized_and_empty() {
        let (service, _) = media_service(FakeMediaStore::new());
        let too_big = vec![0u8; MAX_IMAGE_SIZE + 1];
        assert_err!(service.validate(&too_big, "image/png"));
        assert_err!(service.validate(&[], "image/png"));
    }

    #[test]
    fn test_decode_data_url() {
        let (service, _) = media_service(FakeMediaStore::new());
        let url = format!("data:image/png;base64,{}", BASE64_STANDARD.encode(b"png-bytes"));

        let decoded = service.decode_data_url(&url).unwrap();
        assert_eq!(decoded.content_type, "image/png");
        assert_eq!(decoded.data, b"png-bytes");
    }

    #[test]
    fn test_decode_data_url_rejects_malformed_input() {
        let (service, _) = media_service(FakeMediaStore::new());

        for input in [
            "https://cdn.example.com/a.png",
            "data:image/png,plain",
            "data:image/png;base64",
            "data:image/png;base64,@@@",
            "data:text/plain;base64,aGVsbG8=",
        ] {
            let err = service.decode_data_url(input).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{}", input);
        }
    }

    #[tokio::test]
    async fn test_upload_image_stores_valid_image() {
        let (service, store) = media_service(FakeMediaStore::new());

        let stored = service
            .upload_image(b"webp-bytes".to_vec(), "image/webp")
            .await
            .unwrap();

        assert_eq!(stored.format, "webp");
        assert_eq!(stored.size, 10);
        assert_eq!(store.uploads().await.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_image_skips_store_when_invalid() {
        let (service, store) = media_service(FakeMediaStore::new());

        assert_err!(service.upload_image(vec![1, 2, 3], "image/bmp").await);
        assert!(store.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_is_external_error() {
        let (service, _) = media_service(FakeMediaStore::rejecting_uploads());

        let err = service
            .upload_image(b"jpeg".to_vec(), "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }
}
