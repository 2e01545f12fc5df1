use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::AppError;

/// One product image as stored in the media store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    /// Media store identifier, used for deletion
    pub id: String,
    /// Public URL
    pub url: String,
}

/// Ordered list of images owned by a product.
///
/// Persisted as two index-aligned arrays (`image_ids`, `image_urls`). Rows
/// written before multi-image support carry a single legacy id/url pair
/// instead; [`ImageSet::from_stored`] folds both shapes into this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet(Vec<ProductImage>);

impl ImageSet {
    pub fn single(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self(vec![ProductImage {
            id: id.into(),
            url: url.into(),
        }])
    }

    /// Build from request arrays. Lengths must match and ids must be non-empty.
    pub fn from_parallel(ids: Vec<String>, urls: Vec<String>) -> Result<Self, AppError> {
        if ids.len() != urls.len() {
            return Err(AppError::Validation(format!(
                "image_ids and image_urls must have the same length (got {} and {})",
                ids.len(),
                urls.len()
            )));
        }

        if ids.iter().any(|id| id.trim().is_empty()) {
            return Err(AppError::Validation(
                "image_ids must not contain empty values".to_string(),
            ));
        }

        Ok(Self(
            ids.into_iter()
                .zip(urls)
                .map(|(id, url)| ProductImage { id, url })
                .collect(),
        ))
    }

    /// Normalize whatever a stored row carries.
    ///
    /// The array columns win when they hold anything. Every stored id is kept
    /// so it can still be reconciled; ids without a url get an empty one and
    /// urls without an id are dropped.
    pub fn from_stored(
        ids: Option<Vec<String>>,
        urls: Option<Vec<String>>,
        legacy_id: Option<String>,
        legacy_url: Option<String>,
    ) -> Self {
        let ids = ids.unwrap_or_default();
        let urls = urls.unwrap_or_default();

        if !ids.is_empty() {
            if ids.len() != urls.len() {
                tracing::warn!(
                    "Stored image arrays differ in length ({} ids, {} urls), padding missing urls",
                    ids.len(),
                    urls.len()
                );
            }
            let urls = urls.into_iter().chain(std::iter::repeat_with(String::new));
            return Self(
                ids.into_iter()
                    .zip(urls)
                    .map(|(id, url)| ProductImage { id, url })
                    .collect(),
            );
        }

        match legacy_id.filter(|id| !id.is_empty()) {
            Some(id) => Self::single(id, legacy_url.unwrap_or_default()),
            None => Self::default(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|image| image.id.as_str())
    }

    pub fn images(&self) -> &[ProductImage] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into the persisted column pair
    pub fn into_parallel(self) -> (Vec<String>, Vec<String>) {
        self.0.into_iter().map(|image| (image.id, image.url)).unzip()
    }
}
