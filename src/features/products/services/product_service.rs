use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::categories::repositories::{CategoryFilter, CategoryRepository};
use crate::features::media::services::{DecodedImage, MediaService};
use crate::features::products::dtos::{CreateProductDto, ProductResponseDto, UpdateProductDto};
use crate::features::products::models::{ImageSet, NewProduct, Product};
use crate::features::products::repositories::{ProductFilter, ProductRepository};
use crate::shared::types::PaginationQuery;

use super::image_reconciler::{reconcile_images, CleanupReport, ImageReconciler};

/// Images requested by a create or update, after validation
enum ImageInput {
    Keep,
    Replace(ImageSet),
    Upload(DecodedImage),
}

/// Service for product operations
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    media: Arc<MediaService>,
    reconciler: ImageReconciler,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        media: Arc<MediaService>,
    ) -> Self {
        let reconciler = ImageReconciler::new(media.store());
        Self {
            products,
            categories,
            media,
            reconciler,
        }
    }

    /// Paginated list, newest first. Returns the page and the total count.
    pub async fn list(
        &self,
        category_id: Option<Uuid>,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ProductResponseDto>, i64)> {
        let filter = ProductFilter {
            category_id,
            limit: Some(pagination.limit()),
            offset: pagination.offset(),
        };

        let products = self.products.find_all(&filter).await?;
        let total = self.products.count(&filter).await?;

        let categories: HashMap<Uuid, CategorySummaryDto> = self
            .categories
            .find_all(CategoryFilter::default())
            .await?
            .iter()
            .map(|c| (c.id, c.into()))
            .collect();

        let items = products
            .into_iter()
            .map(|p| {
                let category = categories.get(&p.category_id).cloned();
                ProductResponseDto::from_model(p, category)
            })
            .collect();

        Ok((items, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<ProductResponseDto> {
        let product = self.find_product(id).await?;
        self.to_response(product).await
    }

    /// Create a product. Nothing is written when validation fails.
    pub async fn create(
        &self,
        dto: CreateProductDto,
        user: &AuthenticatedUser,
    ) -> Result<ProductResponseDto> {
        validate_dto(&dto)?;
        self.ensure_category_exists(dto.category_id).await?;
        let input = self.parse_image_input(dto.image_ids, dto.image_urls, dto.image)?;

        let (images, uploaded) = match input {
            ImageInput::Keep => (ImageSet::default(), None),
            ImageInput::Replace(images) => (images, None),
            ImageInput::Upload(image) => {
                let stored = self.media.upload_decoded(image).await?;
                (ImageSet::single(&stored.id, &stored.url), Some(stored.id))
            }
        };

        let new_product = NewProduct {
            name: dto.name.trim().to_string(),
            price: dto.price,
            description: dto.description,
            category_id: dto.category_id,
            images,
        };

        let product = match self.products.create(new_product).await {
            Ok(product) => product,
            Err(e) => {
                self.discard_upload(uploaded).await;
                return Err(e);
            }
        };

        tracing::info!(
            "{} created product {} ({})",
            user.label(),
            product.id,
            product.name
        );
        self.to_response(product).await
    }

    /// Apply a partial update and reconcile the image list.
    ///
    /// Everything is validated before the first image is deleted. Stale
    /// images are deleted before the record is written; deletion failures
    /// are reported, never fatal.
    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateProductDto,
        user: &AuthenticatedUser,
    ) -> Result<(ProductResponseDto, CleanupReport)> {
        validate_dto(&dto)?;
        let mut product = self.find_product(id).await?;

        if let Some(category_id) = dto.category_id {
            if category_id != product.category_id {
                self.ensure_category_exists(category_id).await?;
            }
            product.category_id = category_id;
        }
        let input = self.parse_image_input(dto.image_ids, dto.image_urls, dto.image)?;

        let mut uploaded = None;
        let incoming = match input {
            ImageInput::Keep => None,
            ImageInput::Replace(images) => Some(images),
            ImageInput::Upload(image) => {
                let stored = self.media.upload_decoded(image).await?;
                uploaded = Some(stored.id.clone());
                Some(ImageSet::single(stored.id, stored.url))
            }
        };

        let mut report = CleanupReport::default();
        if let Some(incoming) = incoming {
            let stale = reconcile_images(product.images.ids(), incoming.ids());
            if !stale.is_empty() {
                tracing::debug!("Product {} drops {} image(s)", id, stale.len());
            }
            report = self.reconciler.purge(stale).await;
            product.images = incoming;
        }

        if let Some(name) = dto.name {
            product.name = name.trim().to_string();
        }
        if let Some(price) = dto.price {
            product.price = price;
        }
        if let Some(description) = dto.description {
            product.description = description;
        }

        let persisted = self
            .products
            .update(&product)
            .await
            .and_then(|p| p.ok_or_else(|| AppError::NotFound(format!("Product {} not found", id))));
        let updated = match persisted {
            Ok(updated) => updated,
            Err(e) => {
                self.discard_upload(uploaded).await;
                return Err(e);
            }
        };

        tracing::info!("{} updated product {}", user.label(), id);
        Ok((self.to_response(updated).await?, report))
    }

    /// Delete the record, then every image it owned (best effort)
    pub async fn delete(&self, id: Uuid, user: &AuthenticatedUser) -> Result<CleanupReport> {
        let product = self.find_product(id).await?;

        if !self.products.delete(id).await? {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }
        tracing::info!("{} deleted product {}", user.label(), id);

        let owned = reconcile_images(product.images.ids(), std::iter::empty::<&str>());
        Ok(self.reconciler.purge(owned).await)
    }

    async fn find_product(&self, id: Uuid) -> Result<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    async fn ensure_category_exists(&self, category_id: Uuid) -> Result<()> {
        match self.categories.find_by_id(category_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation(format!(
                "Category {} does not exist",
                category_id
            ))),
        }
    }

    fn parse_image_input(
        &self,
        image_ids: Option<Vec<String>>,
        image_urls: Option<Vec<String>>,
        image: Option<String>,
    ) -> Result<ImageInput> {
        match (image_ids, image_urls, image) {
            (None, None, None) => Ok(ImageInput::Keep),
            (Some(ids), Some(urls), None) => Ok(ImageInput::Replace(ImageSet::from_parallel(
                ids, urls,
            )?)),
            (None, None, Some(data_url)) => {
                Ok(ImageInput::Upload(self.media.decode_data_url(&data_url)?))
            }
            (_, _, Some(_)) => Err(AppError::Validation(
                "Send either image or image_ids/image_urls, not both".to_string(),
            )),
            _ => Err(AppError::Validation(
                "image_ids and image_urls must be sent together".to_string(),
            )),
        }
    }

    async fn to_response(&self, product: Product) -> Result<ProductResponseDto> {
        let category = self
            .categories
            .find_by_id(product.category_id)
            .await?
            .map(|c| CategorySummaryDto::from(&c));
        Ok(ProductResponseDto::from_model(product, category))
    }

    /// Remove an image uploaded for a request that then failed
    async fn discard_upload(&self, uploaded: Option<String>) {
        if let Some(id) = uploaded {
            let ids = reconcile_images([id], std::iter::empty::<&str>());
            self.reconciler.purge(ids).await;
        }
    }
}

fn validate_dto(dto: &impl Validate) -> Result<()> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}
