use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::products::models::{Product, ProductImage};
use crate::shared::constants::MAX_NAME_LENGTH;
use crate::shared::validation::{validate_not_blank, validate_positive_price};

/// Request DTO for creating a product
///
/// Images come either from previous uploads (`image_ids` + `image_urls`,
/// index-aligned) or from an inline `image` data URL that is uploaded first.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductDto {
    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH, message = "Name must be 1-60 characters"),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Trail Runner 2")]
    pub name: String,

    #[validate(custom(function = "validate_positive_price"))]
    #[schema(value_type = String, example = "89.90")]
    pub price: Decimal,

    #[validate(
        length(min = 1, message = "Description is required"),
        custom(function = "validate_not_blank")
    )]
    pub description: String,

    pub category_id: Uuid,

    pub image_ids: Option<Vec<String>>,

    pub image_urls: Option<Vec<String>>,

    /// `data:image/<type>;base64,<payload>`
    pub image: Option<String>,
}

/// Request DTO for updating a product
///
/// Omitted fields keep their value. When images are sent they replace the
/// stored list completely; images no longer listed are removed from the
/// media store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductDto {
    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH, message = "Name must be 1-60 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(custom(function = "validate_positive_price"))]
    #[schema(value_type = Option<String>, example = "79.90")]
    pub price: Option<Decimal>,

    #[validate(
        length(min = 1, message = "Description must not be empty"),
        custom(function = "validate_not_blank")
    )]
    pub description: Option<String>,

    pub category_id: Option<Uuid>,

    pub image_ids: Option<Vec<String>>,

    pub image_urls: Option<Vec<String>>,

    /// Replaces all current images with this one
    pub image: Option<String>,
}

/// Query params for listing products
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ProductListQuery {
    /// Only products in this category
    pub category_id: Option<Uuid>,
}

/// Response DTO for product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponseDto {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub description: String,
    pub category_id: Uuid,
    /// Absent only if the category vanished concurrently
    pub category: Option<CategorySummaryDto>,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponseDto {
    pub fn from_model(p: Product, category: Option<CategorySummaryDto>) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            description: p.description,
            category_id: p.category_id,
            category,
            images: p.images.images().to_vec(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Compact product entry used in category overviews
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductSummaryDto {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    /// First image, if any
    pub image_url: Option<String>,
}

impl From<&Product> for ProductSummaryDto {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            price: p.price,
            image_url: p.images.images().first().map(|image| image.url.clone()),
        }
    }
}

/// Outcome of removing images from the media store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageCleanupDto {
    /// Ids deleted from the media store
    pub removed: Vec<String>,
    /// Ids whose deletion failed; they remain in the media store
    pub failed: Vec<String>,
}

/// Product plus the image cleanup triggered by the request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductMutationDto {
    pub product: ProductResponseDto,
    pub image_cleanup: ImageCleanupDto,
}
