use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use super::image_set::ImageSet;

/// Database row for a product, images still in their stored shape
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub category_id: Uuid,
    pub image_ids: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
    pub legacy_image_id: Option<String>,
    pub legacy_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product with its image list normalized
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub category_id: Uuid,
    pub images: ImageSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            images: ImageSet::from_stored(
                row.image_ids,
                row.image_urls,
                row.legacy_image_id,
                row.legacy_image_url,
            ),
            id: row.id,
            name: row.name,
            price: row.price,
            description: row.description,
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Values for a product insert
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub category_id: Uuid,
    pub images: ImageSet,
}
