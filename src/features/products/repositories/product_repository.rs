use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{pg_error_code, AppError, Result, PG_FOREIGN_KEY_VIOLATION};
use crate::features::products::models::{NewProduct, Product, ProductRow};

/// Selection and paging for product queries
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    /// `None` returns every matching row
    pub limit: Option<i64>,
    pub offset: i64,
}

impl ProductFilter {
    pub fn in_category(category_id: Uuid) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>>;

    /// Newest first
    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>>;

    /// Number of products matching the filter, paging ignored
    async fn count(&self, filter: &ProductFilter) -> Result<i64>;

    /// Product count keyed by category id; categories without products are absent
    async fn count_per_category(&self) -> Result<HashMap<Uuid, i64>>;

    async fn create(&self, product: NewProduct) -> Result<Product>;

    /// Overwrite all mutable columns. `None` when the row no longer exists.
    async fn update(&self, product: &Product) -> Result<Option<Product>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

const PRODUCT_COLUMNS: &str = "id, name, price, description, category_id, image_ids, image_urls, \
                               legacy_image_id, legacy_image_url, created_at, updated_at";

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(e: sqlx::Error) -> AppError {
    if pg_error_code(&e).as_deref() == Some(PG_FOREIGN_KEY_VIOLATION) {
        return AppError::Validation("Category does not exist".to_string());
    }
    tracing::error!("Failed to write product: {:?}", e);
    AppError::Database(e)
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {}
            FROM products
            WHERE ($1::uuid IS NULL OR category_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(filter.category_id)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list products: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE ($1::uuid IS NULL OR category_id = $1)",
        )
        .bind(filter.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_per_category(&self) -> Result<HashMap<Uuid, i64>> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT category_id, COUNT(*) FROM products GROUP BY category_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn create(&self, product: NewProduct) -> Result<Product> {
        let (image_ids, image_urls) = product.images.into_parallel();

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (id, name, price, description, category_id, image_ids, image_urls)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(&image_ids)
        .bind(&image_urls)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.into())
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>> {
        let (image_ids, image_urls) = product.images.clone().into_parallel();

        // Writing the arrays retires the legacy single-image columns
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $2,
                price = $3,
                description = $4,
                category_id = $5,
                image_ids = $6,
                image_urls = $7,
                legacy_image_id = NULL,
                legacy_image_url = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(&image_ids)
        .bind(&image_urls)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
