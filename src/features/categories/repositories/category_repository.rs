use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{
    pg_error_code, AppError, Result, PG_FOREIGN_KEY_VIOLATION, PG_UNIQUE_VIOLATION,
};
use crate::features::categories::models::{Category, NewCategory};

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryFilter {
    pub active_only: bool,
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// Ordered by display order, then name
    async fn find_all(&self, filter: CategoryFilter) -> Result<Vec<Category>>;

    async fn create(&self, category: NewCategory) -> Result<Category>;

    /// Overwrite all mutable columns. `None` when the row no longer exists.
    async fn update(&self, category: &Category) -> Result<Option<Category>>;

    /// Returns false when nothing was deleted. Children of the deleted
    /// category become roots.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

const CATEGORY_COLUMNS: &str =
    "id, parent_id, name, slug, description, display_order, is_active, created_at, updated_at";

/// Message for a name or slug that is already taken
pub const DUPLICATE_CATEGORY_MESSAGE: &str = "A category with this name or slug already exists";

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(e: sqlx::Error) -> AppError {
    match pg_error_code(&e).as_deref() {
        Some(PG_UNIQUE_VIOLATION) => AppError::Validation(DUPLICATE_CATEGORY_MESSAGE.to_string()),
        Some(PG_FOREIGN_KEY_VIOLATION) => {
            AppError::Validation("Parent category does not exist".to_string())
        }
        _ => {
            tracing::error!("Failed to write category: {:?}", e);
            AppError::Database(e)
        }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE slug = $1",
            CATEGORY_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn find_all(&self, filter: CategoryFilter) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {}
            FROM categories
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY display_order, name
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(filter.active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(categories)
    }

    async fn create(&self, category: NewCategory) -> Result<Category> {
        let created = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (id, parent_id, name, slug, description, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(category.parent_id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.display_order)
        .bind(category.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(created)
    }

    async fn update(&self, category: &Category) -> Result<Option<Category>> {
        let updated = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET parent_id = $2,
                name = $3,
                slug = $4,
                description = $5,
                display_order = $6,
                is_active = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(category.id)
        .bind(category.parent_id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.display_order)
        .bind(category.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // products.category_id is ON DELETE RESTRICT; only reachable
                // when a product is inserted between the guard and the delete
                if pg_error_code(&e).as_deref() == Some(PG_FOREIGN_KEY_VIOLATION) {
                    AppError::Conflict(
                        "Category gained products while being deleted".to_string(),
                    )
                } else {
                    AppError::Database(e)
                }
            })?;

        Ok(result.rows_affected() > 0)
    }
}
