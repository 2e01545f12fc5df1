//! In-memory collaborators for service and route tests

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::Utc;
use fake::faker::company::en::Buzzword;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::models::{Category, NewCategory};
use crate::features::categories::repositories::{
    CategoryFilter, CategoryRepository, DUPLICATE_CATEGORY_MESSAGE,
};
use crate::features::products::models::{ImageSet, NewProduct, Product};
use crate::features::products::repositories::{ProductFilter, ProductRepository};
use crate::modules::storage::{image_format, MediaStore, StoredMedia};

pub fn create_test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "test-sub".to_string(),
        session_id: Some("test-session".to_string()),
        name: Some("Test Operator".to_string()),
    }
}

async fn inject_user_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_test_user());
    next.run(request).await
}

/// Every request through `router` carries an authenticated session
pub fn with_authenticated_user(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_user_middleware))
}

pub fn new_category(name: &str) -> NewCategory {
    NewCategory {
        parent_id: None,
        name: name.to_string(),
        slug: crate::shared::validation::slugify(name),
        description: None,
        display_order: 0,
        is_active: true,
    }
}

pub fn new_product(category_id: Uuid, images: ImageSet) -> NewProduct {
    NewProduct {
        name: Buzzword().fake::<String>(),
        price: Decimal::new(1999, 2),
        description: Sentence(3..8).fake(),
        category_id,
        images,
    }
}

// =============================================================================
// CATEGORY REPOSITORY
// =============================================================================

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    rows: Mutex<Vec<Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
}

fn ensure_unique(rows: &[Category], candidate: &Category) -> Result<()> {
    let taken = rows.iter().any(|c| {
        c.id != candidate.id && (c.name == candidate.name || c.slug == candidate.slug)
    });
    if taken {
        return Err(AppError::Validation(DUPLICATE_CATEGORY_MESSAGE.to_string()));
    }
    Ok(())
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self.rows.lock().await.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn find_all(&self, filter: CategoryFilter) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|c| !filter.active_only || c.is_active)
            .cloned()
            .collect();
        categories.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(categories)
    }

    async fn create(&self, category: NewCategory) -> Result<Category> {
        let mut rows = self.rows.lock().await;
        if let Some(parent_id) = category.parent_id {
            if !rows.iter().any(|c| c.id == parent_id) {
                return Err(AppError::Validation(
                    "Parent category does not exist".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let created = Category {
            id: Uuid::now_v7(),
            parent_id: category.parent_id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            display_order: category.display_order,
            is_active: category.is_active,
            created_at: now,
            updated_at: now,
        };
        ensure_unique(&rows, &created)?;
        rows.push(created.clone());
        Ok(created)
    }

    async fn update(&self, category: &Category) -> Result<Option<Category>> {
        let mut rows = self.rows.lock().await;
        ensure_unique(&rows, category)?;

        let Some(row) = rows.iter_mut().find(|c| c.id == category.id) else {
            return Ok(None);
        };
        *row = Category {
            updated_at: Utc::now(),
            created_at: row.created_at,
            ..category.clone()
        };
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|c| c.id != id);

        // Same as ON DELETE SET NULL on parent_id
        for child in rows.iter_mut().filter(|c| c.parent_id == Some(id)) {
            child.parent_id = None;
        }
        Ok(rows.len() < before)
    }
}

// =============================================================================
// PRODUCT REPOSITORY
// =============================================================================

#[derive(Default)]
pub struct InMemoryProductRepository {
    rows: Mutex<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a product as-is, e.g. one still carrying a legacy image
    pub async fn insert(&self, product: Product) {
        self.rows.lock().await.push(product);
    }
}

fn matches(filter: &ProductFilter, product: &Product) -> bool {
    filter.category_id.is_none() || filter.category_id == Some(product.category_id)
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.rows.lock().await.iter().find(|p| p.id == id).cloned())
    }

    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let rows = self.rows.lock().await;
        let limit = filter.limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(rows
            .iter()
            .rev()
            .filter(|p| matches(filter, p))
            .skip(filter.offset.max(0) as usize)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|p| matches(filter, p)).count() as i64)
    }

    async fn count_per_category(&self) -> Result<HashMap<Uuid, i64>> {
        let mut counts = HashMap::new();
        for product in self.rows.lock().await.iter() {
            *counts.entry(product.category_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn create(&self, product: NewProduct) -> Result<Product> {
        let now = Utc::now();
        let created = Product {
            id: Uuid::now_v7(),
            name: product.name,
            price: product.price,
            description: product.description,
            category_id: product.category_id,
            images: product.images,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().await.push(created.clone());
        Ok(created)
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>> {
        let mut rows = self.rows.lock().await;
        let Some(row) = rows.iter_mut().find(|p| p.id == product.id) else {
            return Ok(None);
        };
        *row = Product {
            updated_at: Utc::now(),
            created_at: row.created_at,
            ..product.clone()
        };
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() < before)
    }
}

// =============================================================================
// MEDIA STORE
// =============================================================================

/// Records uploads and deletions; selected ids can be made to fail
#[derive(Default)]
pub struct FakeMediaStore {
    failing_ids: HashSet<String>,
    fail_uploads: bool,
    uploads: Mutex<Vec<StoredMedia>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deleting any of `ids` returns an error
    pub fn failing_on(ids: &[&str]) -> Self {
        Self {
            failing_ids: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn rejecting_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub async fn uploads(&self) -> Vec<StoredMedia> {
        self.uploads.lock().await.clone()
    }

    /// Successfully deleted ids, sorted
    pub async fn deleted(&self) -> Vec<String> {
        let mut deleted = self.deleted.lock().await.clone();
        deleted.sort();
        deleted
    }
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn upload(&self, data: Vec<u8>, content_type: &str) -> Result<StoredMedia> {
        if self.fail_uploads {
            return Err(AppError::ExternalServiceError(
                "media store unavailable".to_string(),
            ));
        }

        let format = image_format(content_type).unwrap_or("bin");
        let id = format!("test/{}.{}", Uuid::now_v7(), format);
        let stored = StoredMedia {
            url: format!("https://media.test/{}", id),
            id,
            format: format.to_string(),
            width: None,
            height: None,
            size: data.len() as u64,
        };
        self.uploads.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.failing_ids.contains(id) {
            return Err(AppError::ExternalServiceError(format!(
                "cannot delete {}",
                id
            )));
        }
        self.deleted.lock().await.push(id.to_string());
        Ok(())
    }
}

/// Shared handles for a fully in-memory catalogue
pub struct TestCatalog {
    pub categories: Arc<InMemoryCategoryRepository>,
    pub products: Arc<InMemoryProductRepository>,
    pub media: Arc<FakeMediaStore>,
}

impl TestCatalog {
    pub fn new() -> Self {
        Self::with_media(FakeMediaStore::new())
    }

    pub fn with_media(media: FakeMediaStore) -> Self {
        Self {
            categories: Arc::new(InMemoryCategoryRepository::new()),
            products: Arc::new(InMemoryProductRepository::new()),
            media: Arc::new(media),
        }
    }
}
