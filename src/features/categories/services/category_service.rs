use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::dtos::{
    CategoryOverviewDto, CategoryResponseDto, CategoryStatisticsDto, CategoryTreeDto,
    CategoryWithProductsDto, CreateCategoryDto, DeletionCheckDto, UpdateCategoryDto,
};
use crate::features::categories::models::{Category, NewCategory};
use crate::features::categories::repositories::{CategoryFilter, CategoryRepository};
use crate::features::products::dtos::ProductSummaryDto;
use crate::features::products::repositories::{ProductFilter, ProductRepository};
use crate::shared::validation::{slugify, SLUG_REGEX};

/// Whether a category may be deleted right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionCheck {
    pub allowed: bool,
    /// Products still assigned to the category
    pub blocking_count: i64,
}

/// Service for category operations
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CategoryService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            categories,
            products,
        }
    }

    /// Flat list ordered by display order and name, with product counts
    pub async fn list(&self, active_only: bool) -> Result<Vec<CategoryResponseDto>> {
        let categories = self
            .categories
            .find_all(CategoryFilter { active_only })
            .await?;
        let counts = self.products.count_per_category().await?;

        Ok(categories
            .into_iter()
            .map(|c| {
                let count = counts.get(&c.id).copied().unwrap_or(0);
                CategoryResponseDto::from_model(c, count)
            })
            .collect())
    }

    pub async fn list_tree(&self, active_only: bool) -> Result<Vec<CategoryTreeDto>> {
        let categories = self
            .categories
            .find_all(CategoryFilter { active_only })
            .await?;
        let counts = self.products.count_per_category().await?;

        Ok(CategoryTreeDto::build_tree(categories, &counts))
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryResponseDto> {
        let category = self.find_category(id).await?;
        self.with_count(category).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))?;
        self.with_count(category).await
    }

    pub async fn create(
        &self,
        dto: CreateCategoryDto,
        user: &AuthenticatedUser,
    ) -> Result<CategoryResponseDto> {
        let name = normalize_name(&dto.name)?;
        let slug = resolve_slug(dto.slug.as_deref(), &name)?;

        if let Some(parent_id) = dto.parent_id {
            self.ensure_parent_exists(parent_id).await?;
        }

        let category = self
            .categories
            .create(NewCategory {
                parent_id: dto.parent_id,
                name,
                slug,
                description: dto.description,
                display_order: dto.display_order.unwrap_or(0),
                is_active: dto.is_active.unwrap_or(true),
            })
            .await?;

        tracing::info!(
            "{} created category {} ({})",
            user.label(),
            category.id,
            category.slug
        );
        Ok(CategoryResponseDto::from_model(category, 0))
    }

    /// Partial update. A new name without an explicit slug re-derives the slug.
    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateCategoryDto,
        user: &AuthenticatedUser,
    ) -> Result<CategoryResponseDto> {
        let mut category = self.find_category(id).await?;

        if let Some(name) = dto.name.as_deref() {
            let name = normalize_name(name)?;
            if dto.slug.is_none() && name != category.name {
                category.slug = resolve_slug(None, &name)?;
            }
            category.name = name;
        }
        if let Some(slug) = dto.slug.as_deref() {
            category.slug = resolve_slug(Some(slug), &category.name)?;
        }
        if let Some(description) = dto.description {
            category.description = description;
        }
        if let Some(display_order) = dto.display_order {
            category.display_order = display_order;
        }
        if let Some(is_active) = dto.is_active {
            category.is_active = is_active;
        }
        if let Some(parent_id) = dto.parent_id {
            if let Some(parent_id) = parent_id {
                self.ensure_valid_parent(id, parent_id).await?;
            }
            category.parent_id = parent_id;
        }

        let updated = self
            .categories
            .update(&category)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        tracing::info!("{} updated category {}", user.label(), id);
        self.with_count(updated).await
    }

    /// Count the products that reference the category
    pub async fn check_deletion(&self, id: Uuid) -> Result<DeletionCheck> {
        self.find_category(id).await?;

        let blocking_count = self
            .products
            .count(&ProductFilter::in_category(id))
            .await?;

        Ok(DeletionCheck {
            allowed: blocking_count == 0,
            blocking_count,
        })
    }

    /// Delete a category that no product references.
    ///
    /// Sub-categories are kept and move to the top level.
    pub async fn delete(&self, id: Uuid, user: &AuthenticatedUser) -> Result<()> {
        let check = self.check_deletion(id).await?;
        if !check.allowed {
            tracing::info!(
                "{} tried to delete category {} still holding {} product(s)",
                user.label(),
                id,
                check.blocking_count
            );
            return Err(AppError::CategoryInUse {
                category_id: id,
                blocking_count: check.blocking_count,
            });
        }

        if !self.categories.delete(id).await? {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        tracing::info!("{} deleted category {}", user.label(), id);
        Ok(())
    }

    /// Every category with its products, plus catalogue statistics
    pub async fn overview(&self) -> Result<CategoryOverviewDto> {
        let categories = self.categories.find_all(CategoryFilter::default()).await?;
        let products = self.products.find_all(&ProductFilter::default()).await?;

        let mut grouped: HashMap<Uuid, Vec<ProductSummaryDto>> = HashMap::new();
        for product in &products {
            grouped
                .entry(product.category_id)
                .or_default()
                .push(product.into());
        }

        let categories: Vec<CategoryWithProductsDto> = categories
            .into_iter()
            .map(|c| {
                let products = grouped.remove(&c.id).unwrap_or_default();
                CategoryWithProductsDto {
                    category: CategoryResponseDto::from_model(c, products.len() as i64),
                    products,
                }
            })
            .collect();

        let counts: Vec<i64> = categories
            .iter()
            .map(|c| c.category.product_count)
            .collect();

        Ok(CategoryOverviewDto {
            statistics: CategoryStatisticsDto::from_counts(&counts),
            categories,
        })
    }

    async fn find_category(&self, id: Uuid) -> Result<Category> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    async fn with_count(&self, category: Category) -> Result<CategoryResponseDto> {
        let count = self
            .products
            .count(&ProductFilter::in_category(category.id))
            .await?;
        Ok(CategoryResponseDto::from_model(category, count))
    }

    async fn ensure_parent_exists(&self, parent_id: Uuid) -> Result<Category> {
        self.categories
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::Validation("Parent category does not exist".to_string()))
    }

    /// The parent must exist and must not be the category or one of its descendants
    async fn ensure_valid_parent(&self, id: Uuid, parent_id: Uuid) -> Result<()> {
        if parent_id == id {
            return Err(AppError::Validation(
                "A category cannot be its own parent".to_string(),
            ));
        }

        let mut visited = HashSet::from([parent_id]);
        let mut ancestor = self.ensure_parent_exists(parent_id).await?.parent_id;
        while let Some(ancestor_id) = ancestor {
            if ancestor_id == id {
                return Err(AppError::Validation(
                    "A category cannot be moved below one of its own sub-categories".to_string(),
                ));
            }
            if !visited.insert(ancestor_id) {
                tracing::warn!("Category hierarchy above {} contains a cycle", parent_id);
                return Err(AppError::Validation(
                    "Parent category hierarchy contains a cycle".to_string(),
                ));
            }
            ancestor = self
                .categories
                .find_by_id(ancestor_id)
                .await?
                .and_then(|c| c.parent_id);
        }

        Ok(())
    }
}

impl From<(Uuid, DeletionCheck)> for DeletionCheckDto {
    fn from((category_id, check): (Uuid, DeletionCheck)) -> Self {
        Self {
            category_id,
            allowed: check.allowed,
            blocking_count: check.blocking_count,
        }
    }
}

fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name must not be blank".to_string()));
    }
    Ok(name.to_string())
}

/// Use the provided slug (lowercased) or derive one from the name
fn resolve_slug(provided: Option<&str>, name: &str) -> Result<String> {
    let slug = match provided {
        Some(slug) => slug.trim().to_lowercase(),
        None => slugify(name),
    };

    if slug.is_empty() {
        return Err(AppError::Validation(
            "Slug cannot be derived from the name; provide one explicitly".to_string(),
        ));
    }
    if !SLUG_REGEX.is_match(&slug) {
        return Err(AppError::Validation(format!(
            "Invalid slug '{}'. Use lowercase letters, digits and single hyphens",
            slug
        )));
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::products::models::ImageSet;
    use crate::shared::test_helpers::{create_test_user, new_category, new_product, TestCatalog};
    use tokio_test::{assert_err, assert_ok};

    fn service(catalog: &TestCatalog) -> CategoryService {
        CategoryService::new(catalog.categories.clone(), catalog.products.clone())
    }

    fn create_dto(name: &str) -> CreateCategoryDto {
        CreateCategoryDto {
            name: name.to_string(),
            slug: None,
            description: None,
            display_order: None,
            is_active: None,
            parent_id: None,
        }
    }

    async fn add_products(catalog: &TestCatalog, category_id: Uuid, n: usize) {
        for _ in 0..n {
            catalog
                .products
                .create(new_product(category_id, ImageSet::default()))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_delete_empty_category() {
        let catalog = TestCatalog::new();
        let category = catalog.categories.create(new_category("Empty")).await.unwrap();
        let service = service(&catalog);

        let check = service.check_deletion(category.id).await.unwrap();
        assert_eq!(
            check,
            DeletionCheck {
                allowed: true,
                blocking_count: 0
            }
        );

        assert_ok!(service.delete(category.id, &create_test_user()).await);
        assert!(catalog.categories.find_by_id(category.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_products() {
        let catalog = TestCatalog::new();
        let category = catalog.categories.create(new_category("Busy")).await.unwrap();
        add_products(&catalog, category.id, 3).await;
        let service = service(&catalog);

        let err = service
            .delete(category.id, &create_test_user())
            .await
            .unwrap_err();

        match err {
            AppError::CategoryInUse {
                category_id,
                blocking_count,
            } => {
                assert_eq!(category_id, category.id);
                assert_eq!(blocking_count, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(catalog.categories.find_by_id(category.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_check_deletion_counts_only_own_products() {
        let catalog = TestCatalog::new();
        let shoes = catalog.categories.create(new_category("Shoes")).await.unwrap();
        let hats = catalog.categories.create(new_category("Hats")).await.unwrap();
        add_products(&catalog, shoes.id, 2).await;
        add_products(&catalog, hats.id, 1).await;

        let check = service(&catalog).check_deletion(shoes.id).await.unwrap();
        assert!(!check.allowed);
        assert_eq!(check.blocking_count, 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_category_is_not_found() {
        let catalog = TestCatalog::new();
        let service = service(&catalog);

        let err = service.check_deletion(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service
            .delete(Uuid::now_v7(), &create_test_user())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_parent_promotes_children() {
        let catalog = TestCatalog::new();
        let parent = catalog.categories.create(new_category("Outdoor")).await.unwrap();
        let child = catalog
            .categories
            .create(NewCategory {
                parent_id: Some(parent.id),
                ..new_category("Camping")
            })
            .await
            .unwrap();

        assert_ok!(service(&catalog).delete(parent.id, &create_test_user()).await);

        let child = catalog.categories.find_by_id(child.id).await.unwrap().unwrap();
        assert_eq!(child.parent_id, None);
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let catalog = TestCatalog::new();

        let created = service(&catalog)
            .create(create_dto("  Ski & Snowboard "), &create_test_user())
            .await
            .unwrap();

        assert_eq!(created.name, "Ski & Snowboard");
        assert_eq!(created.slug, "ski-snowboard");
        assert!(created.is_active);
        assert_eq!(created.product_count, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_slug() {
        let catalog = TestCatalog::new();
        let dto = CreateCategoryDto {
            slug: Some("not a slug".to_string()),
            ..create_dto("Tennis")
        };

        assert_err!(service(&catalog).create(dto, &create_test_user()).await);
        assert_eq!(catalog.categories.len().await, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_name_without_alphanumerics() {
        let catalog = TestCatalog::new();
        let err = service(&catalog)
            .create(create_dto("!!!"), &create_test_user())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_duplicate_name_is_validation_error() {
        let catalog = TestCatalog::new();
        let service = service(&catalog);
        let user = create_test_user();

        service.create(create_dto("Tennis"), &user).await.unwrap();
        let err = service.create(create_dto("Tennis"), &user).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_with_unknown_parent() {
        let catalog = TestCatalog::new();
        let dto = CreateCategoryDto {
            parent_id: Some(Uuid::now_v7()),
            ..create_dto("Orphan")
        };

        let err = service(&catalog)
            .create(dto, &create_test_user())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_rename_rederives_slug() {
        let catalog = TestCatalog::new();
        let category = catalog.categories.create(new_category("Tennis")).await.unwrap();
        let dto = UpdateCategoryDto {
            name: Some("Tennis Rackets".to_string()),
            ..Default::default()
        };

        let updated = service(&catalog)
            .update(category.id, dto, &create_test_user())
            .await
            .unwrap();

        assert_eq!(updated.slug, "tennis-rackets");
    }

    #[tokio::test]
    async fn test_update_keeps_explicit_slug() {
        let catalog = TestCatalog::new();
        let category = catalog.categories.create(new_category("Tennis")).await.unwrap();
        let dto = UpdateCategoryDto {
            name: Some("Tennis Rackets".to_string()),
            slug: Some("Rackets".to_string()),
            ..Default::default()
        };

        let updated = service(&catalog)
            .update(category.id, dto, &create_test_user())
            .await
            .unwrap();

        assert_eq!(updated.slug, "rackets");
    }

    #[tokio::test]
    async fn test_update_rejects_cycles() {
        let catalog = TestCatalog::new();
        let root = catalog.categories.create(new_category("Root")).await.unwrap();
        let child = catalog
            .categories
            .create(NewCategory {
                parent_id: Some(root.id),
                ..new_category("Child")
            })
            .await
            .unwrap();
        let service = service(&catalog);
        let user = create_test_user();

        let own_parent = UpdateCategoryDto {
            parent_id: Some(Some(root.id)),
            ..Default::default()
        };
        assert_err!(service.update(root.id, own_parent, &user).await);

        let below_child = UpdateCategoryDto {
            parent_id: Some(Some(child.id)),
            ..Default::default()
        };
        let err = service.update(root.id, below_child, &user).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_stops_on_existing_cycle() {
        let catalog = TestCatalog::new();
        let a = catalog.categories.create(new_category("A")).await.unwrap();
        let b = catalog
            .categories
            .create(NewCategory {
                parent_id: Some(a.id),
                ..new_category("B")
            })
            .await
            .unwrap();
        // Corrupt data: A and B are each other's parent
        catalog
            .categories
            .update(&Category {
                parent_id: Some(b.id),
                ..a.clone()
            })
            .await
            .unwrap();
        let c = catalog.categories.create(new_category("C")).await.unwrap();

        let dto = UpdateCategoryDto {
            parent_id: Some(Some(a.id)),
            ..Default::default()
        };
        let err = service(&catalog)
            .update(c.id, dto, &create_test_user())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        let stored = catalog.categories.find_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(stored.parent_id, None);
    }

    #[tokio::test]
    async fn test_update_clears_parent() {
        let catalog = TestCatalog::new();
        let root = catalog.categories.create(new_category("Root")).await.unwrap();
        let child = catalog
            .categories
            .create(NewCategory {
                parent_id: Some(root.id),
                ..new_category("Child")
            })
            .await
            .unwrap();
        let dto = UpdateCategoryDto {
            parent_id: Some(None),
            ..Default::default()
        };

        let updated = service(&catalog)
            .update(child.id, dto, &create_test_user())
            .await
            .unwrap();
        assert_eq!(updated.parent_id, None);
    }

    #[tokio::test]
    async fn test_list_includes_product_counts() {
        let catalog = TestCatalog::new();
        let shoes = catalog.categories.create(new_category("Shoes")).await.unwrap();
        catalog.categories.create(new_category("Hats")).await.unwrap();
        add_products(&catalog, shoes.id, 2).await;

        let listed = service(&catalog).list(false).await.unwrap();

        let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Hats", "Shoes"]);
        assert_eq!(listed[0].product_count, 0);
        assert_eq!(listed[1].product_count, 2);
    }

    #[tokio::test]
    async fn test_list_active_only() {
        let catalog = TestCatalog::new();
        catalog.categories.create(new_category("Shown")).await.unwrap();
        catalog
            .categories
            .create(NewCategory {
                is_active: false,
                ..new_category("Hidden")
            })
            .await
            .unwrap();

        let listed = service(&catalog).list(true).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Shown");
    }

    #[tokio::test]
    async fn test_overview_groups_products() {
        let catalog = TestCatalog::new();
        let shoes = catalog.categories.create(new_category("Shoes")).await.unwrap();
        catalog.categories.create(new_category("Hats")).await.unwrap();
        catalog.categories.create(new_category("Socks")).await.unwrap();
        add_products(&catalog, shoes.id, 2).await;

        let overview = service(&catalog).overview().await.unwrap();

        let shoes_entry = overview
            .categories
            .iter()
            .find(|c| c.category.id == shoes.id)
            .unwrap();
        assert_eq!(shoes_entry.products.len(), 2);
        assert_eq!(overview.statistics.total_categories, 3);
        assert_eq!(overview.statistics.total_products, 2);
        assert_eq!(overview.statistics.categories_with_products, 1);
        assert_eq!(overview.statistics.empty_categories, 2);
        assert_eq!(overview.statistics.average_products_per_category, 0.67);
    }

    #[test]
    fn test_resolve_slug() {
        assert_eq!(resolve_slug(None, "Running Shoes").unwrap(), "running-shoes");
        assert_eq!(resolve_slug(Some(" Trail-Running "), "x").unwrap(), "trail-running");
        assert!(resolve_slug(Some("trail--running"), "x").is_err());
        assert!(resolve_slug(None, "???").is_err());
    }
}
