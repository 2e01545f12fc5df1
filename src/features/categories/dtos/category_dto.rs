use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::features::products::dtos::ProductSummaryDto;
use crate::shared::constants::{MAX_CATEGORY_DESCRIPTION_LENGTH, MAX_NAME_LENGTH};
use crate::shared::serde_helpers::double_option;

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Name must be 1-60 characters"))]
    #[schema(example = "Running Shoes")]
    pub name: String,

    /// Derived from the name when omitted
    #[schema(example = "running-shoes")]
    pub slug: Option<String>,

    #[validate(length(max = MAX_CATEGORY_DESCRIPTION_LENGTH, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,

    pub display_order: Option<i32>,

    /// Defaults to true
    pub is_active: Option<bool>,

    pub parent_id: Option<Uuid>,
}

/// Request DTO for a partial category update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Name must be 1-60 characters"))]
    pub name: Option<String>,

    /// Re-derived from the new name when the name changes and no slug is sent
    pub slug: Option<String>,

    /// `null` clears the description
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = MAX_CATEGORY_DESCRIPTION_LENGTH, message = "Description must not exceed 500 characters"))]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    pub display_order: Option<i32>,

    pub is_active: Option<bool>,

    /// `null` moves the category to the top level
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    /// Number of products assigned to this category
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryResponseDto {
    pub fn from_model(c: Category, product_count: i64) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            display_order: c.display_order,
            is_active: c.is_active,
            product_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Category reference embedded in product responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategorySummaryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategorySummaryDto {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            slug: c.slug.clone(),
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub product_count: i64,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Build tree from a flat, already ordered list of categories.
    ///
    /// Categories whose parent is not in the list are shown at the top level.
    pub fn build_tree(categories: Vec<Category>, counts: &HashMap<Uuid, i64>) -> Vec<Self> {
        let ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();

        categories
            .iter()
            .filter(|c| c.parent_id.map_or(true, |parent_id| !ids.contains(&parent_id)))
            .map(|root| Self::build_node(root, &categories, counts))
            .collect()
    }

    fn build_node(category: &Category, all: &[Category], counts: &HashMap<Uuid, i64>) -> Self {
        let children = all
            .iter()
            .filter(|c| c.parent_id == Some(category.id))
            .map(|child| Self::build_node(child, all, counts))
            .collect();

        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            display_order: category.display_order,
            is_active: category.is_active,
            product_count: counts.get(&category.id).copied().unwrap_or(0),
            children,
        }
    }
}

/// Result of the pre-delete reference check
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletionCheckDto {
    pub category_id: Uuid,
    /// True when no product references the category
    pub allowed: bool,
    /// Number of products that block deletion
    pub blocking_count: i64,
}

/// A category with the products assigned to it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryWithProductsDto {
    #[serde(flatten)]
    pub category: CategoryResponseDto,
    pub products: Vec<ProductSummaryDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryStatisticsDto {
    pub total_categories: i64,
    pub total_products: i64,
    pub categories_with_products: i64,
    pub empty_categories: i64,
    /// Rounded to two decimals
    pub average_products_per_category: f64,
}

impl CategoryStatisticsDto {
    pub fn from_counts(product_counts: &[i64]) -> Self {
        let total_categories = product_counts.len() as i64;
        let total_products: i64 = product_counts.iter().sum();
        let categories_with_products = product_counts.iter().filter(|&&n| n > 0).count() as i64;

        let average = if total_categories == 0 {
            0.0
        } else {
            (total_products as f64 / total_categories as f64 * 100.0).round() / 100.0
        };

        Self {
            total_categories,
            total_products,
            categories_with_products,
            empty_categories: total_categories - categories_with_products,
            average_products_per_category: average,
        }
    }
}

/// Products grouped by category, with catalogue statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryOverviewDto {
    pub categories: Vec<CategoryWithProductsDto>,
    pub statistics: CategoryStatisticsDto,
}
