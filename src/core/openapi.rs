use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::media::{dtos as media_dtos, handlers as media_handlers};
use crate::features::products::{
    dtos as products_dtos, handlers as products_handlers, models as products_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::get_category_by_slug,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::check_category_deletion,
        categories_handlers::delete_category,
        categories_handlers::category_overview,
        // Products
        products_handlers::list_products,
        products_handlers::get_product,
        products_handlers::create_product,
        products_handlers::update_product,
        products_handlers::delete_product,
        // Media
        media_handlers::upload_image,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Categories
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategorySummaryDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::DeletionCheckDto,
            categories_dtos::CategoryWithProductsDto,
            categories_dtos::CategoryStatisticsDto,
            categories_dtos::CategoryOverviewDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<categories_dtos::DeletionCheckDto>,
            ApiResponse<categories_dtos::CategoryOverviewDto>,
            // Products
            products_models::ProductImage,
            products_dtos::CreateProductDto,
            products_dtos::UpdateProductDto,
            products_dtos::ProductResponseDto,
            products_dtos::ProductSummaryDto,
            products_dtos::ImageCleanupDto,
            products_dtos::ProductMutationDto,
            ApiResponse<Vec<products_dtos::ProductResponseDto>>,
            ApiResponse<products_dtos::ProductResponseDto>,
            ApiResponse<products_dtos::ProductMutationDto>,
            ApiResponse<products_dtos::ImageCleanupDto>,
            // Media
            media_dtos::UploadImageDto,
            media_dtos::ImageUploadResponseDto,
            ApiResponse<media_dtos::ImageUploadResponseDto>,
        )
    ),
    tags(
        (name = "categories", description = "Catalogue categories"),
        (name = "products", description = "Catalogue products and their images"),
        (name = "media", description = "Image uploads to the media store"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Storefront Admin API",
        version = "0.1.0",
        description = "Catalogue administration for the storefront",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
