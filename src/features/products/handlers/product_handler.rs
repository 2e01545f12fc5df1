use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::products::dtos::{
    CreateProductDto, ImageCleanupDto, ProductListQuery, ProductMutationDto, ProductResponseDto,
    UpdateProductDto,
};
use crate::features::products::services::{CleanupReport, ProductService};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

fn cleanup_message(action: &str, report: &CleanupReport) -> String {
    if report.is_clean() {
        format!("Product {} successfully", action)
    } else {
        format!(
            "Product {} successfully, but {} image(s) could not be removed from the media store",
            action,
            report.failed.len()
        )
    }
}

/// List products
#[utoipa::path(
    get,
    path = "/api/products",
    params(PaginationQuery, ProductListQuery),
    responses(
        (status = 200, description = "Page of products", body = ApiResponse<Vec<ProductResponseDto>>),
    ),
    tag = "products"
)]
pub async fn list_products(
    State(service): State<Arc<ProductService>>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponseDto>>>> {
    let (products, total) = service.list(query.category_id, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(products),
        None,
        Some(Meta { total }),
    )))
}

/// Get product by id
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductResponseDto>),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn get_product(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductResponseDto>>> {
    let product = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductDto,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponseDto>),
        (status = 400, description = "Validation error or unknown category"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn create_product(
    user: AuthenticatedUser,
    State(service): State<Arc<ProductService>>,
    AppJson(dto): AppJson<CreateProductDto>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponseDto>>)> {
    let product = service.create(dto, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(product),
            Some("Product created successfully".to_string()),
            None,
        )),
    ))
}

/// Update a product
///
/// When images are sent they replace the current list; images that are no
/// longer listed are deleted from the media store.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductDto,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductMutationDto>),
        (status = 400, description = "Validation error or unknown category"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn update_product(
    user: AuthenticatedUser,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateProductDto>,
) -> Result<Json<ApiResponse<ProductMutationDto>>> {
    let (product, report) = service.update(id, dto, &user).await?;
    let message = cleanup_message("updated", &report);

    Ok(Json(ApiResponse::success(
        Some(ProductMutationDto {
            product,
            image_cleanup: report.into(),
        }),
        Some(message),
        None,
    )))
}

/// Delete a product and its images
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<ImageCleanupDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn delete_product(
    user: AuthenticatedUser,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ImageCleanupDto>>> {
    let report = service.delete(id, &user).await?;
    let message = cleanup_message("deleted", &report);

    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some(message),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::repositories::CategoryRepository;
    use crate::features::media::services::MediaService;
    use crate::features::products::models::ImageSet;
    use crate::features::products::repositories::ProductRepository;
    use crate::features::products::routes::{protected_routes, public_routes};
    use crate::shared::constants::MAX_IMAGE_SIZE;
    use crate::shared::test_helpers::{
        new_category, new_product, with_authenticated_user, FakeMediaStore, TestCatalog,
    };
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::json;

    fn server(catalog: &TestCatalog, authenticated: bool) -> TestServer {
        let media = Arc::new(MediaService::new(catalog.media.clone(), MAX_IMAGE_SIZE));
        let service = Arc::new(ProductService::new(
            catalog.products.clone(),
            catalog.categories.clone(),
            media,
        ));

        let protected = protected_routes(service.clone());
        let protected = if authenticated {
            with_authenticated_user(protected)
        } else {
            protected
        };
        TestServer::new(Router::new().merge(public_routes(service)).merge(protected)).unwrap()
    }

    #[tokio::test]
    async fn test_put_reconciles_images() {
        let catalog = TestCatalog::with_media(FakeMediaStore::failing_on(&["a"]));
        let category = catalog.categories.create(new_category("Shoes")).await.unwrap();
        let images = ImageSet::from_parallel(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["u-a".into(), "u-b".into(), "u-c".into()],
        )
        .unwrap();
        let product = catalog
            .products
            .create(new_product(category.id, images))
            .await
            .unwrap();
        let server = server(&catalog, true);

        let response = server
            .put(&format!("/api/products/{}", product.id))
            .json(&json!({
                "image_ids": ["b", "d"],
                "image_urls": ["u-b", "u-d"]
            }))
            .await;

        response.assert_status_ok();
        let body = response.json::<ApiResponse<ProductMutationDto>>();
        let data = body.data.unwrap();
        let ids: Vec<String> = data.product.images.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec!["b", "d"]);
        assert_eq!(data.image_cleanup.removed, vec!["c"]);
        assert_eq!(data.image_cleanup.failed, vec!["a"]);
        assert!(body.message.unwrap().contains("1 image(s)"));
    }

    #[tokio::test]
    async fn test_post_with_unknown_category_is_rejected() {
        let catalog = TestCatalog::new();
        let server = server(&catalog, true);

        let response = server
            .post("/api/products")
            .json(&json!({
                "name": "Trail Runner",
                "price": "89.90",
                "description": "Grippy",
                "category_id": uuid::Uuid::now_v7()
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let total = catalog
            .products
            .count(&Default::default())
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_post_rejects_zero_price() {
        let catalog = TestCatalog::new();
        let category = catalog.categories.create(new_category("Shoes")).await.unwrap();
        let server = server(&catalog, true);

        let response = server
            .post("/api/products")
            .json(&json!({
                "name": "Free Shoes",
                "price": 0,
                "description": "Too good to be true",
                "category_id": category.id
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_creates_product() {
        let catalog = TestCatalog::new();
        let category = catalog.categories.create(new_category("Shoes")).await.unwrap();
        let server = server(&catalog, true);

        let response = server
            .post("/api/products")
            .json(&json!({
                "name": "Trail Runner",
                "price": "89.90",
                "description": "Grippy",
                "category_id": category.id,
                "image_ids": ["p1"],
                "image_urls": ["https://media.test/p1"]
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let product = response
            .json::<ApiResponse<ProductResponseDto>>()
            .data
            .unwrap();
        assert_eq!(product.category_id, category.id);
        assert_eq!(product.images.len(), 1);
    }

    #[tokio::test]
    async fn test_writes_require_session() {
        let catalog = TestCatalog::new();
        let server = server(&catalog, false);

        let response = server
            .delete(&format!("/api/products/{}", uuid::Uuid::now_v7()))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_is_public_and_paginated() {
        let catalog = TestCatalog::new();
        let category = catalog.categories.create(new_category("Shoes")).await.unwrap();
        for _ in 0..3 {
            catalog
                .products
                .create(new_product(category.id, ImageSet::default()))
                .await
                .unwrap();
        }
        let server = server(&catalog, false);

        let response = server
            .get("/api/products")
            .add_query_param("page_size", 2)
            .await;

        response.assert_status_ok();
        let body = response.json::<ApiResponse<Vec<ProductResponseDto>>>();
        assert_eq!(body.data.unwrap().len(), 2);
        assert_eq!(body.meta.unwrap().total, 3);
    }

    #[tokio::test]
    async fn test_get_unknown_product() {
        let catalog = TestCatalog::new();
        let server = server(&catalog, false);

        let response = server
            .get(&format!("/api/products/{}", uuid::Uuid::now_v7()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let catalog = TestCatalog::new();
        let category = catalog.categories.create(new_category("Shoes")).await.unwrap();
        let product = catalog
            .products
            .create(new_product(category.id, ImageSet::single("a", "u-a")))
            .await
            .unwrap();
        let server = server(&catalog, true);

        let response = server
            .delete(&format!("/api/products/{}", product.id))
            .await;

        response.assert_status_ok();
        assert_eq!(catalog.media.deleted().await, vec!["a"]);
        assert!(catalog.products.find_by_id(product.id).await.unwrap().is_none());
    }
}
