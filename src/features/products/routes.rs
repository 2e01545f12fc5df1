use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::products::handlers;
use crate::features::products::services::ProductService;

/// Read-only product routes, open to everyone
pub fn public_routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route("/api/products", get(handlers::list_products))
        .route("/api/products/{id}", get(handlers::get_product))
        .with_state(service)
}

/// Product routes that need an authenticated session
pub fn protected_routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route("/api/products", post(handlers::create_product))
        .route(
            "/api/products/{id}",
            put(handlers::update_product).delete(handlers::delete_product),
        )
        .with_state(service)
}
