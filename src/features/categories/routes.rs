use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Read-only category routes, open to everyone
pub fn public_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/categories/{id}", get(handlers::get_category))
        .route(
            "/api/categories/slug/{slug}",
            get(handlers::get_category_by_slug),
        )
        .with_state(service)
}

/// Category management routes that need an authenticated session
pub fn protected_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", post(handlers::create_category))
        .route("/api/categories/overview", get(handlers::category_overview))
        .route(
            "/api/categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/api/categories/{id}/deletion-check",
            get(handlers::check_category_deletion),
        )
        .with_state(service)
}
