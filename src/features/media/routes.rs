use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::features::media::handlers::upload_image;
use crate::features::media::services::MediaService;

/// Routes for the media feature. All of them need an authenticated session.
pub fn protected_routes(service: Arc<MediaService>) -> Router {
    // Leave room for multipart overhead above the image limit
    let body_limit = service.max_size() + 1024 * 1024;

    Router::new()
        .route(
            "/api/media/images",
            post(upload_image).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(service)
}
