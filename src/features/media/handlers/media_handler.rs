use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::media::dtos::{ImageUploadResponseDto, UploadImageDto};
use crate::features::media::services::MediaService;
use crate::shared::types::ApiResponse;

/// Upload a product image
///
/// Accepts multipart/form-data with a single `file` field. The image is stored
/// but not attached to any product; send the returned `id` and `url` in a
/// product create or update request.
#[utoipa::path(
    post,
    path = "/api/media/images",
    tag = "media",
    request_body(
        content = UploadImageDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Image uploaded", body = ApiResponse<ImageUploadResponseDto>),
        (status = 400, description = "Missing, oversized or unsupported file"),
        (status = 401, description = "Authentication required"),
        (status = 502, description = "Media store unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_image(
    user: AuthenticatedUser,
    State(service): State<Arc<MediaService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ImageUploadResponseDto>>), AppError> {
    let mut file: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some("file") {
            debug!("Ignoring unknown field: {:?}", field.name());
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        file = Some((data.to_vec(), content_type));
    }

    let (data, content_type) =
        file.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let stored = service.upload_image(data, &content_type).await?;
    tracing::info!("{} uploaded image {}", user.label(), stored.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(stored.into()),
            Some("Image uploaded successfully".to_string()),
            None,
        )),
    ))
}
