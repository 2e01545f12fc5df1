//! Remote media storage for product images

mod media_store;
mod minio_client;

pub use media_store::{image_dimensions, image_format, MediaStore, StoredMedia};
pub use minio_client::MinIOClient;
