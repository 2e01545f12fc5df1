//! Product image uploads.
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/media/images` | Yes | Upload an image (multipart field `file`) |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::MediaService;
