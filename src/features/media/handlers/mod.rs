mod media_handler;

pub use media_handler::{__path_upload_image, upload_image};
