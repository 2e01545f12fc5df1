mod image_reconciler;
mod product_service;

pub use image_reconciler::{reconcile_images, CleanupReport, ImageReconciler};
pub use product_service::ProductService;
