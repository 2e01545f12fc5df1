mod image_set;
mod product;

pub use image_set::{ImageSet, ProductImage};
pub use product::{NewProduct, Product, ProductRow};
