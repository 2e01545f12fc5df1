mod category_repository;

pub use category_repository::{
    CategoryFilter, CategoryRepository, PgCategoryRepository, DUPLICATE_CATEGORY_MESSAGE,
};
