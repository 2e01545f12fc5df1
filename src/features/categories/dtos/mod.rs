mod category_dto;

pub use category_dto::{
    CategoryOverviewDto, CategoryResponseDto, CategoryStatisticsDto, CategorySummaryDto,
    CategoryTreeDto, CategoryWithProductsDto, CreateCategoryDto, DeletionCheckDto,
    UpdateCategoryDto,
};
