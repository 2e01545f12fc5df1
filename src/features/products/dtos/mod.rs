mod product_dto;

pub use product_dto::{
    CreateProductDto, ImageCleanupDto, ProductListQuery, ProductMutationDto, ProductResponseDto,
    ProductSummaryDto, UpdateProductDto,
};
