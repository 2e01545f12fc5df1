/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// CATALOGUE LIMITS
// =============================================================================

/// Maximum length of category and product names
pub const MAX_NAME_LENGTH: u64 = 60;

/// Maximum length of a category description
pub const MAX_CATEGORY_DESCRIPTION_LENGTH: u64 = 500;

/// Decimal places stored for product prices
pub const PRICE_SCALE: u32 = 2;

/// Integer digits stored for product prices (NUMERIC(12, 2))
pub const PRICE_INTEGER_DIGITS: u32 = 10;

/// Maximum size of an uploaded image in bytes (5MB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// MIME types accepted for product images
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
