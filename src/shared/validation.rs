use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::shared::constants::{PRICE_INTEGER_DIGITS, PRICE_SCALE};

lazy_static! {
    /// Regex for validating slugs
    /// Must be lowercase alphanumeric with single hyphens between segments
    /// - Valid: "running-shoes", "tennis", "size-42"
    /// - Invalid: "-shoes", "shoes-", "running--shoes", "Shoes", "running_shoes"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Runs of characters that are not allowed in a slug
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Derive a URL-safe slug from a display name.
///
/// Lowercases the name, collapses every run of characters outside `[a-z0-9]`
/// into a single hyphen and trims hyphens at both ends. Returns an empty string
/// when the name has no ASCII alphanumerics at all.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Validator hook: prices must be strictly positive and fit the price column
/// (at most `PRICE_SCALE` decimals and `PRICE_INTEGER_DIGITS` integer digits)
pub fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if !price.is_sign_positive() || price.is_zero() {
        return Err(price_error(
            "positive_price",
            "price must be greater than zero".to_string(),
        ));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(price_error(
            "price_scale",
            format!("price must have at most {} decimal places", PRICE_SCALE),
        ));
    }
    if price.trunc() >= Decimal::from(10_i64.pow(PRICE_INTEGER_DIGITS)) {
        return Err(price_error(
            "price_range",
            format!(
                "price must have at most {} digits before the decimal point",
                PRICE_INTEGER_DIGITS
            ),
        ));
    }
    Ok(())
}

fn price_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validator hook: required text must contain more than whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
