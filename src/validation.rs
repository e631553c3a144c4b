// Validation utilities
// Custom validation functions for domain-specific request fields

use rust_decimal::Decimal;
use validator::ValidationError;

/// Validates that a service category is one of the accepted values
/// Valid values: "wash", "dry_clean", "iron", "wash_iron", "premium"
pub fn validate_service_category(category: &str) -> Result<(), ValidationError> {
    let valid = ["wash", "dry_clean", "iron", "wash_iron", "premium"];
    if valid.contains(&category.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_service_category"))
    }
}

/// Validates that a unit price is positive
pub fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        Err(ValidationError::new("price_must_be_positive"))
    } else {
        Ok(())
    }
}

/// Validates a coupon code: 3-32 chars, uppercase alphanumeric plus '-' and '_'
pub fn validate_coupon_code(code: &str) -> Result<(), ValidationError> {
    if code.len() < 3 || code.len() > 32 {
        return Err(ValidationError::new("coupon_code_length"));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(ValidationError::new("coupon_code_charset"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_service_categories() {
        for c in ["wash", "dry_clean", "iron", "wash_iron", "premium", "WASH"] {
            assert!(validate_service_category(c).is_ok(), "{} should be valid", c);
        }
    }

    #[test]
    fn test_invalid_service_category() {
        assert!(validate_service_category("folding").is_err());
        assert!(validate_service_category("").is_err());
    }

    #[test]
    fn test_positive_price() {
        assert!(validate_positive_price(&dec!(10.00)).is_ok());
        assert!(validate_positive_price(&Decimal::ZERO).is_err());
        assert!(validate_positive_price(&dec!(-1)).is_err());
    }

    #[test]
    fn test_coupon_code_format() {
        assert!(validate_coupon_code("SAVE50").is_ok());
        assert!(validate_coupon_code("FIRST_ORDER-10").is_ok());
        assert!(validate_coupon_code("ab").is_err());
        assert!(validate_coupon_code("lowercase").is_err());
        assert!(validate_coupon_code("HAS SPACE").is_err());
    }

}
