// Error types for the benefit system

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

/// Errors raised while evaluating or administering benefits
///
/// The evaluator itself only ever raises `CouponMinimumNotMet`; everything
/// ineligible is silently excluded rather than failed. The remaining
/// variants come from the admin surface and repositories.
#[derive(Debug, Error)]
pub enum BenefitError {
    /// A supplied coupon exists but the order is below its minimum
    #[error("Order total {order_total} is below coupon {code} minimum of {minimum}")]
    CouponMinimumNotMet {
        code: String,
        minimum: Decimal,
        order_total: Decimal,
    },

    /// Request validation failures on the admin surface
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Referenced discount/campaign/coupon does not exist in this tenancy
    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },

    /// Duplicate coupon code within a tenancy
    #[error("Coupon code {0} already exists")]
    DuplicateCouponCode(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Result type alias for benefit operations
pub type BenefitResult<T> = Result<T, BenefitError>;

impl IntoResponse for BenefitError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            BenefitError::CouponMinimumNotMet { .. } => {
                (StatusCode::BAD_REQUEST, "Coupon minimum not met")
            }
            BenefitError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            BenefitError::NotFound { .. } => (StatusCode::NOT_FOUND, "Not found"),
            BenefitError::DuplicateCouponCode(_) => {
                (StatusCode::CONFLICT, "Coupon code already exists")
            }
            BenefitError::DatabaseError(e) => {
                tracing::error!("Benefit database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "details": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for BenefitError {
    fn from(err: validator::ValidationErrors) -> Self {
        BenefitError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_minimum_not_met_display() {
        let err = BenefitError::CouponMinimumNotMet {
            code: "SAVE50".to_string(),
            minimum: dec!(500),
            order_total: dec!(200),
        };
        assert_eq!(
            err.to_string(),
            "Order total 200 is below coupon SAVE50 minimum of 500"
        );
    }

    #[test]
    fn test_from_sqlx() {
        let err: BenefitError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, BenefitError::DatabaseError(_)));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = BenefitError::NotFound {
            resource: "coupon".to_string(),
            id: "3f2a".to_string(),
        };
        assert_eq!(err.to_string(), "coupon 3f2a not found");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_duplicate_code_carries_code_and_maps_to_409() {
        let err = BenefitError::DuplicateCouponCode("SAVE50".to_string());
        assert_eq!(err.to_string(), "Coupon code SAVE50 already exists");
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
