use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::benefits::BenefitError;

/// Error types for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Order not found")]
    NotFound,

    #[error("Service not found: {0}")]
    ServiceNotFound(i32),

    #[error("Branch not found: {0}")]
    BranchNotFound(i32),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Coupon code must not be blank")]
    BlankCouponCode,

    #[error("Coupon {code} requires a minimum order of {minimum}")]
    CouponMinimumNotMet { code: String, minimum: rust_decimal::Decimal },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid payment transition: {0}")]
    InvalidPaymentTransition(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::DatabaseError(err.to_string())
    }
}

impl From<BenefitError> for OrderError {
    fn from(err: BenefitError) -> Self {
        match err {
            BenefitError::CouponMinimumNotMet { code, minimum, .. } => {
                OrderError::CouponMinimumNotMet { code, minimum }
            }
            BenefitError::DatabaseError(e) => OrderError::DatabaseError(e.to_string()),
            other => OrderError::ValidationError(other.to_string()),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            OrderError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            OrderError::NotFound => (StatusCode::NOT_FOUND, "Order not found".to_string()),
            OrderError::ServiceNotFound(id) => (
                StatusCode::BAD_REQUEST,
                format!("Service with id {} not found", id),
            ),
            OrderError::BranchNotFound(id) => (
                StatusCode::BAD_REQUEST,
                format!("Branch with id {} not found", id),
            ),
            OrderError::InvalidQuantity(msg) => (StatusCode::BAD_REQUEST, msg),
            OrderError::BlankCouponCode => (
                StatusCode::BAD_REQUEST,
                "Coupon code must not be blank".to_string(),
            ),
            OrderError::CouponMinimumNotMet { ref code, minimum } => (
                StatusCode::BAD_REQUEST,
                format!("Coupon {} requires a minimum order of {}", code, minimum),
            ),
            OrderError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            OrderError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            OrderError::InvalidTransition(msg) => (StatusCode::BAD_REQUEST, msg),
            OrderError::InvalidPaymentTransition(msg) => (StatusCode::BAD_REQUEST, msg),
            OrderError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
