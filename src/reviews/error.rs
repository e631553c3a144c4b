use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for the reviews system
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Review not found")]
    NotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Order has already been reviewed")]
    DuplicateReview,

    #[error("Only delivered orders can be reviewed")]
    OrderNotDelivered,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ReviewError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ReviewError::OrderNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ReviewError::DuplicateReview => (StatusCode::CONFLICT, self.to_string()),
            ReviewError::OrderNotDelivered => (StatusCode::BAD_REQUEST, self.to_string()),
            ReviewError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ReviewError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ReviewError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
