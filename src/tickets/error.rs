use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for the ticketing system
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("Ticket not found")]
    NotFound,

    #[error("Assignee not found or not a staff member")]
    InvalidAssignee,

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for TicketError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            TicketError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            TicketError::InvalidAssignee => (StatusCode::BAD_REQUEST, self.to_string()),
            TicketError::InvalidTransition(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            TicketError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            TicketError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            TicketError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
