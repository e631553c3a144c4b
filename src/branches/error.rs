use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for branch operations
#[derive(Debug, thiserror::Error)]
pub enum BranchError {
    #[error("Branch not found")]
    NotFound,

    #[error("A branch with this name already exists")]
    DuplicateName,

    #[error("User not found or not a staff member")]
    InvalidStaffMember,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for BranchError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            BranchError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            BranchError::DuplicateName => (StatusCode::CONFLICT, self.to_string()),
            BranchError::InvalidStaffMember => (StatusCode::BAD_REQUEST, self.to_string()),
            BranchError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            BranchError::DatabaseError(e) => {
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
