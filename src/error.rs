// Error handling for the Laundry API
// Centralized error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

/// Main error type for the API
/// Catalog and tenancy handlers return Result<T, ApiError>
#[derive(Debug)]
pub enum ApiError {
    /// Request validation failures
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Malformed listing query string (bad sort field, negative price, ...)
    /// Maps to HTTP 400 Bad Request
    InvalidQuery(String),

    /// No tenancy context could be resolved for the request
    /// Maps to HTTP 400 Bad Request
    MissingTenancy,

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Duplicate resource conflict (e.g. service name taken within a tenancy)
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Database operation errors
    /// Maps to HTTP 500; details are kept out of client responses
    DatabaseError(sqlx::Error),

    /// Internal server errors
    /// Maps to HTTP 500; details are kept out of client responses
    InternalError(String),

    /// Authentication failures
    /// Maps to HTTP 401 Unauthorized
    Unauthorized(String),

    /// Authorization failures
    /// Maps to HTTP 403 Forbidden
    Forbidden(String),
}

/// Consistent error response body
///
/// Machine-readable `error_code` plus a human-readable `message`, with
/// optional field-level details for validation failures.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Logs at a level matching severity: error! for 500s, warn! for
    /// suspicious client errors, debug! for expected ones. Database details
    /// never reach the client.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);

                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error_code: "VALIDATION_ERROR".to_string(),
                        message: "Request validation failed".to_string(),
                        details: Some(
                            serde_json::to_value(errors).unwrap_or(serde_json::json!({})),
                        ),
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::InvalidQuery(message) => {
                debug!("Invalid query string: {}", message);

                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error_code: "INVALID_QUERY".to_string(),
                        message: message.clone(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::MissingTenancy => {
                warn!("Request without tenancy context");

                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error_code: "MISSING_TENANCY".to_string(),
                        message: "No tenancy context for this request".to_string(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);

                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse {
                        error_code: "NOT_FOUND".to_string(),
                        message: format!("{} with id {} not found", resource, id),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);

                (
                    StatusCode::CONFLICT,
                    ErrorResponse {
                        error_code: "CONFLICT".to_string(),
                        message: message.clone(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::DatabaseError(db_error) => {
                error!("Database error: {:?}", db_error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_code: "DATABASE_ERROR".to_string(),
                        message: "A database error occurred".to_string(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_code: "INTERNAL_ERROR".to_string(),
                        message: "An internal server error occurred".to_string(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);

                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse {
                        error_code: "UNAUTHORIZED".to_string(),
                        message: message.clone(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);

                (
                    StatusCode::FORBIDDEN,
                    ErrorResponse {
                        error_code: "FORBIDDEN".to_string(),
                        message: message.clone(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingTenancy => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

impl From<crate::query::QueryError> for ApiError {
    fn from(error: crate::query::QueryError) -> Self {
        ApiError::InvalidQuery(error.message)
    }
}
