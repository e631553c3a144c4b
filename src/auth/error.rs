// Authentication and authorization error types

use crate::auth::models::Role;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

/// Authentication and authorization error types
#[derive(Debug)]
pub enum AuthError {
    // Authentication errors
    ValidationError(String),
    InvalidCredentials,
    InvalidToken,
    ExpiredToken,
    MissingToken,
    EmailAlreadyExists,
    TenancyNotFound(String),
    DatabaseError(String),
    PasswordHashError,
    InvalidPasswordFormat(String),
    TokenGenerationError(String),

    // Authorization errors
    /// User lacks the required role for the operation
    InsufficientPermissions { required: Role, actual: Role },
    /// Invalid role value encountered
    InvalidRole(String),
    /// Configuration error in the authorization system
    ConfigError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::EmailAlreadyExists => write!(f, "Email already exists"),
            AuthError::TenancyNotFound(slug) => write!(f, "Unknown tenancy: {}", slug),
            AuthError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AuthError::PasswordHashError => write!(f, "Password hashing error"),
            AuthError::InvalidPasswordFormat(msg) => write!(f, "Invalid password: {}", msg),
            AuthError::TokenGenerationError(msg) => write!(f, "Token generation error: {}", msg),
            AuthError::InsufficientPermissions { required, actual } => write!(
                f,
                "Insufficient permissions: required role '{}', but user has role '{}'",
                required, actual
            ),
            AuthError::InvalidRole(msg) => write!(f, "Invalid role: {}", msg),
            AuthError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AuthError::InvalidToken => {
                warn!("Invalid token attempt");
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AuthError::ExpiredToken => {
                warn!("Expired token attempt");
                (StatusCode::UNAUTHORIZED, "Token has expired".to_string())
            }
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Missing authentication token".to_string(),
            ),
            AuthError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Email already exists".to_string())
            }
            AuthError::TenancyNotFound(slug) => {
                (StatusCode::BAD_REQUEST, format!("Unknown tenancy: {}", slug))
            }
            AuthError::DatabaseError(msg) => {
                error!("Auth database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::PasswordHashError => {
                error!("Password hashing failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::InvalidPasswordFormat(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::TokenGenerationError(msg) => {
                error!("Token generation error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::InsufficientPermissions { required, actual } => {
                warn!(
                    "Authorization denied: required '{}', actual '{}'",
                    required, actual
                );
                (
                    StatusCode::FORBIDDEN,
                    "Insufficient permissions".to_string(),
                )
            }
            AuthError::InvalidRole(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AuthError::ConfigError(msg) => {
                error!("Auth configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
