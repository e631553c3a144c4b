// HTTP handlers for authentication endpoints

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UserResponse},
};
use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

/// Register a new user
/// POST /api/auth/register
pub async fn register_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let response = state
        .auth_service
        .register(&request.tenancy_slug, &request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login a user
/// POST /api/auth/login
pub async fn login_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let response = state
        .auth_service
        .login(&request.tenancy_slug, &request.email, &request.password)
        .await?;

    Ok(Json(response))
}

/// Refresh tokens
/// POST /api/auth/refresh
pub async fn refresh_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    if request.refresh_token.trim().is_empty() {
        return Err(AuthError::ValidationError(
            "refresh_token is required".to_string(),
        ));
    }

    let response = state
        .auth_service
        .refresh_tokens(&request.refresh_token)
        .await?;

    Ok(Json(response))
}

/// Get current user information (protected)
/// GET /api/auth/me
pub async fn me_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    let response = state.auth_service.get_current_user(user.user_id).await?;
    Ok(Json(response))
}
