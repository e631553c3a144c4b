// Authentication service - business logic layer

use crate::auth::{
    error::AuthError,
    models::{AuthResponse, Role, UserResponse},
    password::PasswordService,
    repository::{TokenRepository, UserRepository},
    token::TokenService,
};
use chrono::{Duration, Utc};

/// Authentication service coordinating registration, login, and refresh
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    token_repo: TokenRepository,
    token_service: TokenService,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        token_repo: TokenRepository,
        token_service: TokenService,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            token_service,
        }
    }

    /// Register a new customer account within a tenancy
    pub async fn register(
        &self,
        tenancy_slug: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthError> {
        PasswordService::validate_password_strength(password)?;

        let tenancy_id = self
            .user_repo
            .resolve_tenancy(tenancy_slug)
            .await?
            .ok_or_else(|| AuthError::TenancyNotFound(tenancy_slug.to_string()))?;

        let password_hash = PasswordService::hash_password(password)?;
        let user = self
            .user_repo
            .create_user(tenancy_id, email, &password_hash, Role::Customer)
            .await?;

        tracing::info!("Registered user {} in tenancy {}", user.id, tenancy_id);
        self.issue_tokens(user).await
    }

    /// Login with tenancy-scoped credentials
    pub async fn login(
        &self,
        tenancy_slug: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthError> {
        let tenancy_id = self
            .user_repo
            .resolve_tenancy(tenancy_slug)
            .await?
            .ok_or_else(|| AuthError::TenancyNotFound(tenancy_slug.to_string()))?;

        let user = self
            .user_repo
            .find_by_email(tenancy_id, email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(password, &user.password_hash)? {
            tracing::warn!("Failed login for user {} in tenancy {}", email, tenancy_id);
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_tokens(user).await
    }

    /// Rotate a refresh token into a new access/refresh pair
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<AuthResponse, AuthError> {
        let stored = self
            .token_repo
            .verify_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(stored.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        // Rotation: the old token is consumed whether or not issuing succeeds
        self.token_repo.invalidate_token(refresh_token).await?;

        self.issue_tokens(user).await
    }

    /// Get current user information
    pub async fn get_current_user(&self, user_id: i32) -> Result<UserResponse, AuthError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(user.into())
    }

    async fn issue_tokens(&self, user: crate::auth::models::User) -> Result<AuthResponse, AuthError> {
        let access_token = self.token_service.generate_access_token(
            user.id,
            &user.email,
            user.tenancy_id,
            user.role,
        )?;
        let refresh_token = self.token_service.generate_refresh_token(
            user.id,
            &user.email,
            user.tenancy_id,
            user.role,
        )?;

        let expires_at = Utc::now() + Duration::days(7);
        self.token_repo
            .store_refresh_token(user.id, &refresh_token, expires_at)
            .await?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user: user.into(),
        })
    }
}
