// JWT token generation and validation service

use crate::auth::error::AuthError;
use crate::auth::models::Role;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
///
/// Carries the tenancy and role so handlers can scope every query without a
/// user lookup per request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // user_id
    pub email: String,
    pub tenancy_id: Uuid,
    pub role: Role,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Token service for JWT operations
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_token_duration: i64,  // seconds
    refresh_token_duration: i64, // seconds
}

impl TokenService {
    /// Create a new TokenService with secret key
    /// Access tokens expire in 15 minutes, refresh tokens in 7 days
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            access_token_duration: 900,
            refresh_token_duration: 604_800,
        }
    }

    /// Generate an access token (15 minutes)
    pub fn generate_access_token(
        &self,
        user_id: i32,
        email: &str,
        tenancy_id: Uuid,
        role: Role,
    ) -> Result<String, AuthError> {
        self.generate(user_id, email, tenancy_id, role, self.access_token_duration)
    }

    /// Generate a refresh token (7 days)
    pub fn generate_refresh_token(
        &self,
        user_id: i32,
        email: &str,
        tenancy_id: Uuid,
        role: Role,
    ) -> Result<String, AuthError> {
        self.generate(user_id, email, tenancy_id, role, self.refresh_token_duration)
    }

    fn generate(
        &self,
        user_id: i32,
        email: &str,
        tenancy_id: Uuid,
        role: Role,
        duration: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            tenancy_id,
            role,
            iat: now,
            exp: now + duration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Validate an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token(token)
    }

    /// Decode and validate a token, distinguishing expiry from other failures
    fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret-key".to_string())
    }

    #[test]
    fn test_access_token_round_trip() {
        let svc = service();
        let tenancy = Uuid::new_v4();
        let token = svc
            .generate_access_token(42, "user@example.com", tenancy, Role::Customer)
            .unwrap();

        let claims = svc.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.tenancy_id, tenancy);
        assert_eq!(claims.role, Role::Customer);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service()
            .generate_access_token(1, "a@b.com", Uuid::new_v4(), Role::Admin)
            .unwrap();

        let other = TokenService::new("different-secret".to_string());
        assert!(matches!(
            other.validate_access_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            service().validate_access_token("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_role_survives_round_trip() {
        let svc = service();
        for role in [Role::Customer, Role::Staff, Role::Admin] {
            let token = svc
                .generate_access_token(1, "x@y.com", Uuid::new_v4(), role)
                .unwrap();
            assert_eq!(svc.validate_access_token(&token).unwrap().role, role);
        }
    }
}
