// Authentication middleware for protected routes

use crate::auth::{error::AuthError, models::Role, token::TokenService};
use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

/// Authenticated user extractor for protected routes
///
/// Carries the tenancy resolved from the token claims; handlers use it to
/// scope every query.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
    pub tenancy_id: Uuid,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::ConfigError("JWT_SECRET not configured".to_string()))?;

        let token_service = TokenService::new(jwt_secret);
        let claims = token_service.validate_access_token(token)?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
            tenancy_id: claims.tenancy_id,
            role: claims.role,
        })
    }
}

/// Authorization middleware that requires a minimum role
#[derive(Debug, Clone)]
pub struct RequireRole {
    required_role: Role,
}

impl RequireRole {
    pub fn new(required_role: Role) -> Self {
        Self { required_role }
    }

    /// Middleware requiring the Admin role
    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    /// Middleware requiring at least the Staff role
    pub fn staff() -> Self {
        Self::new(Role::Staff)
    }

    /// Role ordering: admin covers staff routes, staff covers customer routes
    fn satisfies(actual: Role, required: Role) -> bool {
        fn rank(role: Role) -> u8 {
            match role {
                Role::Customer => 0,
                Role::Staff => 1,
                Role::Admin => 2,
            }
        }
        rank(actual) >= rank(required)
    }

    /// Middleware function validating role-based access
    pub async fn middleware(
        self,
        request: Request<Body>,
        next: Next,
    ) -> Result<Response, AuthError> {
        let endpoint = request.uri().path().to_string();

        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .ok_or_else(|| {
                warn!("Missing Authorization header for protected endpoint: {}", endpoint);
                AuthError::MissingToken
            })?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::ConfigError("JWT_SECRET not configured".to_string()))?;

        let token_service = TokenService::new(jwt_secret);
        let claims = token_service.validate_access_token(token)?;

        if !Self::satisfies(claims.role, self.required_role) {
            warn!(
                "Authorization failed: user_id={}, required_role={}, actual_role={}, endpoint={}",
                claims.sub, self.required_role, claims.role, endpoint
            );
            return Err(AuthError::InsufficientPermissions {
                required: self.required_role,
                actual: claims.role,
            });
        }

        Ok(next.run(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(RequireRole::satisfies(Role::Admin, Role::Staff));
        assert!(RequireRole::satisfies(Role::Admin, Role::Admin));
        assert!(RequireRole::satisfies(Role::Staff, Role::Staff));
        assert!(!RequireRole::satisfies(Role::Staff, Role::Admin));
        assert!(!RequireRole::satisfies(Role::Customer, Role::Staff));
        assert!(RequireRole::satisfies(Role::Customer, Role::Customer));
    }
}
