//! Authentication middleware
//!
//! Extractors for session token verification and role checks.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{allowed, can_delete, AuthError as ServiceAuthError, AuthService, Operation, Resource};
use crate::error::ApiError;
use crate::models::UserRole;

/// Authenticated user resolved from the session token and the users table
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Fail with 403 unless the user's role may perform `operation` on `resource`
    pub fn require(&self, operation: Operation, resource: Resource) -> Result<(), ApiError> {
        if allowed(self.role, operation, resource) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                role = %self.role.as_str(),
                operation = %operation.as_str(),
                resource = %resource.as_str(),
                "Access denied"
            );
            Err(ApiError::Forbidden(format!(
                "{} may not {} {} records",
                self.role.as_str(),
                operation.as_str(),
                resource.as_str().to_lowercase()
            )))
        }
    }

    /// Fail with 403 unless the user may delete records
    pub fn require_delete(&self) -> Result<(), ApiError> {
        if can_delete(self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Only an Admin may delete records".to_string(),
            ))
        }
    }
}

/// Error response for authentication failures
#[derive(Debug, Serialize)]
struct AuthError {
    error: AuthErrorDetails,
}

#[derive(Debug, Serialize)]
struct AuthErrorDetails {
    code: String,
    message: String,
}

impl AuthError {
    fn new(code: &str, message: &str) -> Self {
        Self {
            error: AuthErrorDetails {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

/// Extractor for authenticated users
///
/// Verifies the Bearer token, then reloads the account so that disabled
/// users are rejected and role changes take effect immediately.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: AuthenticatedUser) -> impl IntoResponse {
///     format!("Hello, {}", user.name)
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AuthError::new(
                        "MISSING_TOKEN",
                        "Authorization header with Bearer token required",
                    )
                    .into_response()
                })?;

        let auth_service = Arc::<AuthService>::from_ref(state);

        let user = auth_service
            .authenticate(bearer.token())
            .await
            .map_err(|e| match e {
                ServiceAuthError::TokenExpired => {
                    AuthError::new("TOKEN_EXPIRED", "Token has expired").into_response()
                }
                ServiceAuthError::AccountDisabled => {
                    AuthError::new("ACCOUNT_DISABLED", "Account is disabled").into_response()
                }
                ServiceAuthError::DatabaseError(msg) => {
                    ApiError::DatabaseError(msg).into_response()
                }
                _ => AuthError::new("INVALID_TOKEN", "Invalid token").into_response(),
            })?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            username: user.username,
            name: user.name,
            role: user.role,
        })
    }
}

/// Extractor that only admits Admin users
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !matches!(user.role, UserRole::Admin) {
            return Err(ApiError::Forbidden("Admin access required".to_string()).into_response());
        }

        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            username: "tester".to_string(),
            name: "Tester".to_string(),
            role,
        }
    }

    #[test]
    fn test_cashier_cannot_create_loans() {
        let cashier = user_with(UserRole::Cashier);
        let err = cashier.require(Operation::Create, Resource::Loan).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        assert!(cashier.require(Operation::Create, Resource::Payment).is_ok());
    }

    #[test]
    fn test_only_admin_deletes() {
        assert!(user_with(UserRole::Admin).require_delete().is_ok());
        assert!(user_with(UserRole::LoanOfficer).require_delete().is_err());
        assert!(user_with(UserRole::Cashier).require_delete().is_err());
    }
}
