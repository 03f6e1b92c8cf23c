//! Authentication service
//!
//! Username/password login, session token issue and verification, and the
//! first-run seeding of default accounts.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LoginResponse, User, UserRole, UserStatus};

use super::jwt::{generate_access_token, get_user_id_from_claims, verify_token, JwtError};
use super::password::{hash_password, verify_password, PasswordError};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Password error: {0}")]
    PasswordError(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::DatabaseError(e.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::TokenExpired => AuthError::TokenExpired,
            other => AuthError::TokenError(other.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::PasswordError(e.to_string())
    }
}

/// Accounts created on an empty database: (display name, username, password, role)
pub const DEFAULT_USERS: [(&str, &str, &str, UserRole); 3] = [
    ("Admin/Manager", "Admin", "Admin123", UserRole::Admin),
    ("Loan Officer", "Loans", "Loans123", UserRole::LoanOfficer),
    ("Cashier", "Cashier", "Cashier123", UserRole::Cashier),
];

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db_pool: PgPool,
    jwt_secret: String,
    token_ttl_seconds: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(db_pool: PgPool, jwt_secret: String, token_ttl_seconds: i64, bcrypt_cost: u32) -> Self {
        Self {
            db_pool,
            jwt_secret,
            token_ttl_seconds,
            bcrypt_cost,
        }
    }

    /// Get the JWT secret (for middleware)
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown usernames, disabled accounts and wrong passwords all fail with
    /// the same `InvalidCredentials` error.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let user: Option<User> = sqlx::query_as(
            "SELECT * FROM users WHERE username = $1 AND status = $2",
        )
        .bind(username)
        .bind(UserStatus::Active)
        .fetch_optional(&self.db_pool)
        .await?;

        let user = match user {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                tracing::warn!(username = %username, "Failed login attempt");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = generate_access_token(&user, &self.jwt_secret, self.token_ttl_seconds)?;

        tracing::info!(user_id = %user.id, role = %user.role.as_str(), "User logged in");

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_ttl_seconds,
            user: user.into(),
        })
    }

    /// Verify a session token and reload its user.
    ///
    /// The stored record is authoritative: a disabled or deleted account is
    /// rejected even while its token is unexpired, and role changes apply
    /// immediately.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = verify_token(token, &self.jwt_secret)?;
        let user_id = get_user_id_from_claims(&claims)?;

        let user = self.get_user_by_id(user_id).await?;
        if !user.is_active() {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }

    /// Get user by ID
    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<User, AuthError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Insert the default accounts if the users table is empty.
    ///
    /// Returns the number of accounts created.
    pub async fn seed_default_users(&self) -> Result<usize, AuthError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db_pool)
            .await?;

        if count > 0 {
            tracing::debug!(existing = count, "Users present, skipping default account seeding");
            return Ok(0);
        }

        let mut tx = self.db_pool.begin().await?;
        for (name, username, password, role) in DEFAULT_USERS {
            let password_hash = hash_password(password, self.bcrypt_cost)?;
            sqlx::query(
                r#"
                INSERT INTO users (id, name, username, password_hash, role, status)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (username) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(username)
            .bind(&password_hash)
            .bind(role)
            .bind(UserStatus::Active)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::warn!(
            "Created default accounts (Admin, Loans, Cashier); change their passwords before going live"
        );

        Ok(DEFAULT_USERS.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_users_cover_every_role() {
        for role in UserRole::ALL {
            assert!(DEFAULT_USERS.iter().any(|(_, _, _, r)| *r == role));
        }
    }

    #[test]
    fn test_expired_jwt_maps_to_token_expired() {
        let err: AuthError = JwtError::TokenExpired.into();
        assert!(matches!(err, AuthError::TokenExpired));

        let err: AuthError = JwtError::DecodingFailed("bad".to_string()).into();
        assert!(matches!(err, AuthError::TokenError(_)));
    }

    #[test]
    fn test_invalid_credentials_message_is_uniform() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid username or password"
        );
    }
}
