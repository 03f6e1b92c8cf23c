//! User accounts and roles

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// User roles
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[serde(rename = "Loan Officer", alias = "LoanOfficer")]
    LoanOfficer,
    Cashier,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::LoanOfficer, UserRole::Cashier];

    /// Parse a role label. Accepts the display label and the token form.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Admin" | "admin" => Some(UserRole::Admin),
            "Loan Officer" | "LoanOfficer" | "loan_officer" => Some(UserRole::LoanOfficer),
            "Cashier" | "cashier" => Some(UserRole::Cashier),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::LoanOfficer => "Loan Officer",
            UserRole::Cashier => "Cashier",
        }
    }
}

/// Account status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Disabled,
}

/// User model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// User response (sanitized for API)
#[derive(Debug, Serialize, Clone)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            role: user.role,
            status: user.status,
            created_at: user.created_at,
        }
    }
}

/// Request to provision a new user
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    pub role: UserRole,
    pub status: Option<UserStatus>,
}

/// Partial update of a user; omitted fields keep their current value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 64))]
    pub username: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels_round_trip() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("loan_officer"), Some(UserRole::LoanOfficer));
        assert_eq!(UserRole::parse("Manager"), None);
    }

    #[test]
    fn test_role_serializes_as_display_label() {
        let json = serde_json::to_string(&UserRole::LoanOfficer).unwrap();
        assert_eq!(json, "\"Loan Officer\"");

        let role: UserRole = serde_json::from_str("\"Cashier\"").unwrap();
        assert_eq!(role, UserRole::Cashier);
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Cashier".to_string(),
            username: "Cashier".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            role: UserRole::Cashier,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());

        let response: UserResponse = user.into();
        assert_eq!(response.role, UserRole::Cashier);
    }
}
