//! Authentication and authorization
//!
//! - Username/password login against bcrypt hashes
//! - JWT session token generation and validation
//! - Role-based access policy

mod jwt;
mod password;
pub mod policy;
mod service;

pub use jwt::{generate_access_token, get_user_id_from_claims, verify_token, Claims, JwtError};
pub use password::{hash_password, verify_password, PasswordError};
pub use policy::{allowed, allowed_str, can_delete, Operation, Resource};
pub use service::{AuthError, AuthService, DEFAULT_USERS};
