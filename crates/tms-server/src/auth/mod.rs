//! Credential & token layer.
//!
//! - `password`: bcrypt hashing and constant-shape verification
//! - `token`: HS256 JWT issuance and verification
//!
//! Every failure in this layer surfaces as `AuthError`, which the HTTP
//! boundary maps to 401.

pub mod password;
pub mod token;

use thiserror::Error;
use tms_core::TmsError;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
}

impl From<AuthError> for TmsError {
    fn from(e: AuthError) -> Self {
        TmsError::Unauthorized(e.to_string())
    }
}
