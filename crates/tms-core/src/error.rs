//! Shared error type across tms crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed request body or query.
    Validation,
    /// Missing or invalid credential.
    Unauthorized,
    /// Valid credential, insufficient role.
    Forbidden,
    /// Referenced entity absent.
    NotFound,
    /// Referenced parent absent on write.
    ForeignKeyViolation,
    /// Request exceeded its deadline.
    Timeout,
    /// Store or encoding failure.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and test assertions.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Validation => "VALIDATION",
            ClientCode::Unauthorized => "UNAUTHORIZED",
            ClientCode::Forbidden => "FORBIDDEN",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::ForeignKeyViolation => "FOREIGN_KEY_VIOLATION",
            ClientCode::Timeout => "TIMEOUT",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status code for this failure kind.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::Validation | ClientCode::ForeignKeyViolation => 400,
            ClientCode::Unauthorized => 401,
            ClientCode::Forbidden => 403,
            ClientCode::NotFound => 404,
            ClientCode::Timeout => 408,
            ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TmsError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum TmsError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),
    #[error("request timed out")]
    Timeout,
    #[error("internal: {0}")]
    Internal(String),
}

impl TmsError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TmsError::Validation(_) => ClientCode::Validation,
            TmsError::Unauthorized(_) => ClientCode::Unauthorized,
            TmsError::Forbidden(_) => ClientCode::Forbidden,
            TmsError::NotFound(_) => ClientCode::NotFound,
            TmsError::ForeignKeyViolation(_) => ClientCode::ForeignKeyViolation,
            TmsError::Timeout => ClientCode::Timeout,
            TmsError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Message safe to return to clients. Internal details stay in logs.
    pub fn public_message(&self) -> String {
        match self {
            TmsError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}
