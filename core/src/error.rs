//! Error types for domain and storage operations.

use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Error taxonomy for the booking domain.
///
/// Variants are grouped by how callers recover from them: credential
/// failures redirect back to the login form, missing identities become 404
/// pages, and storage failures are surfaced as generic 500 responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Credentials did not match a stored account.
    ///
    /// Deliberately covers both "no such email" and "wrong password" so the
    /// caller-facing layer cannot distinguish them.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Requested record does not exist.
    #[error("Record not found")]
    NotFound,

    /// A storage call exceeded its per-call timeout.
    ///
    /// Transient: distinct from [`BookingError::NotFound`] and from
    /// constraint violations.
    #[error("Storage operation timed out")]
    StorageTimeout,

    /// A storage constraint was violated (duplicate key, bad foreign key).
    #[error("Storage constraint violated: {0}")]
    Constraint(String),

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The visitor's session record is gone or never existed.
    #[error("Session record not found")]
    SessionMissing,
}

impl BookingError {
    /// Returns `true` if retrying the same call later could succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::StorageTimeout)
    }

    /// Returns `true` if this error is safe to describe to the visitor.
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::SessionMissing)
    }
}
