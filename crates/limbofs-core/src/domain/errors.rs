//! Error types for lifecycle operations and domain validation
//!
//! `VfsError` is the complete failure taxonomy of the lifecycle surface:
//! every failed precondition check in create/open/close/unlink maps to
//! exactly one of its variants. All failures are reported synchronously
//! to the caller and none leave shared state inconsistent.

use thiserror::Error;

/// Errors returned by lifecycle operations (create, open, close, unlink).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VfsError {
    /// Name or identifier absent (unbound name, or an already-reclaimed id).
    #[error("not found: {0}")]
    NotFound(String),

    /// Create on a name that is already bound.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Close or I/O through a handle this context does not hold.
    #[error("invalid handle: {0}")]
    InvalidHandle(u64),

    /// Store capacity exceeded (record count or file size).
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A reference count would go negative. Indicates a caller bug,
    /// not a recoverable condition; the store stays consistent.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl VfsError {
    /// Short machine-readable kind, used by the CLI's JSON output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidHandle(_) => "invalid_handle",
            Self::ResourceExhausted(_) => "resource_exhausted",
            Self::InvariantViolation(_) => "invariant_violation",
        }
    }
}

/// Errors that can occur constructing domain newtypes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// File name failed validation (empty, contains `/` or NUL, too long).
    #[error("invalid file name: {0}")]
    InvalidName(String),

    /// ID parsing error.
    #[error("invalid ID format: {0}")]
    InvalidId(String),
}
