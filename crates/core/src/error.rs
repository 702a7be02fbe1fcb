//! Error taxonomy shared across the engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type used across the registry and its collaborators.
pub type AuthResult<T> = Result<T, AuthError>;

/// Failure inside the persistence layer.
///
/// Storage errors are always wrapped with enough context to log, and are
/// never collapsed into an authorization decision: a broken journal must
/// surface as a 5xx, not as a login denial.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O failure on the backing medium (open/append/read).
    #[error("storage i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded or decoded (e.g. the options JSON blob).
    #[error("storage encoding error: {0}")]
    Encoding(String),

    /// A journal line with an unrecognized marker or field layout.
    /// Fatal at replay time: the file cannot be trusted past this point.
    #[error("corrupt journal record: {line:?}")]
    Corrupt { line: String },
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn corrupt(line: impl Into<String>) -> Self {
        Self::Corrupt { line: line.into() }
    }
}

/// Domain-level error returned by the registry.
///
/// `Unauthorized` deliberately carries no detail: callers must not be able
/// to distinguish "no such user" from "wrong password" from "blacklisted"
/// on the credential path.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or missing input; the caller can correct and retry.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Absent, blacklisted or mismatched credential/token.
    #[error("unauthorized")]
    Unauthorized,

    /// The target user does not exist (admin operations only).
    #[error("user not found")]
    NotFound,

    /// Duplicate registration or a protected-role violation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence failure, wrapped with context.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Infrastructure failure outside storage (e.g. token signing).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
