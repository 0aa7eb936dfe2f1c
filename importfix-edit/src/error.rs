//! Error types for importfix-edit.
//!
//! This module defines error types that distinguish between:
//! - Precondition failures (exit code 2): the file changed or vanished after it was read
//! - Runtime errors (exit code 1): I/O errors

use camino::Utf8PathBuf;
use thiserror::Error;

/// The top-level error type for importfix-edit operations.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The file on disk no longer matches the text the patch was planned from.
    #[error("precondition mismatch: {0}")]
    Precondition(#[from] PreconditionError),

    /// A runtime/tool error occurred (exit code 1).
    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("{path} changed since it was read (expected sha256 {expected}, found {actual})")]
    Sha256Mismatch {
        path: Utf8PathBuf,
        expected: String,
        actual: String,
    },

    #[error("{path} no longer exists")]
    Missing { path: Utf8PathBuf },
}

impl PatchError {
    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PatchError::Precondition(_) => 2,
            PatchError::Runtime(_) => 1,
        }
    }
}

/// Result type alias using PatchError.
pub type PatchResult<T> = Result<T, PatchError>;
