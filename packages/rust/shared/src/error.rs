//! Error types for the SWIFT code registry.
//!
//! Library crates use [`SwiftCodesError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all registry operations.
#[derive(Debug, thiserror::Error)]
pub enum SwiftCodesError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Fatal error while reading the canonical CSV source.
    #[error("parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed code or request payload.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Lookup produced no records.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// A record with this code is already present.
    #[error("duplicate SWIFT code: {code}")]
    DuplicateCode { code: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SwiftCodesError>;

impl SwiftCodesError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error for a 1-based source line.
    pub fn parse(line: u64, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a not-found error describing what was looked up.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
