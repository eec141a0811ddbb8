//! Error types for the TubeLab client.
//!
//! Library crates use [`TubeLabError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all TubeLab operations.
#[derive(Debug, thiserror::Error)]
pub enum TubeLabError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network-level failure before an HTTP status was obtained.
    #[error("transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("api error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Caller-supplied input failed a format check before any request was sent.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TubeLabError>;

impl TubeLabError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = TubeLabError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = TubeLabError::Api {
            status: 401,
            message: "invalid api key".into(),
        };
        assert_eq!(err.to_string(), "api error (HTTP 401): invalid api key");

        let err = TubeLabError::validation("channel ID must be 24 characters");
        assert!(err.to_string().contains("24 characters"));
    }
}
