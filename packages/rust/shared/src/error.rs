//! Error types for docpress.
//!
//! Library crates use [`DocpressError`] via `thiserror`.
//! App crates (cli) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docpress operations.
#[derive(Debug, thiserror::Error)]
pub enum DocpressError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Search index parsing error (wrapper or JSON body).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// External generator error (spawn failure or non-zero exit).
    #[error("generator error: {0}")]
    Generator(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (invariant violation, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocpressError>;

impl DocpressError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a generator error from any displayable message.
    pub fn generator(msg: impl Into<String>) -> Self {
        Self::Generator(msg.into())
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
        let err = DocpressError::config("missing publish_dir");
        assert_eq!(err.to_string(), "config error: missing publish_dir");

        let err = DocpressError::validation("titles length 3 does not match docnames length 9");
        assert!(err.to_string().contains("titles length 3"));
    }

    #[test]
    fn generator_error_formatting() {
        let err = DocpressError::generator("`gitbook build` exited with status 1");
        assert_eq!(
            err.to_string(),
            "generator error: `gitbook build` exited with status 1"
        );
    }
}
