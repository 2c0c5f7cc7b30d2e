//! Centralized error types for remotegate.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the remotegate library.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Message file not found: {0}")]
    FileNotFound(PathBuf),

    /// A MIME decoding error.
    #[error("MIME decoding error: {0}")]
    MimeError(String),

    /// The message carries no `text/html` part to filter.
    #[error("Message has no HTML body")]
    NoHtmlBody,

    /// The HTML scanner rejected the markup.
    #[error("HTML rewrite error: {0}")]
    Rewrite(String),
}

/// Convenience alias for `Result<T, RemoteError>`.
pub type Result<T> = std::result::Result<T, RemoteError>;

impl RemoteError {
    /// Create an `Io` variant from a path and an `io::Error`.
    ///
    /// `NotFound` is mapped to [`RemoteError::FileNotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::FileNotFound(path);
        }
        Self::Io { path, source }
    }
}

impl From<lol_html::errors::RewritingError> for RemoteError {
    fn from(err: lol_html::errors::RewritingError) -> Self {
        Self::Rewrite(err.to_string())
    }
}
