//! Error types for render operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for render operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("npx not found in PATH")]
    NpxNotFound,

    #[error("Remotion render failed: {message}")]
    RenderFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Remotion project not found: {0}")]
    ProjectNotFound(PathBuf),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid render input: {0}")]
    InvalidInput(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a render failure error.
    pub fn render_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::RenderFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether another attempt could succeed.
    ///
    /// Missing inputs and tooling will still be missing on the next attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MediaError::RenderFailed { .. } | MediaError::Timeout(_) | MediaError::Io(_)
        )
    }
}
