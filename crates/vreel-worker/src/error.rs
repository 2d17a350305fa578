//! Pipeline error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Script generation failed: {0}")]
    ScriptGeneration(String),

    #[error("Topic generation failed: {0}")]
    TopicGeneration(String),

    #[error("Speech synthesis failed: {0}")]
    Tts(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Render failed: {0}")]
    Render(#[from] vreel_media::MediaError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkerError {
    pub fn script_generation(msg: impl Into<String>) -> Self {
        Self::ScriptGeneration(msg.into())
    }

    pub fn topic_generation(msg: impl Into<String>) -> Self {
        Self::TopicGeneration(msg.into())
    }

    pub fn tts(msg: impl Into<String>) -> Self {
        Self::Tts(msg.into())
    }

    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerError::ScriptGeneration(_) => "script_generation",
            WorkerError::TopicGeneration(_) => "topic_generation",
            WorkerError::Tts(_) => "tts",
            WorkerError::Transcription(_) => "transcription",
            WorkerError::Render(_) => "render",
            WorkerError::Config(_) => "config",
            WorkerError::InvalidInput(_) => "invalid_input",
            WorkerError::Artifact(_) => "artifact",
            WorkerError::Io(_) => "io",
            WorkerError::Json(_) => "json",
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::ScriptGeneration(_)
            | WorkerError::TopicGeneration(_)
            | WorkerError::Tts(_)
            | WorkerError::Transcription(_)
            | WorkerError::Io(_) => true,
            WorkerError::Render(e) => e.is_retryable(),
            WorkerError::Config(_)
            | WorkerError::InvalidInput(_)
            | WorkerError::Artifact(_)
            | WorkerError::Json(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vreel_media::MediaError;

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            WorkerError::script_generation("x"),
            WorkerError::topic_generation("x"),
            WorkerError::tts("x"),
            WorkerError::transcription("x"),
            WorkerError::Render(MediaError::Cancelled),
            WorkerError::config_error("x"),
        ];
        let kinds: std::collections::HashSet<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_retryable() {
        assert!(WorkerError::tts("timeout").is_retryable());
        assert!(WorkerError::Render(MediaError::Timeout(10)).is_retryable());
        assert!(!WorkerError::Render(MediaError::NpxNotFound).is_retryable());
        assert!(!WorkerError::config_error("missing key").is_retryable());
        assert!(!WorkerError::invalid_input("empty topic").is_retryable());
    }

    #[test]
    fn test_media_error_converts() {
        let err: WorkerError = MediaError::Cancelled.into();
        assert_eq!(err.to_string(), "Render failed: Operation cancelled");
    }
}
