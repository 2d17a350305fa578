//! Collaborator seams of the pipeline.
//!
//! Each external service sits behind an object-safe async trait so the
//! pipeline can be driven by real clients or by test doubles.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use vreel_media::{ProgressCallback, RenderRequest};
use vreel_models::{GeneratedScript, TimestampSegment};

use crate::error::WorkerResult;

/// Per-request speech settings; `None` uses the synthesizer's default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechOptions {
    pub voice_id: Option<String>,
    pub speed: Option<f64>,
}

/// Produces a narration script for a topic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate(&self, topic: &str) -> WorkerResult<GeneratedScript>;
}

/// Turns narration text into an audio file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns the path of the written audio file.
    async fn synthesize(
        &self,
        text: &str,
        job_id: &str,
        options: &SpeechOptions,
    ) -> WorkerResult<PathBuf>;
}

/// Extracts timed text segments from an audio file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> WorkerResult<Vec<TimestampSegment>>;
}

/// Renders a scene timeline with its narration into a video file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRenderer: Send + Sync {
    async fn render(
        &self,
        request: &RenderRequest,
        progress: Option<ProgressCallback>,
    ) -> WorkerResult<PathBuf>;
}
