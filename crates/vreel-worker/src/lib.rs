//! Short-form video pipeline.
//!
//! This crate provides:
//! - Topic and script generation, speech synthesis and transcription clients
//! - Collaborator traits the pipeline is assembled from
//! - The `VideoPipeline` for single topics and batches
//! - Artifact persistence and resume from saved artifacts
//! - Retry, structured job logging and metrics

mod anthropic;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod renderer;
pub mod retry;
pub mod script_generator;
pub mod services;
pub mod topic_generator;
pub mod transcription;
pub mod tts;

pub use artifacts::{load_json, save_artifacts, ArtifactPaths};
pub use config::PipelineConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::{init_tracing, JobLogger};
pub use pipeline::{
    renderer_available, scenes_from_artifacts, BatchItem, PipelineProgress,
    PipelineProgressCallback, PipelineStep, VideoCreationResult, VideoOptions, VideoPipeline,
};
pub use renderer::RemotionVideoRenderer;
pub use script_generator::AnthropicScriptGenerator;
pub use services::{ScriptGenerator, SpeechOptions, SpeechSynthesizer, Transcriber, VideoRenderer};
pub use topic_generator::TopicGenerator;
pub use transcription::WhisperTranscriber;
pub use tts::MiniMaxSynthesizer;
