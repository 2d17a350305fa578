//! Shared data models for the VReel video pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Generated narration scripts (segments and keywords)
//! - Transcription timestamp segments
//! - Scene data handed to the renderer
//! - Generated topic ideas
//! - Duration formatting helpers

pub mod scene;
pub mod script;
pub mod timestamp;
pub mod topic;

// Re-export common types
pub use scene::{Pose, SceneData, SceneType};
pub use script::{
    GeneratedScript, Keyword, KeywordColor, ScriptSegment, ScriptValidationError, SegmentType,
};
pub use timestamp::{format_duration, total_duration, TimestampSegment};
pub use topic::{Topic, TopicIdea, TopicList};
