//! Scene timing alignment.
//!
//! Reconciles a narration script (with its own segment boundaries) against
//! a transcription of the synthesized audio (with unrelated boundaries) and
//! produces a chained, gap-free scene timeline:
//!
//! - [`normalize`]: comparison-form text
//! - [`similarity`]: Jaccard index over token sets
//! - [`matcher`]: best timestamp segment for one script segment
//! - [`builder`]: chained interval per script segment
//! - [`enricher`]: type-specific display fields
//!
//! Everything here is synchronous and deterministic.

pub mod builder;
pub mod enricher;
pub mod matcher;
pub mod normalize;
pub mod similarity;

use tracing::{debug, info};
use vreel_models::{GeneratedScript, SceneData, ScriptSegment, TimestampSegment};

pub use builder::{build_timeline, resolve_total_duration, IntervalSource, SceneInterval};
pub use enricher::{build_scene, scene_mapping};
pub use matcher::{SegmentMatch, SegmentMatcher, TimeWindow};
pub use normalize::normalize_text;
pub use similarity::{similarity, TokenSet};

/// Result of orchestrating one script against one transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Orchestration {
    /// One scene per script segment, in order
    pub scenes: Vec<SceneData>,
    /// Timeline length the scenes cover
    pub total_duration: f64,
    /// Segments whose interval came from a confident match
    pub matched_segments: usize,
}

impl Orchestration {
    /// Segments that kept their even-split interval because no transcript
    /// segment matched them confidently.
    pub fn fallback_segments(&self) -> usize {
        self.scenes.len().saturating_sub(self.matched_segments)
    }
}

/// Build scene data for a generated script.
pub fn orchestrate_scenes(
    script: &GeneratedScript,
    timestamps: &[TimestampSegment],
) -> Orchestration {
    orchestrate_segments(&script.segments, timestamps)
}

/// Build scene data for an ordered segment list.
pub fn orchestrate_segments(
    segments: &[ScriptSegment],
    timestamps: &[TimestampSegment],
) -> Orchestration {
    info!(
        segment_count = segments.len(),
        timestamp_count = timestamps.len(),
        "Starting scene orchestration"
    );

    let intervals = build_timeline(segments, timestamps);
    let total_duration = intervals
        .last()
        .map_or_else(|| resolve_total_duration(0, timestamps), |i| i.end);

    let mut matched_segments = 0;
    let scenes: Vec<SceneData> = segments
        .iter()
        .zip(&intervals)
        .enumerate()
        .map(|(index, (segment, interval))| {
            if let IntervalSource::Matched { timestamp_index } = interval.source {
                matched_segments += 1;
                debug!(
                    segment = index,
                    timestamp = timestamp_index,
                    start = interval.start,
                    end = interval.end,
                    "Segment aligned to transcript"
                );
            }
            build_scene(interval, segment, index)
        })
        .collect();

    info!(
        scene_count = scenes.len(),
        matched = matched_segments,
        total_duration,
        "Scene orchestration completed"
    );

    Orchestration {
        scenes,
        total_duration,
        matched_segments,
    }
}
