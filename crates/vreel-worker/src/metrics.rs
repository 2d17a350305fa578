//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; whoever embeds the pipeline
//! decides whether to install a recorder.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Stage latency in seconds by stage.
    pub const STAGE_DURATION_SECONDS: &str = "vreel_stage_duration_seconds";

    /// Stage completions by stage and outcome.
    pub const STAGE_OUTCOMES_TOTAL: &str = "vreel_stage_outcomes_total";

    /// Retry attempts by operation.
    pub const RETRIES_TOTAL: &str = "vreel_retries_total";

    /// Script segments aligned to a transcript segment.
    pub const SEGMENTS_MATCHED_TOTAL: &str = "vreel_segments_matched_total";

    /// Script segments that kept their even-split interval.
    pub const SEGMENTS_FALLBACK_TOTAL: &str = "vreel_segments_fallback_total";

    /// Finished videos by outcome.
    pub const VIDEOS_TOTAL: &str = "vreel_videos_total";
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Record one finished pipeline stage.
pub fn record_stage(stage: &'static str, success: bool, duration_secs: f64) {
    counter!(
        names::STAGE_OUTCOMES_TOTAL,
        "stage" => stage,
        "outcome" => outcome(success)
    )
    .increment(1);

    histogram!(names::STAGE_DURATION_SECONDS, "stage" => stage).record(duration_secs);
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    counter!(
        names::RETRIES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record how a script was aligned.
pub fn record_alignment(matched: usize, fallback: usize) {
    counter!(names::SEGMENTS_MATCHED_TOTAL).increment(matched as u64);
    counter!(names::SEGMENTS_FALLBACK_TOTAL).increment(fallback as u64);
}

/// Record a finished video.
pub fn record_video(success: bool) {
    counter!(names::VIDEOS_TOTAL, "outcome" => outcome(success)).increment(1);
}
