//! Remotion progress parsing.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

static FRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)/(\d+)\]").expect("frame pattern is valid"));
static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)%").expect("percent pattern is valid"));

/// Render phase reported by the Remotion CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStep {
    Bundling,
    Rendering,
    Encoding,
    Stitching,
    Finalizing,
}

impl RenderStep {
    pub const ALL: [RenderStep; 5] = [
        RenderStep::Bundling,
        RenderStep::Rendering,
        RenderStep::Encoding,
        RenderStep::Stitching,
        RenderStep::Finalizing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStep::Bundling => "Bundling",
            RenderStep::Rendering => "Rendering",
            RenderStep::Encoding => "Encoding",
            RenderStep::Stitching => "Stitching",
            RenderStep::Finalizing => "Finalizing",
        }
    }
}

/// Progress information from one line of Remotion output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderProgress {
    /// Current frame
    pub frame: Option<u64>,
    /// Total frames in the composition
    pub total_frames: Option<u64>,
    /// Completion percentage (0-100)
    pub percent: Option<f64>,
    /// Current phase
    pub step: Option<RenderStep>,
}

/// Callback type for progress updates.
///
/// Shared between the stdout and stderr readers.
pub type ProgressCallback = Arc<dyn Fn(RenderProgress) + Send + Sync + 'static>;

/// Parse a line of Remotion output.
///
/// Frame counters (`[123/900]`) take precedence over bare percentages
/// (`45%`), which take precedence over step names.
pub fn parse_progress_line(line: &str) -> Option<RenderProgress> {
    if let Some(caps) = FRAME_RE.captures(line) {
        let frame: u64 = caps[1].parse().ok()?;
        let total: u64 = caps[2].parse().ok()?;
        let percent = (total > 0).then(|| frame as f64 / total as f64 * 100.0);
        return Some(RenderProgress {
            frame: Some(frame),
            total_frames: Some(total),
            percent,
            step: None,
        });
    }

    if let Some(caps) = PERCENT_RE.captures(line) {
        let percent: f64 = caps[1].parse().ok()?;
        return Some(RenderProgress {
            percent: Some(percent),
            ..Default::default()
        });
    }

    let lower = line.to_lowercase();
    RenderStep::ALL
        .into_iter()
        .find(|step| lower.contains(&step.as_str().to_lowercase()))
        .map(|step| RenderProgress {
            step: Some(step),
            ..Default::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_counter() {
        let progress = parse_progress_line("Rendered frames [450/900]").unwrap();
        assert_eq!(progress.frame, Some(450));
        assert_eq!(progress.total_frames, Some(900));
        assert!((progress.percent.unwrap() - 50.0).abs() < 0.01);
        assert_eq!(progress.step, None);
    }

    #[test]
    fn test_zero_total_frames_has_no_percent() {
        let progress = parse_progress_line("[0/0]").unwrap();
        assert_eq!(progress.percent, None);
    }

    #[test]
    fn test_percentage() {
        let progress = parse_progress_line("Encoding 73%").unwrap();
        assert_eq!(progress.percent, Some(73.0));
        // A percentage wins over the step word on the same line.
        assert_eq!(progress.step, None);
    }

    #[test]
    fn test_step_words_case_insensitive() {
        assert_eq!(
            parse_progress_line("bundling video...").unwrap().step,
            Some(RenderStep::Bundling)
        );
        assert_eq!(
            parse_progress_line("STITCHING audio").unwrap().step,
            Some(RenderStep::Stitching)
        );
    }

    #[test]
    fn test_unrelated_line() {
        assert!(parse_progress_line("Composition WireframeVideo").is_none());
        assert!(parse_progress_line("").is_none());
    }
}
