//! Type-specific scene presentation fields.

use std::sync::LazyLock;

use regex::Regex;
use vreel_models::{Pose, SceneData, SceneType, ScriptSegment, SegmentType};

use crate::builder::SceneInterval;

/// Character limits for truncated display text.
pub const PAIN_HIGHLIGHT_MAX_CHARS: usize = 50;
pub const SOLUTION_TITLE_MAX_CHARS: usize = 30;
pub const CLOSING_TITLE_MAX_CHARS: usize = 40;

const ELLIPSIS: &str = "...";

/// Title/subtitle split points, tried in order: sentence end, comma, newline.
static SPLIT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"[。！？.!?]\s*", r"[,，]\s*", r"\n"]
        .iter()
        .map(|p| Regex::new(p).expect("split pattern is valid"))
        .collect()
});

/// Scene layout and mascot pose for a segment type.
pub fn scene_mapping(segment_type: SegmentType) -> (SceneType, Pose) {
    match segment_type {
        SegmentType::Opening => (SceneType::Title, Pose::Peek),
        SegmentType::Pain => (SceneType::Pain, Pose::Point),
        SegmentType::Solution => (SceneType::Emphasis, Pose::Think),
        SegmentType::Closing => (SceneType::Circle, Pose::Celebrate),
    }
}

/// Scene for the segment at `index`, placed at `interval`.
pub fn build_scene(interval: &SceneInterval, segment: &ScriptSegment, index: usize) -> SceneData {
    let (scene_type, pose) = scene_mapping(segment.segment_type);
    let mut scene = SceneData::new(interval.start, interval.end, scene_type, pose);
    let text = segment.text.as_str();

    match segment.segment_type {
        SegmentType::Opening => {
            let (title, subtitle) = split_title(text);
            scene.title = Some(title);
            scene.subtitle = Some(subtitle);
        }
        SegmentType::Pain => {
            scene.highlight = Some(truncate_chars(text, PAIN_HIGHLIGHT_MAX_CHARS));
        }
        SegmentType::Solution => {
            scene.number = Some(index.to_string());
            scene.title = Some(truncate_chars(text, SOLUTION_TITLE_MAX_CHARS));
        }
        SegmentType::Closing => {
            scene.title = Some(truncate_chars(text, CLOSING_TITLE_MAX_CHARS));
        }
    }

    scene
}

/// `text` unchanged if it has at most `max_chars` characters, otherwise its
/// first `max_chars` characters followed by `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Split text into a title and a subtitle.
///
/// The first split pattern whose first occurrence leaves non-empty text on
/// both sides wins; the delimiter stays with the title. Falls back to
/// halving the text by character count.
pub fn split_title(text: &str) -> (String, String) {
    for pattern in SPLIT_PATTERNS.iter() {
        if let Some(m) = pattern.find(text) {
            let first = text[..m.end()].trim();
            let second = text[m.end()..].trim();
            if !first.is_empty() && !second.is_empty() {
                return (first.to_string(), second.to_string());
            }
        }
    }

    let mid = text.chars().count() / 2;
    let byte_mid = text
        .char_indices()
        .nth(mid)
        .map_or(text.len(), |(idx, _)| idx);
    (
        text[..byte_mid].trim().to_string(),
        text[byte_mid..].trim().to_string(),
    )
}
