//! Narration script models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Narrative role of a script segment.
///
/// The set is closed: a provider response carrying any other value fails
/// to deserialize instead of reaching scene orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    Opening,
    Pain,
    Solution,
    Closing,
}

impl SegmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentType::Opening => "opening",
            SegmentType::Pain => "pain",
            SegmentType::Solution => "solution",
            SegmentType::Closing => "closing",
        }
    }
}

impl std::fmt::Display for SegmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One narrative segment of a script, in spoken order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptSegment {
    /// Segment text as it will be narrated
    pub text: String,

    /// Segment role
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
}

impl ScriptSegment {
    pub fn new(text: impl Into<String>, segment_type: SegmentType) -> Self {
        Self {
            text: text.into(),
            segment_type,
        }
    }
}

/// Display color for a highlighted keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum KeywordColor {
    Cyan,
    Gold,
    Red,
}

impl KeywordColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordColor::Cyan => "cyan",
            KeywordColor::Gold => "gold",
            KeywordColor::Red => "red",
        }
    }
}

/// Keyword extracted from the script for on-screen emphasis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Keyword {
    pub word: String,
    pub color: KeywordColor,
}

/// Script produced by the script-generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedScript {
    /// Full narration text, fed to speech synthesis as-is
    pub script: String,

    /// Keywords to highlight
    pub keywords: Vec<Keyword>,

    /// Ordered narrative segments
    pub segments: Vec<ScriptSegment>,
}

impl GeneratedScript {
    /// Check the structural requirements serde cannot express.
    pub fn validate(&self) -> Result<(), ScriptValidationError> {
        if self.script.trim().is_empty() {
            return Err(ScriptValidationError::EmptyScript);
        }

        if self.segments.is_empty() {
            return Err(ScriptValidationError::NoSegments);
        }

        if let Some(index) = self.segments.iter().position(|s| s.text.trim().is_empty()) {
            return Err(ScriptValidationError::EmptySegment(index));
        }

        if let Some(index) = self.keywords.iter().position(|k| k.word.trim().is_empty()) {
            return Err(ScriptValidationError::EmptyKeyword(index));
        }

        Ok(())
    }

    /// Render the script as a human-readable listing.
    pub fn format(&self) -> String {
        let mut output = String::new();
        output.push_str("=== Script ===\n");
        output.push_str(&self.script);
        output.push_str("\n\n=== Keywords ===\n");
        for keyword in &self.keywords {
            output.push_str(&format!(
                "[{}] {}\n",
                keyword.color.as_str().to_uppercase(),
                keyword.word
            ));
        }
        output.push_str("\n=== Segments ===\n");
        for segment in &self.segments {
            output.push_str(&format!("[{}] {}\n", segment.segment_type, segment.text));
        }
        output
    }

    /// JSON Schema describing the expected provider output.
    pub fn json_schema() -> String {
        let schema = schemars::schema_for!(GeneratedScript);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }
}

/// Structural problems in a generated script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptValidationError {
    #[error("script text is empty")]
    EmptyScript,

    #[error("script has no segments")]
    NoSegments,

    #[error("segment {0} has empty text")]
    EmptySegment(usize),

    #[error("keyword {0} has an empty word")]
    EmptyKeyword(usize),
}
