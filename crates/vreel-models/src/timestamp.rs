//! Transcription timestamp segments and duration formatting.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A time-bounded span of recognized speech.
///
/// Sequences are ordered by `start`; neighbours may leave small gaps but
/// never regress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimestampSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Recognized text
    pub text: String,
}

impl TimestampSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when the bounds are finite, non-negative and strictly increasing.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.end > self.start
    }
}

/// Narration length: the `end` of the last segment.
pub fn total_duration(segments: &[TimestampSegment]) -> Option<f64> {
    segments.last().map(|s| s.end)
}

/// Format a narration or run length for humans.
///
/// Rounded to tenths of a second and shown as `M:SS.s`; from one hour on
/// the tenths are dropped and the form is `H:MM:SS`. Negative and NaN
/// inputs format as zero.
///
/// # Examples
/// ```
/// use vreel_models::format_duration;
/// assert_eq!(format_duration(42.37), "0:42.4");
/// assert_eq!(format_duration(90.0), "1:30.0");
/// assert_eq!(format_duration(3725.0), "1:02:05");
/// ```
pub fn format_duration(secs: f64) -> String {
    let tenths = (secs.max(0.0) * 10.0).round() as u64;
    let whole = tenths / 10;
    let (hours, mins, secs) = (whole / 3600, (whole % 3600) / 60, whole % 60);

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}.{}", mins, secs, tenths % 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_duration() {
        assert_eq!(total_duration(&[]), None);

        let segments = vec![
            TimestampSegment::new(0.0, 2.5, "a"),
            TimestampSegment::new(2.7, 5.0, "b"),
        ];
        assert_eq!(total_duration(&segments), Some(5.0));
    }

    #[test]
    fn test_validity() {
        assert!(TimestampSegment::new(0.0, 0.1, "a").is_valid());
        assert!(!TimestampSegment::new(1.0, 1.0, "a").is_valid());
        assert!(!TimestampSegment::new(-1.0, 1.0, "a").is_valid());
        assert!(!TimestampSegment::new(0.0, f64::NAN, "a").is_valid());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0:00.0");
        assert_eq!(format_duration(9.5), "0:09.5");
        assert_eq!(format_duration(61.04), "1:01.0");
        assert_eq!(format_duration(3661.0), "1:01:01");
    }

    #[test]
    fn test_format_duration_rounds_into_next_minute() {
        assert_eq!(format_duration(59.96), "1:00.0");
        assert_eq!(format_duration(3599.97), "1:00:00");
    }

    #[test]
    fn test_format_duration_clamps_bad_input() {
        assert_eq!(format_duration(-3.0), "0:00.0");
        assert_eq!(format_duration(f64::NAN), "0:00.0");
    }

    #[test]
    fn test_deserialize() {
        let segment: TimestampSegment =
            serde_json::from_str(r#"{"start": 0, "end": 2.5, "text": "hi"}"#).unwrap();
        assert_eq!(segment.end, 2.5);
        assert!((segment.duration() - 2.5).abs() < f64::EPSILON);
    }
}
