//! Chained scene timeline construction.
//!
//! Every script segment gets an even share of the narration as its
//! provisional slot; a confident transcript match may move the slot's end.
//! The start of each interval is always the end of the previous one, so the
//! output covers `[0, total]` with no gaps or overlaps.

use tracing::warn;
use vreel_models::{total_duration, ScriptSegment, TimestampSegment};

use crate::matcher::{SegmentMatcher, TimeWindow};

/// Seconds allotted per segment when no transcript is available.
pub const FALLBACK_SECS_PER_SEGMENT: f64 = 3.0;

/// Where an interval's end came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalSource {
    /// End taken from a confidently matched timestamp segment.
    Matched { timestamp_index: usize },
    /// End taken from the even split of the remaining time.
    EvenSplit,
}

/// Final `[start, end)` of one script segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneInterval {
    pub start: f64,
    pub end: f64,
    pub source: IntervalSource,
}

impl SceneInterval {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Timeline length for `segment_count` segments.
///
/// The transcript's last `end` when present and usable, otherwise
/// [`FALLBACK_SECS_PER_SEGMENT`] per segment.
pub fn resolve_total_duration(segment_count: usize, timestamps: &[TimestampSegment]) -> f64 {
    let fallback = FALLBACK_SECS_PER_SEGMENT * segment_count as f64;

    match total_duration(timestamps) {
        Some(total) if total.is_finite() && total > 0.0 => total,
        Some(total) => {
            warn!(total, fallback, "Unusable transcript duration, using fallback");
            fallback
        }
        None => fallback,
    }
}

/// Assign a chained interval to every segment, in order.
pub fn build_timeline(
    segments: &[ScriptSegment],
    timestamps: &[TimestampSegment],
) -> Vec<SceneInterval> {
    let count = segments.len();
    if count == 0 {
        return Vec::new();
    }

    let total = resolve_total_duration(count, timestamps);
    let avg = total / count as f64;
    let matcher = SegmentMatcher::new(timestamps);

    let (_, intervals) = segments.iter().enumerate().fold(
        (0.0_f64, Vec::with_capacity(count)),
        |(cursor, mut intervals), (index, segment)| {
            let slot = Slot {
                cursor,
                remaining: count - index,
                total,
                avg,
            };
            let interval = slot.resolve(&matcher, segment);
            intervals.push(interval);
            (interval.end, intervals)
        },
    );

    intervals
}

/// Per-segment fold state.
struct Slot {
    cursor: f64,
    /// Segments left including this one
    remaining: usize,
    total: f64,
    avg: f64,
}

impl Slot {
    fn is_last(&self) -> bool {
        self.remaining == 1
    }

    /// Even-split end, capped so every later segment keeps a positive share.
    fn provisional_end(&self) -> f64 {
        if self.is_last() {
            return self.total;
        }
        let share = (self.total - self.cursor) / self.remaining as f64;
        self.cursor + self.avg.min(share)
    }

    fn resolve(&self, matcher: &SegmentMatcher<'_>, segment: &ScriptSegment) -> SceneInterval {
        let provisional_end = self.provisional_end();
        let window = TimeWindow::new(self.cursor, provisional_end);
        let found = matcher.best_match(&segment.text, window);

        let (end, source) = match found {
            // The final boundary is pinned to the narration length.
            Some(m) if self.is_last() => (
                self.total,
                IntervalSource::Matched {
                    timestamp_index: m.index,
                },
            ),
            Some(m) if m.segment.end > self.cursor && m.segment.end < self.total => (
                m.segment.end,
                IntervalSource::Matched {
                    timestamp_index: m.index,
                },
            ),
            _ => (provisional_end, IntervalSource::EvenSplit),
        };

        SceneInterval {
            start: self.cursor,
            end,
            source,
        }
    }
}
