//! Script segment to timestamp segment matching.
//!
//! Each candidate is scored by textual similarity weighted by whether it
//! falls inside the segment's approximate time window. Candidates whose raw
//! similarity does not clear [`MIN_SIMILARITY`] are never selected, however
//! well they agree in time.

use vreel_models::TimestampSegment;

use crate::similarity::TokenSet;

/// Raw similarity a candidate must exceed to be selected.
pub const MIN_SIMILARITY: f64 = 0.3;

/// Slack added to the upper bound of the window (never the lower).
pub const WINDOW_END_TOLERANCE_SECS: f64 = 2.0;

/// Score multiplier for candidates inside the window.
pub const IN_RANGE_WEIGHT: f64 = 1.5;

/// Score multiplier for candidates outside the window.
pub const OUT_OF_RANGE_WEIGHT: f64 = 0.5;

/// Approximate `[start, end]` where a script segment is expected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// True when `candidate` lies within the window, allowing
    /// [`WINDOW_END_TOLERANCE_SECS`] past its end.
    pub fn contains(&self, candidate: &TimestampSegment) -> bool {
        candidate.start >= self.start && candidate.end <= self.end + WINDOW_END_TOLERANCE_SECS
    }
}

/// A confident match for one script segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentMatch<'a> {
    /// Position of the matched segment in the candidate sequence
    pub index: usize,
    pub segment: &'a TimestampSegment,
    pub similarity: f64,
    pub score: f64,
    pub in_range: bool,
}

/// Matcher over a fixed candidate sequence.
///
/// Candidate texts are tokenized once up front so repeated lookups only
/// tokenize the script side.
#[derive(Debug, Clone)]
pub struct SegmentMatcher<'a> {
    candidates: &'a [TimestampSegment],
    tokens: Vec<TokenSet>,
}

impl<'a> SegmentMatcher<'a> {
    pub fn new(candidates: &'a [TimestampSegment]) -> Self {
        let tokens = candidates.iter().map(|c| TokenSet::from_text(&c.text)).collect();
        Self { candidates, tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Highest-scoring candidate above the similarity floor, or `None`.
    ///
    /// Ties keep the earliest candidate.
    pub fn best_match(&self, script_text: &str, window: TimeWindow) -> Option<SegmentMatch<'a>> {
        if self.candidates.is_empty() {
            return None;
        }

        let script_tokens = TokenSet::from_text(script_text);
        let mut best: Option<SegmentMatch<'a>> = None;

        for (index, (candidate, tokens)) in self.candidates.iter().zip(&self.tokens).enumerate() {
            let similarity = script_tokens.jaccard(tokens);
            if similarity <= MIN_SIMILARITY {
                continue;
            }

            let in_range = window.contains(candidate);
            let weight = if in_range {
                IN_RANGE_WEIGHT
            } else {
                OUT_OF_RANGE_WEIGHT
            };
            let score = similarity * weight;

            if best.map_or(true, |b| score > b.score) {
                best = Some(SegmentMatch {
                    index,
                    segment: candidate,
                    similarity,
                    score,
                    in_range,
                });
            }
        }

        best
    }
}

/// One-shot form of [`SegmentMatcher::best_match`].
pub fn find_best_match<'a>(
    script_text: &str,
    candidates: &'a [TimestampSegment],
    window: TimeWindow,
) -> Option<SegmentMatch<'a>> {
    SegmentMatcher::new(candidates).best_match(script_text, window)
}
