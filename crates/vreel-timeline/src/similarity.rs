//! Token-set similarity scoring.

use std::collections::HashSet;

use crate::normalize::normalize_text;

/// Set of whitespace-separated tokens from a normalized string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: HashSet<String>,
}

impl TokenSet {
    /// Tokenize text that is already normalized.
    pub fn from_normalized(normalized: &str) -> Self {
        Self {
            tokens: normalized.split_whitespace().map(str::to_owned).collect(),
        }
    }

    /// Normalize then tokenize raw text.
    pub fn from_text(text: &str) -> Self {
        Self::from_normalized(&normalize_text(text))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Jaccard index `|A ∩ B| / |A ∪ B|`; 0 when either side is empty.
    pub fn jaccard(&self, other: &TokenSet) -> f64 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }

        let intersection = self.tokens.intersection(&other.tokens).count();
        let union = self.tokens.len() + other.tokens.len() - intersection;

        intersection as f64 / union as f64
    }
}

/// Similarity in `[0, 1]` between two normalized strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    TokenSet::from_normalized(a).jaccard(&TokenSet::from_normalized(b))
}
