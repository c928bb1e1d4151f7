use serde::{Deserialize, Serialize};

/// Tuning knobs for [`ProductMatcher`](crate::ProductMatcher).
///
/// Fixed at construction. Missing fields deserialize to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherSettings {
    /// Hits requested from the vector search per query.
    pub top_k: usize,

    /// Minimum search score for a hit to count as a match.
    pub confidence_threshold: f64,

    /// Model turns before giving up on a final answer.
    pub max_iterations: usize,

    pub temperature: f32,

    pub max_tokens: i32,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            confidence_threshold: 0.7,
            max_iterations: 10,
            temperature: 0.3,
            max_tokens: 2000,
        }
    }
}

impl MatcherSettings {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }
}
