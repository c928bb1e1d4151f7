//! Error types and token usage for GenX.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_token_count: i64,
    /// Number of tokens from cached content
    pub cached_content_token_count: i64,
    /// Number of tokens generated
    pub generated_token_count: i64,
}

impl Usage {
    /// Create a new Usage with all zero counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Usage with the given counts.
    pub fn with_counts(prompt: i64, cached: i64, generated: i64) -> Self {
        Self {
            prompt_token_count: prompt,
            cached_content_token_count: cached,
            generated_token_count: generated,
        }
    }

    /// Total tokens used (prompt + generated).
    pub fn total(&self) -> i64 {
        self.prompt_token_count + self.generated_token_count
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Usage(prompt={}, cached={}, generated={})",
            self.prompt_token_count, self.cached_content_token_count, self.generated_token_count
        )
    }
}

/// Error type for GenX operations.
#[derive(Error, Debug)]
pub enum GenxError {
    /// Transport failure before a response was received
    #[error("http error: {0}")]
    Http(String),

    /// Non-success status from the API
    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response was truncated before anything usable was produced
    #[error("response truncated (max tokens)")]
    Truncated(Usage),

    /// Response was blocked
    #[error("response blocked: {reason}")]
    Blocked { usage: Usage, reason: String },

    /// The response did not have the expected shape
    #[error("generation error: {message}")]
    Generation { usage: Usage, message: String },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl GenxError {
    /// Get the usage statistics if available.
    pub fn usage(&self) -> Option<&Usage> {
        match self {
            GenxError::Truncated(u) => Some(u),
            GenxError::Blocked { usage, .. } => Some(usage),
            GenxError::Generation { usage, .. } => Some(usage),
            _ => None,
        }
    }

    /// Check if the provider refused to answer.
    pub fn is_blocked(&self) -> bool {
        matches!(self, GenxError::Blocked { .. })
    }
}
