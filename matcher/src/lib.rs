//! Product matching for retail visit transcripts.
//!
//! [`ProductMatcher`] drives a function-calling conversation with a
//! language model. The model asks for catalog lookups through the
//! `search_products` tool; each lookup embeds the query, runs a vector
//! search and feeds the hits above the confidence threshold back into the
//! conversation. When the model answers in text, its JSON verdict is
//! reconciled with the hits collected along the way into a
//! [`ProcessingResult`].
//!
//! ```rust,ignore
//! let matcher = ProductMatcher::new(generator, embedder, search, MatcherSettings::default());
//! let result = matcher.process("Na polici je Castrol Magnatec pětilitrový A5.").await?;
//! println!("{}", result.to_summary());
//! ```

mod error;
mod matcher;
mod models;
mod prompt;
mod settings;
mod tools;

pub use error::MatchError;
pub use matcher::ProductMatcher;
pub use models::{MatchedProduct, ProcessingResult, TranscriptSample};
pub use prompt::{SEARCH_TOOL_NAME, SYSTEM_PROMPT, SearchArgs, search_tool, user_message};
pub use settings::MatcherSettings;
pub use tools::{SearchCandidate, SearchProducts, ToolHandler, ToolOutput, ToolTable};
