use shelfmatch_genx::GenxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    /// The transcript was empty or whitespace only.
    #[error("match: transcript text cannot be empty")]
    InvalidInput,

    /// The language model call failed. Never swallowed.
    #[error("match: model error: {0}")]
    Model(#[from] GenxError),

    /// A result value failed validation.
    #[error("match: invalid result: {0}")]
    InvalidResult(String),
}
