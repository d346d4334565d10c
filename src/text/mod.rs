//! Text cleansing and tokenization for review text.

use thiserror::Error;

mod normalizer;
mod stopwords;

pub use normalizer::{DEFAULT_NON_WORD_PATTERN, Normalizer, tokenize};
pub use stopwords::{ENGLISH_STOPWORDS, StopwordSet};

#[derive(Debug, Error)]
pub enum TextError {
    /// The configured non-word pattern failed to compile.
    #[error("invalid non-word pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}
