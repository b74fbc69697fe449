//! Token counting module - cl100k_base BPE token counts
//!
//! The vocabulary is loaded once into a `TokenCounter` value which is then
//! passed by reference to whoever needs to count. There is no global state.
//!
//! Usage:
//! ```rust,ignore
//! let counter = TokenCounter::cl100k()?;
//! assert_eq!(counter.count("hello world"), 2);
//! ```

use std::fmt;
use tiktoken_rs::{cl100k_base, CoreBPE};

use crate::core::error::TokscanError;

/// Name of the fixed vocabulary
pub const ENCODING_NAME: &str = "cl100k_base";

/// Immutable token counter over the cl100k_base vocabulary
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    /// Build the cl100k_base encoder
    pub fn cl100k() -> Result<Self, TokscanError> {
        let bpe = cl100k_base().map_err(|e| TokscanError::Tokenizer {
            name: ENCODING_NAME,
            message: e.to_string(),
        })?;
        Ok(Self { bpe })
    }

    /// Number of tokens in `text`, with no normalization or truncation
    pub fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_with_special_tokens(text).len()
    }
}

impl fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCounter")
            .field("encoding", &ENCODING_NAME)
            .finish()
    }
}
