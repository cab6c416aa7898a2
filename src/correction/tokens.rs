/*!
 * Token cost estimation.
 *
 * The chunker only needs a deterministic, monotone cost for a piece of text.
 * Exact vendor tokenization is not required, so estimators are swappable.
 */

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());
static PUNCTUATION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Deterministic text cost function used for batching
pub trait TokenEstimator: Send + Sync {
    /// Estimated token count of `text`
    fn estimate(&self, text: &str) -> usize;
}

/// Counts word runs plus individual punctuation characters
#[derive(Debug, Clone, Copy, Default)]
pub struct WordPunctuationEstimator;

impl TokenEstimator for WordPunctuationEstimator {
    fn estimate(&self, text: &str) -> usize {
        WORD_REGEX.find_iter(text).count() + PUNCTUATION_REGEX.find_iter(text).count()
    }
}

/// Approximates tokens as a fixed number of characters each
#[derive(Debug, Clone, Copy)]
pub struct CharRatioEstimator {
    /// Characters per token, must be positive
    pub chars_per_token: usize,
}

impl CharRatioEstimator {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl Default for CharRatioEstimator {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token.max(1))
    }
}
