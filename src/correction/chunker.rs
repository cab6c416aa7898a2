/*!
 * Splitting a cue sequence into overlapping correction chunks.
 *
 * Every cue is owned by exactly one chunk. A chunk may additionally start
 * with a few cues owned by the previous chunk; those are sent as context only
 * and their corrections are discarded on reassembly.
 */

use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::ChunkingError;
use crate::subtitle_processor::Cue;

use super::tokens::TokenEstimator;

/// How chunk boundaries are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Fill chunks up to a token budget
    #[default]
    TokenBased,
    /// Fixed number of owned cues per chunk
    FixedSize,
}

/// Chunking parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Boundary strategy
    #[serde(default)]
    pub mode: BatchMode,

    /// Token budget for the owned part of a chunk
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Owned cues per chunk in fixed mode; 0 selects token mode
    #[serde(default)]
    pub fixed_batch_size: usize,

    /// Context cues repeated from the previous chunk
    #[serde(default = "default_overlap_size")]
    pub overlap_size: usize,
}

fn default_max_tokens() -> usize {
    5000
}

fn default_overlap_size() -> usize {
    2
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            mode: BatchMode::default(),
            max_tokens: default_max_tokens(),
            fixed_batch_size: 0,
            overlap_size: default_overlap_size(),
        }
    }
}

impl ChunkingConfig {
    /// Token-based configuration
    pub fn token_based(max_tokens: usize, overlap_size: usize) -> Self {
        Self {
            mode: BatchMode::TokenBased,
            max_tokens,
            fixed_batch_size: 0,
            overlap_size,
        }
    }

    /// Fixed-size configuration
    pub fn fixed_size(fixed_batch_size: usize, overlap_size: usize) -> Self {
        Self {
            mode: BatchMode::FixedSize,
            max_tokens: default_max_tokens(),
            fixed_batch_size,
            overlap_size,
        }
    }

    /// Mode actually used; a zero batch size always means token mode
    pub fn effective_mode(&self) -> BatchMode {
        if self.fixed_batch_size == 0 {
            BatchMode::TokenBased
        } else {
            self.mode
        }
    }

    /// Check the configuration before any work is done
    pub fn validate(&self) -> Result<(), ChunkingError> {
        if self.max_tokens == 0 {
            return Err(ChunkingError::InvalidTokenBudget(self.max_tokens));
        }
        Ok(())
    }
}

/// Contiguous range of cues sent together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of the chunk in dispatch order
    pub id: usize,

    /// First cue position (inclusive)
    pub start: usize,

    /// Last cue position (exclusive)
    pub end: usize,

    /// Leading context-only cues
    pub overlap_prefix_count: usize,

    /// Trailing context-only cues
    pub overlap_suffix_count: usize,

    /// Estimated cost of the full payload, separators included
    pub estimated_tokens: usize,
}

impl Chunk {
    /// Total cues in the chunk, context included
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Positions of the cues whose correction this chunk decides
    pub fn owned_range(&self) -> Range<usize> {
        (self.start + self.overlap_prefix_count)..(self.end - self.overlap_suffix_count)
    }

    /// Number of owned cues
    pub fn owned_count(&self) -> usize {
        self.owned_range().len()
    }

    /// Whether the cue at `position` is owned by this chunk
    pub fn owns(&self, position: usize) -> bool {
        self.owned_range().contains(&position)
    }

    /// Borrow the chunk's cues from the track
    pub fn cues<'a>(&self, cues: &'a [Cue]) -> &'a [Cue] {
        &cues[self.start..self.end]
    }
}

/// Splits cue sequences into chunks
#[derive(Clone)]
pub struct Chunker {
    estimator: Arc<dyn TokenEstimator>,
    separator_tokens: usize,
}

impl Chunker {
    /// Create a chunker; separators between cues are charged at the estimate of `separator`
    pub fn new(estimator: Arc<dyn TokenEstimator>, separator: &str) -> Self {
        let separator_tokens = estimator.estimate(separator);
        Self {
            estimator,
            separator_tokens,
        }
    }

    /// Split `cues` into chunks that together own every cue exactly once
    pub fn split(&self, cues: &[Cue], config: &ChunkingConfig) -> Result<Vec<Chunk>, ChunkingError> {
        config.validate()?;

        let costs: Vec<usize> = cues.iter().map(|cue| self.estimator.estimate(&cue.text)).collect();
        let mode = config.effective_mode();

        let mut chunks = Vec::new();
        let mut owned_start = 0;
        let mut prefix = 0;

        while owned_start < cues.len() {
            let owned_end = match mode {
                BatchMode::FixedSize => (owned_start + config.fixed_batch_size).min(cues.len()),
                BatchMode::TokenBased => self.token_bounded_end(&costs, owned_start, config.max_tokens),
            };

            let start = owned_start - prefix;
            let chunk = Chunk {
                id: chunks.len(),
                start,
                end: owned_end,
                overlap_prefix_count: prefix,
                overlap_suffix_count: 0,
                estimated_tokens: self.payload_cost(&costs[start..owned_end]),
            };

            prefix = config.overlap_size.min(chunk.len());
            owned_start = owned_end;
            chunks.push(chunk);
        }

        Ok(chunks)
    }

    // Oversized cues still get a chunk of their own
    fn token_bounded_end(&self, costs: &[usize], owned_start: usize, max_tokens: usize) -> usize {
        let mut end = owned_start + 1;
        let mut total = costs[owned_start];

        while end < costs.len() {
            let next = total + self.separator_tokens + costs[end];
            if next > max_tokens {
                break;
            }
            total = next;
            end += 1;
        }

        end
    }

    fn payload_cost(&self, costs: &[usize]) -> usize {
        let separators = costs.len().saturating_sub(1) * self.separator_tokens;
        costs.iter().sum::<usize>() + separators
    }
}
