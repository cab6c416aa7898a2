/*!
 * Segment codec: joining cue texts for a single request and splitting the
 * corrected answer back into per-cue segments.
 */

use crate::errors::{ChunkingError, ReassemblyError};

/// Separator the built-in instructions tell the model to keep
pub const DEFAULT_SEPARATOR: &str = "§SEP§";

/// Joins and splits cue texts around a separator token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentCodec {
    separator: String,
}

impl Default for SegmentCodec {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl SegmentCodec {
    /// Create a codec with a custom separator
    pub fn new(separator: impl Into<String>) -> Result<Self, ChunkingError> {
        let separator = separator.into();
        if separator.trim().is_empty() {
            return Err(ChunkingError::EmptySeparator);
        }
        Ok(Self { separator })
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Join texts with the separator, in order
    pub fn encode<S: AsRef<str>>(&self, texts: &[S]) -> String {
        texts
            .iter()
            .map(|text| text.as_ref())
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    /// Split a response into exactly `expected` trimmed segments
    pub fn decode(&self, text: &str, expected: usize) -> Result<Vec<String>, ReassemblyError> {
        let segments: Vec<String> = text
            .split(self.separator.as_str())
            .map(|segment| segment.trim().to_string())
            .collect();

        if segments.len() != expected {
            return Err(ReassemblyError::SegmentCountMismatch {
                expected,
                received: segments.len(),
            });
        }

        Ok(segments)
    }
}
