/*!
 * Correction engine for subtitle tracks.
 *
 * This module turns a track into provider requests and back. It is split
 * into several submodules:
 *
 * - `tokens`: Token estimation used to size chunks
 * - `chunker`: Splitting cues into overlapping chunks
 * - `markers`: Joining cue texts with a separator and splitting answers
 * - `formatting`: Shielding ASS override tags and line breaks
 * - `reassembler`: Mapping corrected chunks back onto cues
 * - `concurrency`: Provider-specific request limits
 * - `pipeline`: The orchestrator tying everything together
 */

// Re-export main types for easier usage
pub use self::chunker::{BatchMode, Chunk, Chunker, ChunkingConfig};
pub use self::concurrency::ProviderProfile;
pub use self::markers::{SegmentCodec, DEFAULT_SEPARATOR};
pub use self::pipeline::{CorrectionPipeline, PipelineOptions, PipelineOutput};
pub use self::reassembler::{
    ChunkFailure, ChunkReport, ChunkStatus, CorrectionReport, CorrectionResult, CueChange, Reassembler,
};
pub use self::tokens::{CharRatioEstimator, TokenEstimator, WordPunctuationEstimator};

// Submodules
pub mod chunker;
pub mod concurrency;
pub mod formatting;
pub mod markers;
pub mod pipeline;
pub mod reassembler;
pub mod tokens;
