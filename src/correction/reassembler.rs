/*!
 * Mapping corrected chunk text back onto the cue structure.
 *
 * Results are applied in chunk id order. For every chunk only the owned cues
 * are written; the segments of overlap-only cues are dropped. A chunk whose
 * answer cannot be mapped cleanly is skipped as a whole, leaving its cues
 * with their original text.
 */

use std::fmt;

use log::{debug, error, warn};
use uuid::Uuid;

use crate::errors::{ProviderError, ReassemblyError};
use crate::subtitle_processor::{Cue, Track};

use super::chunker::Chunk;
use super::formatting::{ShieldedText, TagShield};
use super::markers::SegmentCodec;

/// Why a chunk produced no usable correction
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkFailure {
    /// The provider call failed or timed out
    Provider(ProviderError),
    /// The answer could not be mapped onto the cues
    Reassembly(ReassemblyError),
    /// The run was cancelled before the chunk was dispatched
    Cancelled,
}

impl fmt::Display for ChunkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(e) => write!(f, "provider failure: {}", e),
            Self::Reassembly(e) => write!(f, "reassembly failure: {}", e),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of sending one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionResult {
    /// The chunk that was sent
    pub chunk: Chunk,
    /// Corrected text of the whole chunk, or why there is none
    pub outcome: Result<String, ChunkFailure>,
}

impl CorrectionResult {
    pub fn corrected(chunk: Chunk, text: impl Into<String>) -> Self {
        Self {
            chunk,
            outcome: Ok(text.into()),
        }
    }

    pub fn failed(chunk: Chunk, failure: ChunkFailure) -> Self {
        Self {
            chunk,
            outcome: Err(failure),
        }
    }

    /// Whether the provider returned text for this chunk
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Final state of a chunk after reassembly
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkStatus {
    Corrected,
    ProviderFailed(ProviderError),
    ReassemblyFailed(ReassemblyError),
    Cancelled,
}

impl ChunkStatus {
    pub fn is_corrected(&self) -> bool {
        matches!(self, Self::Corrected)
    }
}

impl fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrected => write!(f, "corrected"),
            Self::ProviderFailed(e) => write!(f, "provider failed: {}", e),
            Self::ReassemblyFailed(e) => write!(f, "reassembly failed: {}", e),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Per-chunk line of the report
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkReport {
    /// Chunk id
    pub chunk_id: usize,
    /// Index of the first owned cue
    pub first_cue: usize,
    /// Index of the last owned cue
    pub last_cue: usize,
    /// What happened
    pub status: ChunkStatus,
}

/// Cue whose text was changed by the correction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueChange {
    /// Cue index
    pub index: usize,
    /// Text before correction
    pub original: String,
    /// Text after correction
    pub corrected: String,
}

/// Summary of a correction run
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionReport {
    /// Identifier used to correlate log lines and issue files
    pub run_id: Uuid,
    /// One entry per chunk, in chunk order
    pub chunks: Vec<ChunkReport>,
    /// Changed cues, in track order
    pub changes: Vec<CueChange>,
}

impl Default for CorrectionReport {
    fn default() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            chunks: Vec::new(),
            changes: Vec::new(),
        }
    }
}

impl CorrectionReport {
    /// Chunks left uncorrected
    pub fn failed_chunks(&self) -> Vec<&ChunkReport> {
        self.chunks.iter().filter(|c| !c.status.is_corrected()).collect()
    }

    /// Indices of cues whose chunk was not corrected
    pub fn uncorrected_cue_indices(&self) -> Vec<usize> {
        self.failed_chunks()
            .into_iter()
            .flat_map(|c| c.first_cue..=c.last_cue)
            .collect()
    }

    /// Number of corrected chunks
    pub fn corrected_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.status.is_corrected()).count()
    }

    /// True when there was work and none of it succeeded
    pub fn all_failed(&self) -> bool {
        !self.chunks.is_empty() && self.corrected_chunks() == 0
    }

    /// True when every chunk was corrected
    pub fn is_complete(&self) -> bool {
        self.failed_chunks().is_empty()
    }
}

/// Builds chunk payloads and merges corrected chunks back into a track
#[derive(Debug, Clone)]
pub struct Reassembler {
    codec: SegmentCodec,
    shield_markup: bool,
}

impl Reassembler {
    /// `shield_markup` enables ASS tag protection
    pub fn new(codec: SegmentCodec, shield_markup: bool) -> Self {
        Self { codec, shield_markup }
    }

    fn shield(&self, text: &str) -> ShieldedText {
        if self.shield_markup {
            TagShield::shield(text)
        } else {
            ShieldedText::plain(text)
        }
    }

    /// Text sent to the provider for `chunk`
    pub fn encode_chunk(&self, cues: &[Cue], chunk: &Chunk) -> String {
        let texts: Vec<String> = chunk
            .cues(cues)
            .iter()
            .map(|cue| self.shield(&cue.text).text)
            .collect();
        self.codec.encode(&texts)
    }

    /// Corrected texts for the owned cues of `chunk`, keyed by cue position
    fn map_chunk(&self, cues: &[Cue], chunk: &Chunk, corrected: &str) -> Result<Vec<(usize, String)>, ReassemblyError> {
        let segments = self.codec.decode(corrected, chunk.len())?;

        chunk
            .owned_range()
            .map(|position| -> Result<(usize, String), ReassemblyError> {
                let cue = &cues[position];
                let segment = &segments[position - chunk.start];
                let restored = TagShield::unshield(segment, &self.shield(&cue.text), cue.index)?;

                // Unchanged answers keep the exact original, whitespace included
                let text = if restored.trim() == cue.text.trim() {
                    cue.text.clone()
                } else {
                    restored
                };
                Ok((position, text))
            })
            .collect()
    }

    /// Apply chunk results to a copy of `track`.
    ///
    /// Every result is recorded in the report; failures leave their owned cues
    /// untouched.
    pub fn merge(&self, track: &Track, mut results: Vec<CorrectionResult>) -> (Track, CorrectionReport) {
        results.sort_by_key(|result| result.chunk.id);

        let mut corrected = track.clone();
        let mut written = vec![false; track.cues.len()];
        let mut report = CorrectionReport::default();

        for result in results {
            let chunk = result.chunk;
            let owned = chunk.owned_range();
            let first = track.cues.get(owned.start);
            let last = owned.end.checked_sub(1).and_then(|i| track.cues.get(i));
            let (first_cue, last_cue) = match (first, last) {
                (Some(first), Some(last)) => (first.index, last.index),
                _ => {
                    warn!("Chunk {} points outside the track, ignoring it", chunk.id + 1);
                    continue;
                }
            };

            let status = match result.outcome {
                Ok(text) => match self.map_chunk(&track.cues, &chunk, &text) {
                    Ok(updates) => {
                        for (position, text) in updates {
                            if written[position] {
                                continue;
                            }
                            written[position] = true;

                            let cue = &mut corrected.cues[position];
                            if cue.text != text {
                                report.changes.push(CueChange {
                                    index: cue.index,
                                    original: cue.text.clone(),
                                    corrected: text.clone(),
                                });
                                cue.text = text;
                            }
                        }
                        ChunkStatus::Corrected
                    }
                    Err(e) => {
                        warn!(
                            "Chunk {} (cues {}-{}) kept original text: reassembly problem: {}",
                            chunk.id + 1, first_cue, last_cue, e
                        );
                        ChunkStatus::ReassemblyFailed(e)
                    }
                },
                Err(ChunkFailure::Provider(e)) => {
                    error!(
                        "Chunk {} (cues {}-{}) kept original text: provider failure: {}",
                        chunk.id + 1, first_cue, last_cue, e
                    );
                    ChunkStatus::ProviderFailed(e)
                }
                Err(ChunkFailure::Reassembly(e)) => {
                    warn!(
                        "Chunk {} (cues {}-{}) kept original text: reassembly problem: {}",
                        chunk.id + 1, first_cue, last_cue, e
                    );
                    ChunkStatus::ReassemblyFailed(e)
                }
                Err(ChunkFailure::Cancelled) => {
                    debug!("Chunk {} (cues {}-{}) was not sent, run cancelled", chunk.id + 1, first_cue, last_cue);
                    ChunkStatus::Cancelled
                }
            };

            report.chunks.push(ChunkReport {
                chunk_id: chunk.id,
                first_cue,
                last_cue,
                status,
            });
        }

        (corrected, report)
    }
}
