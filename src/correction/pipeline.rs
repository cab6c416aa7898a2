/*!
 * Correction pipeline: chunking, bounded concurrent provider calls and a
 * single reassembly step.
 *
 * The input track is only read while chunks are in flight. Results are
 * collected in completion order and handed to the reassembler, which orders
 * them by chunk id before touching any cue.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::errors::{ChunkingError, ProviderError};
use crate::providers::{CorrectionProvider, SamplingConfig};
use crate::subtitle_processor::Track;

use super::chunker::{Chunker, ChunkingConfig};
use super::markers::SegmentCodec;
use super::reassembler::{ChunkFailure, CorrectionReport, CorrectionResult, Reassembler};
use super::tokens::{TokenEstimator, WordPunctuationEstimator};

/// Settings for one pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// System instructions sent with every chunk
    pub instructions: String,
    /// Model and sampling parameters
    pub sampling: SamplingConfig,
    /// Chunk boundaries
    pub chunking: ChunkingConfig,
    /// Separator between cue texts
    pub separator: String,
    /// Upper bound on provider calls in flight
    pub max_concurrent_requests: usize,
    /// Budget for a single provider call
    pub request_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            instructions: crate::language_rules::BG_SYSTEM_INSTRUCTION.to_string(),
            sampling: SamplingConfig::default(),
            chunking: ChunkingConfig::default(),
            separator: super::markers::DEFAULT_SEPARATOR.to_string(),
            max_concurrent_requests: 4,
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Corrected track plus what happened to each chunk
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub track: Track,
    pub report: CorrectionReport,
}

/// Orchestrates a correction run over a track
pub struct CorrectionPipeline {
    /// Provider receiving the chunks
    provider: Arc<dyn CorrectionProvider>,
    /// Cost function used for token-based chunking
    estimator: Arc<dyn TokenEstimator>,
    /// Run settings
    options: PipelineOptions,
}

// First 12 hex digits of the payload digest, to correlate debug lines
fn payload_digest(payload: &str) -> String {
    Sha256::digest(payload.as_bytes())
        .iter()
        .take(6)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

impl CorrectionPipeline {
    /// Create a pipeline using the word/punctuation token estimate
    pub fn new(provider: Arc<dyn CorrectionProvider>, options: PipelineOptions) -> Self {
        Self {
            provider,
            estimator: Arc::new(WordPunctuationEstimator),
            options,
        }
    }

    /// Replace the token estimator
    pub fn with_estimator(mut self, estimator: Arc<dyn TokenEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Correct every cue of `track`.
    ///
    /// Provider failures are contained per chunk and reported; only an invalid
    /// chunking configuration fails the whole run, before any request is sent.
    pub async fn run(
        &self,
        track: &Track,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutput, ChunkingError> {
        let codec = SegmentCodec::new(self.options.separator.as_str())?;
        let chunker = Chunker::new(self.estimator.clone(), codec.separator());
        let chunks = chunker.split(&track.cues, &self.options.chunking)?;
        let reassembler = Reassembler::new(codec, track.format.uses_ass_markup());

        let total_chunks = chunks.len();
        if total_chunks == 0 {
            return Ok(PipelineOutput {
                track: track.clone(),
                report: CorrectionReport::default(),
            });
        }

        let max_concurrent_requests = self.options.max_concurrent_requests.max(1);
        info!(
            "Correcting {} cues in {} chunks with {} ({} concurrent requests)",
            track.len(),
            total_chunks,
            self.provider.name(),
            max_concurrent_requests
        );

        // Payloads are built up front; the track stays untouched until reassembly
        let work: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                let payload = reassembler.encode_chunk(&track.cues, &chunk);
                (chunk, payload)
            })
            .collect();

        // Create a semaphore to limit concurrent requests
        let semaphore = Arc::new(Semaphore::new(max_concurrent_requests));
        let processed_chunks = Arc::new(AtomicUsize::new(0));
        let request_timeout = self.options.request_timeout;

        let results = stream::iter(work)
            .map(|(chunk, payload)| {
                let provider = self.provider.clone();
                let semaphore = semaphore.clone();
                let processed_chunks = processed_chunks.clone();
                let progress_callback = progress_callback.clone();
                let cancel = cancel.clone();
                let instructions = self.options.instructions.clone();
                let sampling = self.options.sampling.clone();

                async move {
                    // Acquire a permit from the semaphore
                    let permit = semaphore.acquire().await;

                    let outcome = if permit.is_err() || cancel.is_cancelled() {
                        Err(ChunkFailure::Cancelled)
                    } else {
                        debug!(
                            "Sending chunk {}/{} ({} cues, ~{} tokens, sha256 {})",
                            chunk.id + 1,
                            total_chunks,
                            chunk.len(),
                            chunk.estimated_tokens,
                            payload_digest(&payload)
                        );

                        let start_time = Instant::now();
                        let call = provider.correct(&payload, &instructions, &sampling);
                        let outcome = match tokio::time::timeout(request_timeout, call).await {
                            Ok(Ok(text)) => Ok(text),
                            Ok(Err(e)) => Err(ChunkFailure::Provider(e)),
                            Err(_) => Err(ChunkFailure::Provider(ProviderError::Timeout(request_timeout.as_millis() as u64))),
                        };
                        debug!(
                            "Chunk {}/{} finished in {:?} ({})",
                            chunk.id + 1,
                            total_chunks,
                            start_time.elapsed(),
                            if outcome.is_ok() { "ok" } else { "failed" }
                        );
                        outcome
                    };
                    drop(permit);

                    // Update progress
                    let current = processed_chunks.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total_chunks);

                    CorrectionResult { chunk, outcome }
                }
            })
            .buffer_unordered(max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        let (corrected, report) = reassembler.merge(track, results);
        info!(
            "Run {}: {}/{} chunks corrected, {} cues changed",
            report.run_id,
            report.corrected_chunks(),
            total_chunks,
            report.changes.len()
        );

        Ok(PipelineOutput {
            track: corrected,
            report,
        })
    }

    /// Correct free text; paragraphs separated by blank lines are treated as cues
    pub async fn correct_text(&self, text: &str) -> Result<(String, CorrectionReport), ChunkingError> {
        let track = Track::from_plain_text(text);
        let output = self.run(&track, |_, _| {}, &CancellationToken::new()).await?;
        Ok((output.track.to_plain_text(), output.report))
    }
}
