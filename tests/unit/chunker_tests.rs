/*!
 * Tests for chunk boundaries, ownership and overlap
 */

use std::sync::Arc;

use subspell::correction::{BatchMode, CharRatioEstimator, Chunker, ChunkingConfig, WordPunctuationEstimator};
use subspell::errors::ChunkingError;
use subspell::subtitle_processor::Track;

fn word_chunker() -> Chunker {
    Chunker::new(Arc::new(WordPunctuationEstimator), "§SEP§")
}

/// Every cue must be owned by exactly one chunk, in order
fn assert_partition(chunks: &[subspell::correction::Chunk], cue_count: usize) {
    let mut next = 0;
    for chunk in chunks {
        assert_eq!(chunk.owned_range().start, next, "chunk {} leaves a gap", chunk.id);
        assert!(chunk.owned_count() > 0, "chunk {} owns nothing", chunk.id);
        next = chunk.owned_range().end;
    }
    assert_eq!(next, cue_count);
}

#[test]
fn test_split_withBatchThreeOverlapOne_shouldOwnCueThreeInFirstChunk() {
    let track = Track::from_texts(&["1", "2", "3", "4", "5", "6"]);
    let chunks = word_chunker()
        .split(&track.cues, &ChunkingConfig::fixed_size(3, 1))
        .unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!((chunks[0].start, chunks[0].end), (0, 3));
    assert_eq!((chunks[1].start, chunks[1].end), (2, 6));
    assert_eq!(chunks[1].overlap_prefix_count, 1);

    // Cue 3 (position 2) is context in the second chunk only
    assert!(chunks[0].owns(2));
    assert!(!chunks[1].owns(2));
    assert_partition(&chunks, 6);
}

#[test]
fn test_split_withTokenBudget_shouldRespectBudgetForOwnedCues() {
    let texts: Vec<String> = (0..40).map(|i| format!("Реплика номер {} тук", i)).collect();
    let track = Track::from_texts(&texts);
    let chunker = Chunker::new(Arc::new(CharRatioEstimator::new(4)), "|");
    let config = ChunkingConfig::token_based(30, 0);

    let chunks = chunker.split(&track.cues, &config).unwrap();
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.estimated_tokens <= 30, "chunk {} is over budget", chunk.id);
    }
    assert_partition(&chunks, 40);
}

#[test]
fn test_split_withOversizedCue_shouldGiveItItsOwnChunk() {
    let long = "дума ".repeat(50);
    let track = Track::from_texts(&["кратко", long.as_str(), "кратко"]);
    let chunks = word_chunker()
        .split(&track.cues, &ChunkingConfig::token_based(10, 0))
        .unwrap();

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[1].owned_range(), 1..2);
    assert!(chunks[1].estimated_tokens > 10);
}

#[test]
fn test_split_withLargeBudget_shouldProduceSingleChunk() {
    let track = Track::from_texts(&["Аз съм тук", "Той е там"]);
    let chunks = word_chunker().split(&track.cues, &ChunkingConfig::default()).unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].overlap_prefix_count, 0);
    assert_eq!(chunks[0].len(), 2);
}

#[test]
fn test_split_withOverlapLargerThanChunk_shouldClampPrefix() {
    let track = Track::from_texts(&["а", "б", "в", "г"]);
    let chunks = word_chunker()
        .split(&track.cues, &ChunkingConfig::fixed_size(1, 5))
        .unwrap();

    assert_eq!(chunks.len(), 4);
    // Each chunk holds one owned cue, so at most one cue of context follows
    assert!(chunks.iter().skip(1).all(|c| c.overlap_prefix_count == 1));
    assert_partition(&chunks, 4);
}

#[test]
fn test_split_withEmptyTrack_shouldReturnNoChunks() {
    let track = Track::from_texts::<&str>(&[]);
    let chunks = word_chunker().split(&track.cues, &ChunkingConfig::default()).unwrap();
    assert!(chunks.is_empty());
}

#[test]
fn test_split_withZeroBudget_shouldFail() {
    let track = Track::from_texts(&["а"]);
    let result = word_chunker().split(&track.cues, &ChunkingConfig::token_based(0, 2));
    assert_eq!(result, Err(ChunkingError::InvalidTokenBudget(0)));
}

#[test]
fn test_effective_mode_withZeroBatchSize_shouldBeTokenBased() {
    let config = ChunkingConfig::fixed_size(0, 2);
    assert_eq!(config.effective_mode(), BatchMode::TokenBased);
    assert_eq!(ChunkingConfig::fixed_size(5, 0).effective_mode(), BatchMode::FixedSize);
}
