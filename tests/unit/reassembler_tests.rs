/*!
 * Tests for mapping corrected chunks back onto cues
 */

use std::sync::Arc;

use subspell::correction::{
    ChunkFailure, ChunkStatus, Chunker, ChunkingConfig, CorrectionResult, Reassembler, SegmentCodec,
    WordPunctuationEstimator,
};
use subspell::errors::{ProviderError, ReassemblyError};
use subspell::subtitle_processor::{SubtitleFormat, Track};

fn split(track: &Track, config: &ChunkingConfig, separator: &str) -> Vec<subspell::correction::Chunk> {
    Chunker::new(Arc::new(WordPunctuationEstimator), separator)
        .split(&track.cues, config)
        .unwrap()
}

#[test]
fn test_merge_withOverlappingChunks_shouldTakeOwnedSegmentsOnly() {
    let track = Track::from_texts(&["1", "2", "3", "4", "5", "6"]);
    let chunks = split(&track, &ChunkingConfig::fixed_size(3, 1), "|");
    let reassembler = Reassembler::new(SegmentCodec::new("|").unwrap(), false);

    assert_eq!(reassembler.encode_chunk(&track.cues, &chunks[1]), "3|4|5|6");

    let results = vec![
        // The second chunk rewrites cue 3 as well; that answer must be ignored
        CorrectionResult::corrected(chunks[1].clone(), "x3|x4|x5|x6"),
        CorrectionResult::corrected(chunks[0].clone(), "y1|y2|y3"),
    ];
    let (corrected, report) = reassembler.merge(&track, results);

    assert_eq!(corrected.texts(), vec!["y1", "y2", "y3", "x4", "x5", "x6"]);
    assert!(report.is_complete());
    assert_eq!(report.chunks.len(), 2);
    assert_eq!(report.chunks[0].chunk_id, 0);
}

#[test]
fn test_merge_withTwoSegmentsForThreeCues_shouldPassThroughAndReport() {
    let track = Track::from_texts(&["а", "б", "в"]);
    let chunks = split(&track, &ChunkingConfig::default(), "|||");
    let reassembler = Reassembler::new(SegmentCodec::new("|||").unwrap(), false);

    let results = vec![CorrectionResult::corrected(chunks[0].clone(), "А.|||Б.")];
    let (corrected, report) = reassembler.merge(&track, results);

    assert_eq!(corrected, track);
    assert_eq!(
        report.chunks[0].status,
        ChunkStatus::ReassemblyFailed(ReassemblyError::SegmentCountMismatch { expected: 3, received: 2 })
    );
    assert!(report.changes.is_empty());
}

#[test]
fn test_merge_withMixedOutcomes_shouldKeepCueCountAndOrder() {
    let texts: Vec<String> = (1..=9).map(|i| format!("ред {}", i)).collect();
    let track = Track::from_texts(&texts);
    let chunks = split(&track, &ChunkingConfig::fixed_size(3, 1), "|");
    let reassembler = Reassembler::new(SegmentCodec::new("|").unwrap(), false);

    let results = vec![
        CorrectionResult::corrected(chunks[0].clone(), "Ред 1.|Ред 2.|Ред 3."),
        CorrectionResult::failed(
            chunks[1].clone(),
            ChunkFailure::Provider(ProviderError::RateLimitExceeded("quota".to_string())),
        ),
        CorrectionResult::corrected(chunks[2].clone(), "ред 6|Ред 7.|Ред 8.|Ред 9."),
    ];
    let (corrected, report) = reassembler.merge(&track, results);

    assert_eq!(corrected.len(), 9);
    let indices: Vec<usize> = corrected.cues.iter().map(|c| c.index).collect();
    assert_eq!(indices, (1..=9).collect::<Vec<_>>());
    assert_eq!(corrected.cues[3].text, "ред 4");
    assert_eq!(corrected.cues[6].text, "Ред 7.");
    assert_eq!(report.uncorrected_cue_indices(), vec![4, 5, 6]);
    assert!(!report.all_failed());
}

#[test]
fn test_merge_withLostAssTag_shouldKeepOriginalCue() {
    let mut track = Track::from_texts(&["{\\i1}немога{\\i0}"]);
    track.format = SubtitleFormat::Ass;
    let chunks = split(&track, &ChunkingConfig::default(), "§SEP§");
    let reassembler = Reassembler::new(SegmentCodec::default(), true);

    let results = vec![CorrectionResult::corrected(chunks[0].clone(), "не мога")];
    let (corrected, report) = reassembler.merge(&track, results);

    assert_eq!(corrected.cues[0].text, "{\\i1}немога{\\i0}");
    assert!(matches!(
        report.chunks[0].status,
        ChunkStatus::ReassemblyFailed(ReassemblyError::TagMismatch { cue_index: 1, .. })
    ));
}
