/*!
 * End-to-end correction through the pipeline with mock providers
 */

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use subspell::correction::{CharRatioEstimator, ChunkStatus, ChunkingConfig, PipelineOptions};
use subspell::errors::ReassemblyError;
use subspell::providers::mock::MockProvider;
use subspell::subtitle_processor::{SubtitleFormat, Track};
use crate::common;

#[tokio::test]
async fn test_pipeline_withTwoCueScenario_shouldApplyPunctuation() -> Result<()> {
    common::init_logging();
    let (pipeline, provider) = common::mock_pipeline(
        MockProvider::fixed("Аз съм тук.|||Той е там."),
        common::test_options("|||", ChunkingConfig::token_based(5000, 2)),
    );
    let track = Track::from_texts(&["Аз съм тук", "Той е там"]);

    let output = pipeline.run(&track, |_, _| {}, &CancellationToken::new()).await?;

    assert_eq!(output.track.texts(), vec!["Аз съм тук.", "Той е там."]);
    assert_eq!(provider.request_count(), 1);
    assert!(output.report.is_complete());
    assert_eq!(output.report.changes.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withEchoProvider_shouldBeIdempotent() -> Result<()> {
    let (pipeline, _) = common::mock_pipeline(
        MockProvider::echo(),
        common::test_options("§SEP§", ChunkingConfig::fixed_size(2, 1)),
    );
    let track = Track::parse(common::SAMPLE_SRT, SubtitleFormat::Srt)?;

    let first = pipeline.run(&track, |_, _| {}, &CancellationToken::new()).await?;
    let second = pipeline.run(&first.track, |_, _| {}, &CancellationToken::new()).await?;

    assert_eq!(first.track, track);
    assert_eq!(second.track, track);
    assert_eq!(second.track.render(), track.render());
    assert!(first.report.changes.is_empty());
    assert!(second.report.changes.is_empty());
    assert!(second.report.is_complete());
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withCorrectedOutputFedBack_shouldChangeNothingMore() -> Result<()> {
    let (pipeline, _) = common::mock_pipeline(
        MockProvider::custom(|text| Ok(text.replace("немога", "не мога"))),
        common::test_options("§SEP§", ChunkingConfig::fixed_size(2, 1)),
    );
    let track = Track::parse(common::SAMPLE_SRT, SubtitleFormat::Srt)?;

    let first = pipeline.run(&track, |_, _| {}, &CancellationToken::new()).await?;
    let second = pipeline.run(&first.track, |_, _| {}, &CancellationToken::new()).await?;

    assert_eq!(first.report.changes.len(), 1);
    assert_eq!(second.track, first.track);
    assert!(second.report.changes.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withCharRatioEstimator_shouldChunkByCharacters() -> Result<()> {
    let (pipeline, provider) = common::mock_pipeline(
        MockProvider::echo(),
        common::test_options("|", ChunkingConfig::token_based(11, 0)),
    );
    let pipeline = pipeline.with_estimator(Arc::new(CharRatioEstimator::new(1)));
    let track = Track::from_texts(&["абвгд", "ежзий", "клмно"]);

    let output = pipeline.run(&track, |_, _| {}, &CancellationToken::new()).await?;

    // Five characters per cue plus one for the separator: two cues fit in eleven
    let texts: Vec<String> = provider.requests().into_iter().map(|r| r.text).collect();
    assert_eq!(output.report.chunks.len(), 2);
    assert!(texts.contains(&"абвгд|ежзий".to_string()));
    assert!(texts.contains(&"клмно".to_string()));
    assert_eq!(output.track, track);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withFailingProvider_shouldReturnInputUnchanged() -> Result<()> {
    let (pipeline, provider) = common::mock_pipeline(
        MockProvider::failing(),
        common::test_options("|", ChunkingConfig::fixed_size(1, 0)),
    );
    let track = Track::from_texts(&["едно", "две", "три"]);

    let output = pipeline.run(&track, |_, _| {}, &CancellationToken::new()).await?;

    assert_eq!(output.track, track);
    assert_eq!(provider.request_count(), 3);
    assert!(output.report.all_failed());
    assert!(output
        .report
        .chunks
        .iter()
        .all(|c| matches!(c.status, ChunkStatus::ProviderFailed(_))));
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withIntermittentFailures_shouldKeepCueCountAndOrder() -> Result<()> {
    let mut options = common::test_options("|", ChunkingConfig::fixed_size(1, 0));
    options.max_concurrent_requests = 1;
    let (pipeline, _) = common::mock_pipeline(MockProvider::intermittent(3), options);
    let texts: Vec<String> = (1..=6).map(|i| format!("реплика {}", i)).collect();
    let track = Track::from_texts(&texts);

    let output = pipeline.run(&track, |_, _| {}, &CancellationToken::new()).await?;

    assert_eq!(output.track.len(), 6);
    assert_eq!(output.track.texts(), track.texts());
    assert_eq!(output.report.failed_chunks().len(), 2);
    assert_eq!(output.report.uncorrected_cue_indices(), vec![3, 6]);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withDroppedSegment_shouldReportReassemblyFailure() -> Result<()> {
    let (pipeline, _) = common::mock_pipeline(
        MockProvider::dropping_segment("|||"),
        common::test_options("|||", ChunkingConfig::token_based(5000, 0)),
    );
    let track = Track::from_texts(&["а", "б", "в"]);

    let output = pipeline.run(&track, |_, _| {}, &CancellationToken::new()).await?;

    assert_eq!(output.track, track);
    assert_eq!(
        output.report.chunks[0].status,
        ChunkStatus::ReassemblyFailed(ReassemblyError::SegmentCountMismatch { expected: 3, received: 2 })
    );
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withOverlap_shouldSendContextButKeepOwnedAnswers() -> Result<()> {
    let mut options = common::test_options("|", ChunkingConfig::fixed_size(3, 1));
    options.max_concurrent_requests = 1;
    let (pipeline, provider) =
        common::mock_pipeline(MockProvider::custom(|text| Ok(format!("{}.", text.replace('|', ".|")))), options);
    let track = Track::from_texts(&["1", "2", "3", "4", "5", "6"]);

    let output = pipeline.run(&track, |_, _| {}, &CancellationToken::new()).await?;

    let sent: Vec<String> = provider.requests().into_iter().map(|r| r.text).collect();
    assert_eq!(sent, vec!["1|2|3", "3|4|5|6"]);
    assert_eq!(output.track.texts(), vec!["1.", "2.", "3.", "4.", "5.", "6."]);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withProgressCallback_shouldReportEveryChunk() -> Result<()> {
    let (pipeline, _) = common::mock_pipeline(
        MockProvider::echo(),
        common::test_options("|", ChunkingConfig::fixed_size(2, 0)),
    );
    let texts: Vec<String> = (1..=7).map(|i| i.to_string()).collect();
    let track = Track::from_texts(&texts);

    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = calls.clone();
    pipeline
        .run(&track, move |current, total| recorded.lock().push((current, total)), &CancellationToken::new())
        .await?;

    let calls = calls.lock().clone();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|(_, total)| *total == 4));
    assert_eq!(calls.last(), Some(&(4, 4)));
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withAssTrack_shouldPreserveOverrideTags() -> Result<()> {
    let (pipeline, provider) = common::mock_pipeline(
        MockProvider::custom(|text| Ok(text.replace("немога", "не мога"))),
        PipelineOptions::default(),
    );
    let track = Track::parse(common::SAMPLE_ASS, SubtitleFormat::Ass)?;

    let output = pipeline.run(&track, |_, _| {}, &CancellationToken::new()).await?;

    assert!(!provider.requests()[0].text.contains("{\\i1}"));
    assert_eq!(output.track.cues[0].text, "{\\i1}Аз не мога{\\i0} да дойда");
    assert_eq!(output.track.cues[1].text, track.cues[1].text);
    assert!(output.track.render().contains("Comment: 0,0:00:02.00,0:00:03.00,Default,,0,0,0,,бележка"));
    Ok(())
}
