/*!
 * Controller tests on real files in temporary directories
 */

use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use subspell::app_config::{Config, ProviderKind};
use subspell::app_controller::Controller;
use subspell::file_utils::FileManager;
use subspell::providers::mock::MockProvider;
use subspell::subtitle_processor::Track;
use crate::common;

fn fixing_controller() -> Controller {
    let provider = MockProvider::custom(|text| Ok(text.replace("немога", "не мога")));
    Controller::with_provider(Config::default(), Arc::new(provider))
}

#[tokio::test]
async fn test_correct_file_withSrtInput_shouldWriteCorrectedCopy() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "movie.srt", common::SAMPLE_SRT)?;

    let outcome = fixing_controller()
        .correct_file(&input, None, &CancellationToken::new())
        .await?;

    assert_eq!(outcome.output, temp_dir.path().join("movie_corrected.srt"));
    assert!(outcome.issues_log.is_none());
    assert_eq!(outcome.report.changes.len(), 1);

    let corrected = Track::read_from_file(&outcome.output)?;
    let original = Track::read_from_file(&input)?;
    assert_eq!(corrected.cues[0].text, "Аз не мога да дойда");
    assert_eq!(corrected.cues[0].start_ms, original.cues[0].start_ms);
    assert_eq!(corrected.cues[1..], original.cues[1..]);
    Ok(())
}

#[tokio::test]
async fn test_correct_file_withAssInputAndExplicitOutput_shouldKeepStyling() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "show.ass", common::SAMPLE_ASS)?;
    let output = temp_dir.path().join("out").join("fixed.ass");

    fixing_controller()
        .correct_file(&input, Some(&output), &CancellationToken::new())
        .await?;

    let content = FileManager::read_to_string(&output)?;
    assert!(content.contains("{\\i1}Аз не мога{\\i0} да дойда"));
    assert!(content.contains("Style: Default,Arial,20,&H00FFFFFF,0"));
    assert_eq!(content.lines().count(), common::SAMPLE_ASS.lines().count());
    Ok(())
}

#[tokio::test]
async fn test_correct_file_withFailingProvider_shouldWriteIssuesLog() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "movie.srt", common::SAMPLE_SRT)?;
    let controller = Controller::with_provider(Config::default(), Arc::new(MockProvider::failing()));

    let outcome = controller.correct_file(&input, None, &CancellationToken::new()).await?;

    assert!(outcome.report.all_failed());
    let log_path = outcome.issues_log.expect("issues log should be written");
    assert_eq!(log_path, temp_dir.path().join("movie_corrected.srt.issues.log"));

    let log = FileManager::read_to_string(&log_path)?;
    assert!(log.contains("1 of 1 chunks left uncorrected"));
    assert!(log.contains("Chunk 1 (cues 1-3): provider failed"));

    // The output still holds the original text
    assert_eq!(Track::read_from_file(&outcome.output)?, Track::read_from_file(&input)?);
    Ok(())
}

#[tokio::test]
async fn test_correct_file_afterFailedRun_shouldRemoveStaleIssuesLog() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "movie.srt", common::SAMPLE_SRT)?;
    let cancel = CancellationToken::new();

    let failing = Controller::with_provider(Config::default(), Arc::new(MockProvider::failing()));
    let failed = failing.correct_file(&input, None, &cancel).await?;
    let log_path = failed.issues_log.expect("issues log should be written");
    assert!(log_path.exists());

    let fixed = fixing_controller().correct_file(&input, None, &cancel).await?;
    assert!(fixed.report.is_complete());
    assert!(fixed.issues_log.is_none());
    assert!(!log_path.exists());

    // A second failure starts a fresh log instead of appending to an old one
    failing.correct_file(&input, None, &cancel).await?;
    failing.correct_file(&input, None, &cancel).await?;
    let log = FileManager::read_to_string(&log_path)?;
    assert_eq!(log.matches("chunks left uncorrected").count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_correct_folder_withMixedFiles_shouldProcessSubtitlesOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "a.srt", common::SAMPLE_SRT)?;
    common::create_test_file(temp_dir.path(), "season/b.ass", common::SAMPLE_ASS)?;
    common::create_test_file(temp_dir.path(), "readme.txt", "не е субтитър")?;
    common::create_test_file(temp_dir.path(), "broken.srt", "без субтитри")?;

    let outcomes = fixing_controller()
        .correct_folder(temp_dir.path(), &CancellationToken::new())
        .await?;

    // broken.srt has no cues and is skipped
    assert_eq!(outcomes.len(), 2);
    assert!(temp_dir.path().join("a_corrected.srt").exists());
    assert!(temp_dir.path().join("season").join("b_corrected.ass").exists());
    assert!(!temp_dir.path().join("broken_corrected.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_correct_text_withParagraphs_shouldReturnCorrectedText() -> Result<()> {
    let (corrected, report) = fixing_controller().correct_text("Аз немога.\n\nТой може.").await?;
    assert_eq!(corrected, "Аз не мога.\n\nТой може.");
    assert!(report.is_complete());
    Ok(())
}

#[test]
fn test_check_provider_withFailingProvider_shouldReturnError() {
    let controller = Controller::with_provider(Config::default(), Arc::new(MockProvider::failing()));

    let (failing, healthy) = tokio_test::block_on(async {
        (controller.check_provider().await, fixing_controller().check_provider().await)
    });
    assert!(failing.is_err());
    assert!(healthy.is_ok());
}

#[test]
fn test_with_config_withOllama_shouldBuildWithoutApiKey() -> Result<()> {
    let mut config = Config::default();
    config.correction.provider = ProviderKind::Ollama;

    let controller = Controller::with_config(config)?;
    assert_eq!(controller.pipeline_options().max_concurrent_requests, 2);
    assert_eq!(controller.pipeline_options().sampling.model, "llama3.2:3b");
    Ok(())
}

#[test]
fn test_with_config_withInvalidBudget_shouldFail() {
    let mut config = Config::default();
    config.correction.provider = ProviderKind::Ollama;
    config.chunking.max_tokens = 0;

    assert!(Controller::with_config(config).is_err());
}
