/*!
 * Common test utilities for the subspell test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use subspell::correction::{ChunkingConfig, CorrectionPipeline, PipelineOptions};
use subspell::providers::mock::MockProvider;

/// Sample SRT track with three Bulgarian cues
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
Аз немога да дойда

2
00:00:05,000 --> 00:00:09,000
Брат ми каза,
че ще дойде утре

3
00:00:10,000 --> 00:00:14,000
Какво ще правиш
";

/// Sample ASS script with styling and a multi-line cue
pub const SAMPLE_ASS: &str = "[Script Info]
Title: Тест
ScriptType: v4.00+

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, Bold
Style: Default,Arial,20,&H00FFFFFF,0

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,{\\i1}Аз немога{\\i0} да дойда
Comment: 0,0:00:02.00,0:00:03.00,Default,,0,0,0,,бележка
Dialogue: 0,0:00:05.00,0:00:09.00,Default,,0,0,0,,Брат ми каза,\\Nче ще дойде утре
";

/// Initialize test logging once; repeated calls are harmless
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Pipeline settings for tests: `separator`, the given chunking, two workers
pub fn test_options(separator: &str, chunking: ChunkingConfig) -> PipelineOptions {
    PipelineOptions {
        separator: separator.to_string(),
        chunking,
        max_concurrent_requests: 2,
        request_timeout: Duration::from_secs(5),
        ..PipelineOptions::default()
    }
}

/// Pipeline around a mock provider, returning both
pub fn mock_pipeline(provider: MockProvider, options: PipelineOptions) -> (CorrectionPipeline, Arc<MockProvider>) {
    let provider = Arc::new(provider);
    (CorrectionPipeline::new(provider.clone(), options), provider)
}
