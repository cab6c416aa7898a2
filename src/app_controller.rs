use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::app_config::Config;
use crate::correction::{CorrectionPipeline, CorrectionReport, PipelineOptions};
use crate::file_utils::FileManager;
use crate::providers::{create_provider, CorrectionProvider};
use crate::subtitle_processor::Track;

// @module: Application controller for subtitle correction

/// Result of correcting one subtitle file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    // @field: File that was read
    pub input: PathBuf,
    // @field: File that was written
    pub output: PathBuf,
    // @field: Issues log, written only when some chunks failed
    pub issues_log: Option<PathBuf>,
    // @field: Per-chunk outcome and changed cues
    pub report: CorrectionReport,
}

/// Main application controller for subtitle correction
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Provider shared by every run
    provider: Arc<dyn CorrectionProvider>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let provider = create_provider(&config.correction.provider_settings())
            .map_err(|e| anyhow!("Failed to create {} provider: {}", config.correction.provider, e))?;

        Ok(Self { config, provider })
    }

    // @method: Create a controller around an existing provider
    pub fn with_provider(config: Config, provider: Arc<dyn CorrectionProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pipeline settings derived from the configuration
    pub fn pipeline_options(&self) -> PipelineOptions {
        let correction = &self.config.correction;
        PipelineOptions {
            instructions: correction.common.resolved_instructions(),
            sampling: correction.sampling(),
            chunking: self.config.chunking.clone(),
            separator: correction.common.separator.clone(),
            max_concurrent_requests: correction.concurrent_requests(),
            request_timeout: Duration::from_secs(correction.common.request_timeout_secs),
        }
    }

    fn pipeline(&self) -> CorrectionPipeline {
        CorrectionPipeline::new(self.provider.clone(), self.pipeline_options())
    }

    /// Check that the configured provider is reachable
    pub async fn check_provider(&self) -> Result<()> {
        info!("Testing connection to {} ...", self.config.correction.provider.display_name());
        self.provider
            .test_connection()
            .await
            .map_err(|e| anyhow!("{} is not reachable: {}", self.config.correction.provider.display_name(), e))?;
        info!("{} is reachable", self.config.correction.provider.display_name());
        Ok(())
    }

    /// Correct free text
    pub async fn correct_text(&self, text: &str) -> Result<(String, CorrectionReport)> {
        let (corrected, report) = self.pipeline().correct_text(text).await?;
        Ok((corrected, report))
    }

    /// Correct a single subtitle file.
    ///
    /// The output defaults to `<stem>_corrected.<ext>` next to the input. When
    /// some chunks could not be corrected, their cue ranges are listed in
    /// `<output>.issues.log`; a log left by an earlier run is removed.
    pub async fn correct_file(
        &self,
        input_file: &Path,
        output_file: Option<&Path>,
        cancel: &CancellationToken,
    ) -> Result<FileOutcome> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        let output_file = output_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| FileManager::corrected_output_path(input_file));

        let track = Track::read_from_file(input_file)?;
        info!(
            "Correcting {:?}: {} cues ({}) with {} - {}",
            input_file,
            track.len(),
            track.format,
            self.config.correction.provider.display_name(),
            self.config.correction.get_model()
        );

        let progress_bar = Self::progress_bar(0, "chunks");
        let callback_bar = progress_bar.clone();
        let output = self
            .pipeline()
            .run(
                &track,
                move |current, total| {
                    callback_bar.set_length(total as u64);
                    callback_bar.set_position(current as u64);
                },
                cancel,
            )
            .await?;
        progress_bar.finish_and_clear();

        output.track.write_to_file(&output_file)?;

        // The issues log only ever describes the latest run
        let log_path = FileManager::issues_log_path(&output_file);
        if FileManager::remove_file_if_exists(&log_path)? {
            debug!("Removed issues log of a previous run: {:?}", log_path);
        }

        let issues_log = if output.report.is_complete() {
            None
        } else {
            FileManager::append_to_log_file(&log_path, &Self::issue_lines(input_file, &output.report))?;
            warn!(
                "{} of {} chunks left uncorrected, see {:?}",
                output.report.failed_chunks().len(),
                output.report.chunks.len(),
                log_path
            );
            Some(log_path)
        };

        info!(
            "Wrote {:?} ({} cues changed) in {:.1}s",
            output_file,
            output.report.changes.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(FileOutcome {
            input: input_file.to_path_buf(),
            output: output_file,
            issues_log,
            report: output.report,
        })
    }

    /// Correct every subtitle file below a directory, one file at a time.
    ///
    /// A failing file is logged and skipped; the remaining files still run.
    pub async fn correct_folder(&self, input_dir: &Path, cancel: &CancellationToken) -> Result<Vec<FileOutcome>> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let files = FileManager::find_subtitle_files(input_dir)?;
        if files.is_empty() {
            warn!("No subtitle files found in {:?}", input_dir);
            return Ok(Vec::new());
        }
        info!("Found {} subtitle files in {:?}", files.len(), input_dir);

        let mut outcomes = Vec::with_capacity(files.len());
        let mut failure_count = 0;
        for file in &files {
            if cancel.is_cancelled() {
                warn!("Cancelled, {} files not processed", files.len() - outcomes.len() - failure_count);
                break;
            }

            match self.correct_file(file, None, cancel).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!("Failed to correct {:?}: {:#}", file, e);
                    failure_count += 1;
                }
            }
        }

        info!(
            "Folder done: {} files corrected, {} failed",
            outcomes.len(),
            failure_count
        );
        Ok(outcomes)
    }

    /// Human readable list of changed cues
    pub fn format_changes(report: &CorrectionReport) -> String {
        let mut listing = String::new();
        for change in &report.changes {
            let _ = writeln!(listing, "#{}", change.index);
            let _ = writeln!(listing, "- {}", change.original.replace('\n', " / "));
            let _ = writeln!(listing, "+ {}", change.corrected.replace('\n', " / "));
        }
        listing
    }

    fn issue_lines(input_file: &Path, report: &CorrectionReport) -> Vec<String> {
        let mut lines = vec![format!(
            "Run {} on {:?}: {} of {} chunks left uncorrected",
            report.run_id,
            input_file,
            report.failed_chunks().len(),
            report.chunks.len()
        )];
        lines.extend(report.failed_chunks().into_iter().map(|chunk| {
            format!(
                "Chunk {} (cues {}-{}): {}",
                chunk.chunk_id + 1,
                chunk.first_cue,
                chunk.last_cue,
                chunk.status
            )
        }));
        lines
    }

    fn progress_bar(length: u64, unit: &str) -> ProgressBar {
        let progress_bar = ProgressBar::new(length);
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{eta}}",
            unit
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }
}
