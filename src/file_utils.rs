use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extensions picked up when correcting a whole folder
pub const SUBTITLE_EXTENSIONS: [&str; 3] = ["srt", "ass", "ssa"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: `<stem>_corrected.<ext>` next to the input
    pub fn corrected_output_path<P: AsRef<Path>>(input_file: P) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        let file_name = match input_file.extension() {
            Some(ext) => format!("{}_corrected.{}", stem, ext.to_string_lossy()),
            None => format!("{}_corrected", stem),
        };
        input_file.with_file_name(file_name)
    }

    // @generates: Issues log path for an output file
    pub fn issues_log_path<P: AsRef<Path>>(output_file: P) -> PathBuf {
        let output_file = output_file.as_ref();
        let mut file_name = output_file.file_name().unwrap_or_default().to_os_string();
        file_name.push(".issues.log");
        output_file.with_file_name(file_name)
    }

    /// Find subtitle files below a directory, sorted by path.
    ///
    /// Files produced by an earlier run (`*_corrected.*`) are skipped.
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let is_subtitle = path
                .extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy();
                    SUBTITLE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
                })
                .unwrap_or(false);
            let already_corrected = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().ends_with("_corrected"))
                .unwrap_or(false);

            if is_subtitle && !already_corrected {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Delete a file if present; returns whether something was removed
    pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove file: {:?}", path.as_ref())),
        }
    }

    /// Append lines to a log file, each prefixed with a timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, lines: &[String]) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        // Open file in append mode, create if it doesn't exist
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        for line in lines {
            writeln!(file, "[{}] {}", timestamp, line)
                .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;
        }

        Ok(())
    }
}
