/*!
 * Subtitle track model and file I/O.
 *
 * A `Track` is the ordered list of cues read from a subtitle file together
 * with the format metadata needed to write it back unchanged. The correction
 * pipeline only ever replaces cue text; timing and styling pass through.
 *
 * - `srt`: SubRip reader and writer
 * - `ass`: Advanced SubStation Alpha reader and writer
 */

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::errors::SubtitleError;

pub mod ass;
pub mod srt;

pub use self::ass::{AssLine, AssMetadata};

/// Supported subtitle formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// SubRip (.srt)
    Srt,
    /// Advanced SubStation Alpha (.ass, .ssa)
    Ass,
    /// Free text split into paragraphs
    PlainText,
}

impl SubtitleFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, SubtitleError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "srt" => Ok(Self::Srt),
            "ass" | "ssa" => Ok(Self::Ass),
            _ => Err(SubtitleError::UnsupportedFormat(format!(".{}", extension))),
        }
    }

    /// Whether cue text carries ASS override tags and `\N` breaks
    pub fn uses_ass_markup(&self) -> bool {
        matches!(self, Self::Ass)
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Srt => write!(f, "srt"),
            Self::Ass => write!(f, "ass"),
            Self::PlainText => write!(f, "text"),
        }
    }
}

/// Single timed subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// 1-based position in the original track
    pub index: usize,

    /// Start time in ms
    pub start_ms: u64,

    /// End time in ms
    pub end_ms: u64,

    /// Subtitle text, possibly multi-line
    pub text: String,
}

impl Cue {
    /// Create a new cue
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            index,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_ms)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Format-specific data carried through the pipeline untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TrackMetadata {
    /// Nothing beyond the cues themselves
    #[default]
    Empty,
    /// ASS script header, styles and event field values
    Ass(AssMetadata),
}

/// Full subtitle track: cues in original order plus format metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Format the track was read from
    pub format: SubtitleFormat,

    /// Opaque format metadata
    pub metadata: TrackMetadata,

    /// Cues in original order
    pub cues: Vec<Cue>,
}

impl Track {
    /// Create a track without metadata
    pub fn new(format: SubtitleFormat, cues: Vec<Cue>) -> Self {
        Self {
            format,
            metadata: TrackMetadata::Empty,
            cues,
        }
    }

    /// Build an untimed track from a list of texts, one cue per text
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        let cues = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Cue::new(i + 1, 0, 0, text.as_ref()))
            .collect();
        Self::new(SubtitleFormat::PlainText, cues)
    }

    /// Split free text into paragraph cues (separated by blank lines)
    pub fn from_plain_text(text: &str) -> Self {
        let mut paragraphs: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join("\n"));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join("\n"));
        }

        Self::from_texts(&paragraphs)
    }

    /// Join cue texts back into paragraphs
    pub fn to_plain_text(&self) -> String {
        self.cues
            .iter()
            .map(|cue| cue.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Number of cues
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Whether the track has no cues
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Cue texts in order
    pub fn texts(&self) -> Vec<&str> {
        self.cues.iter().map(|cue| cue.text.as_str()).collect()
    }

    /// Parse subtitle content of a known format
    pub fn parse(content: &str, format: SubtitleFormat) -> Result<Self, SubtitleError> {
        match format {
            SubtitleFormat::Srt => Ok(Self::new(SubtitleFormat::Srt, srt::parse(content)?)),
            SubtitleFormat::Ass => {
                let (cues, metadata) = ass::parse(content)?;
                Ok(Self {
                    format: SubtitleFormat::Ass,
                    metadata: TrackMetadata::Ass(metadata),
                    cues,
                })
            }
            SubtitleFormat::PlainText => Ok(Self::from_plain_text(content)),
        }
    }

    /// Serialize the track in its own format
    pub fn render(&self) -> String {
        match self.format {
            SubtitleFormat::Srt => srt::render(&self.cues),
            SubtitleFormat::Ass => match &self.metadata {
                TrackMetadata::Ass(metadata) => ass::render(&self.cues, metadata),
                TrackMetadata::Empty => ass::render(&self.cues, &AssMetadata::default()),
            },
            SubtitleFormat::PlainText => self.to_plain_text(),
        }
    }

    /// Read and parse a subtitle file, detecting the format from its extension
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = SubtitleFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;

        let track = Self::parse(&content, format)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))?;
        debug!("Read {} cues from {} ({})", track.len(), path.display(), format);

        Ok(track)
    }

    /// Write the track to a file in its own format
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        std::fs::write(path, self.render())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Track")?;
        writeln!(f, "Format: {}", self.format)?;
        writeln!(f, "Cues: {}", self.cues.len())?;
        Ok(())
    }
}
