/*!
 * SubRip (.srt) reading and writing.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::errors::SubtitleError;

use super::Cue;

// @const: SRT timing line regex; hours may exceed two digits, ',' or '.' before millis
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d+:\d{2}:\d{2}[,.]\d{3})")
        .expect("valid timestamp regex")
});

/// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
    let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();
    let invalid = || SubtitleError::Parse {
        line: 0,
        message: format!("Invalid timestamp format: {}", timestamp),
    };

    if parts.len() != 4 {
        return Err(invalid());
    }

    let mut values = [0u64; 4];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part.parse().map_err(|_| invalid())?;
    }
    let [hours, minutes, seconds, millis] = values;

    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err(invalid());
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

// Both ends of a timing line; out of range fields are an error at `line_number`
fn parse_timing(caps: &Captures, line_number: usize) -> Result<(u64, u64), SubtitleError> {
    let at_line = |error: SubtitleError| match error {
        SubtitleError::Parse { message, .. } => SubtitleError::Parse {
            line: line_number,
            message,
        },
        other => other,
    };
    let start = parse_timestamp(&caps[1]).map_err(at_line)?;
    let end = parse_timestamp(&caps[2]).map_err(at_line)?;
    Ok((start, end))
}

fn flush(timing: (u64, u64), lines: &mut Vec<&str>, cues: &mut Vec<Cue>) {
    let index = cues.len() + 1;
    cues.push(Cue::new(index, timing.0, timing.1, lines.join("\n")));
    lines.clear();
}

/// Parse SRT content into cues, keeping file order.
///
/// Cues are renumbered 1..n in the order they appear; unexpected lines are
/// skipped with a warning.
pub fn parse(content: &str) -> Result<Vec<Cue>, SubtitleError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut cues = Vec::new();

    let mut pending: Option<(u64, u64)> = None;
    let mut text_lines: Vec<&str> = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        let line = line.trim_end();

        if line.trim().is_empty() {
            if let Some(timing) = pending.take() {
                flush(timing, &mut text_lines, &mut cues);
            }
            continue;
        }

        if pending.is_none() {
            let trimmed = line.trim();
            if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                pending = Some(parse_timing(&caps, line_idx + 1)?);
            } else if trimmed.parse::<usize>().is_err() {
                warn!("Unexpected text at line {} before sequence number or timestamp: {}", line_idx + 1, trimmed);
            }
            continue;
        }

        text_lines.push(line);
    }

    // Add the last entry if there is one
    if let Some(timing) = pending.take() {
        flush(timing, &mut text_lines, &mut cues);
    }

    if cues.is_empty() {
        return Err(SubtitleError::Empty);
    }

    Ok(cues)
}

/// Render cues as SRT content
pub fn render(cues: &[Cue]) -> String {
    cues.iter().map(|cue| cue.to_string()).collect()
}
