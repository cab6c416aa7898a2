/*!
 * Advanced SubStation Alpha (.ass/.ssa) reading and writing.
 *
 * Only the `Text` field of `Dialogue:` events is exposed as cue text. The
 * script header, the styles, the `Format:` line and every other event field
 * are kept as metadata and written back as they were read.
 */

use log::warn;

use crate::errors::SubtitleError;

use super::Cue;

const DEFAULT_FORMAT_LINE: &str = "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Line of the `[Events]` section
#[derive(Debug, Clone, PartialEq)]
pub enum AssLine {
    /// Dialogue event; `fields` holds every field except the final `Text`
    Dialogue {
        /// Field values in `Format:` order, without the text
        fields: Vec<String>,
    },
    /// Any other line, written back verbatim
    Raw(String),
}

/// Script data needed to write an ASS file back
#[derive(Debug, Clone, PartialEq)]
pub struct AssMetadata {
    /// Lines up to and including the `[Events]` header
    pub header: Vec<String>,

    /// Field names from the `Format:` line
    pub format_fields: Vec<String>,

    /// Event section lines in file order
    pub events: Vec<AssLine>,
}

impl Default for AssMetadata {
    fn default() -> Self {
        Self {
            header: vec![
                "[Script Info]".to_string(),
                "ScriptType: v4.00+".to_string(),
                String::new(),
                "[Events]".to_string(),
            ],
            format_fields: parse_format_line(DEFAULT_FORMAT_LINE),
            events: vec![AssLine::Raw(DEFAULT_FORMAT_LINE.to_string())],
        }
    }
}

fn parse_format_line(line: &str) -> Vec<String> {
    line.split_once(':')
        .map(|(_, fields)| fields.split(',').map(|f| f.trim().to_string()).collect())
        .unwrap_or_default()
}

/// Parse an ASS timestamp (H:MM:SS.cc) to milliseconds
pub fn parse_timestamp(timestamp: &str) -> Option<u64> {
    let (hms, centis) = timestamp.trim().split_once('.')?;
    let mut parts = hms.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    // Some tools write milliseconds instead of centiseconds
    let fraction_ms = match centis.len() {
        2 => centis.parse::<u64>().ok()? * 10,
        3 => centis.parse::<u64>().ok()?,
        _ => return None,
    };

    Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + fraction_ms)
}

/// Format milliseconds as an ASS timestamp (H:MM:SS.cc)
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let centis = (ms % 1_000) / 10;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}

/// Parse ASS content into cues and the metadata needed to write it back
pub fn parse(content: &str) -> Result<(Vec<Cue>, AssMetadata), SubtitleError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut header = Vec::new();
    let mut events = Vec::new();
    let mut format_fields: Vec<String> = Vec::new();
    let mut cues = Vec::new();
    let mut in_events = false;

    for (line_idx, line) in content.lines().enumerate() {
        if !in_events {
            header.push(line.to_string());
            if line.trim().eq_ignore_ascii_case("[events]") {
                in_events = true;
            }
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.starts_with("Format:") {
            format_fields = parse_format_line(trimmed);
            events.push(AssLine::Raw(line.to_string()));
            continue;
        }

        let Some(body) = trimmed.strip_prefix("Dialogue:") else {
            events.push(AssLine::Raw(line.to_string()));
            continue;
        };

        if format_fields.is_empty() {
            warn!("Dialogue before Format line at line {}, assuming the default field order", line_idx + 1);
            format_fields = parse_format_line(DEFAULT_FORMAT_LINE);
        }

        // Text is last and may itself contain commas
        let mut values: Vec<String> = body
            .trim_start()
            .splitn(format_fields.len(), ',')
            .map(str::to_string)
            .collect();
        if values.len() != format_fields.len() {
            return Err(SubtitleError::Parse {
                line: line_idx + 1,
                message: format!(
                    "Dialogue has {} fields, Format declares {}",
                    values.len(),
                    format_fields.len()
                ),
            });
        }

        let text = values.pop().unwrap_or_default();
        let timing_of = |name: &str| -> u64 {
            format_fields
                .iter()
                .position(|f| f.eq_ignore_ascii_case(name))
                .and_then(|i| values.get(i))
                .and_then(|value| parse_timestamp(value))
                .unwrap_or(0)
        };
        let start_ms = timing_of("Start");
        let end_ms = timing_of("End");

        cues.push(Cue::new(cues.len() + 1, start_ms, end_ms, text));
        events.push(AssLine::Dialogue { fields: values });
    }

    if !in_events {
        return Err(SubtitleError::MissingEventsSection);
    }
    if cues.is_empty() {
        return Err(SubtitleError::Empty);
    }

    let metadata = AssMetadata {
        header,
        format_fields,
        events,
    };
    Ok((cues, metadata))
}

fn synthesized_fields(cue: &Cue, format_fields: &[String]) -> Vec<String> {
    format_fields
        .iter()
        .take(format_fields.len().saturating_sub(1))
        .map(|name| match name.to_ascii_lowercase().as_str() {
            "start" => format_timestamp(cue.start_ms),
            "end" => format_timestamp(cue.end_ms),
            "style" => "Default".to_string(),
            "name" | "effect" => String::new(),
            _ => "0".to_string(),
        })
        .collect()
}

fn dialogue_line(fields: &[String], text: &str) -> String {
    let text = text.replace("\r\n", "\\N").replace('\n', "\\N");
    let mut line = String::from("Dialogue: ");
    for field in fields {
        line.push_str(field);
        line.push(',');
    }
    line.push_str(&text);
    line
}

/// Render cues back into an ASS script using the stored metadata.
///
/// Cues map onto `Dialogue` events by position; cues without a stored event
/// get one built from their timing.
pub fn render(cues: &[Cue], metadata: &AssMetadata) -> String {
    let mut lines: Vec<String> = metadata.header.clone();
    let mut remaining = cues.iter();

    for event in &metadata.events {
        match event {
            AssLine::Raw(raw) => lines.push(raw.clone()),
            AssLine::Dialogue { fields } => match remaining.next() {
                Some(cue) => lines.push(dialogue_line(fields, &cue.text)),
                None => warn!("More dialogue events than cues, dropping the surplus event"),
            },
        }
    }

    for cue in remaining {
        let fields = synthesized_fields(cue, &metadata.format_fields);
        lines.push(dialogue_line(&fields, &cue.text));
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}
