/*!
 * Protection of ASS markup while text goes through the model.
 *
 * Override blocks such as `{\i1}` and hard breaks (`\N`, `\n`) are replaced
 * by placeholders the instructions tell the model to keep. The original
 * fragments are restored in order once the corrected text comes back.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ReassemblyError;

/// Placeholder for an ASS hard line break
pub const LINEBREAK_PLACEHOLDER: &str = "§LINEBREAK§";

/// Placeholder for an ASS override block
pub const TAG_PLACEHOLDER: &str = "§TAG§";

static MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}|\\[Nn]").unwrap());

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"§LINEBREAK§|§TAG§").unwrap());

/// Cue text with its markup swapped out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShieldedText {
    /// Text as sent to the provider
    pub text: String,
    // @field: override blocks in order of appearance
    tags: Vec<String>,
    // @field: hard breaks in order of appearance
    line_breaks: Vec<String>,
}

impl ShieldedText {
    /// Text with nothing to protect
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            tags: Vec::new(),
            line_breaks: Vec::new(),
        }
    }

    /// Number of protected fragments
    pub fn protected_count(&self) -> usize {
        self.tags.len() + self.line_breaks.len()
    }
}

/// Masks and restores ASS markup
pub struct TagShield;

impl TagShield {
    /// Replace override blocks and hard breaks with placeholders
    pub fn shield(text: &str) -> ShieldedText {
        let mut tags = Vec::new();
        let mut line_breaks = Vec::new();

        let masked = MARKUP_REGEX.replace_all(text, |caps: &regex::Captures| {
            let fragment = caps[0].to_string();
            if fragment.starts_with('{') {
                tags.push(fragment);
                TAG_PLACEHOLDER
            } else {
                line_breaks.push(fragment);
                LINEBREAK_PLACEHOLDER
            }
        });

        ShieldedText {
            text: masked.into_owned(),
            tags,
            line_breaks,
        }
    }

    /// Put the original fragments back into a corrected segment
    pub fn unshield(
        corrected: &str,
        original: &ShieldedText,
        cue_index: usize,
    ) -> Result<String, ReassemblyError> {
        let found: Vec<&str> = PLACEHOLDER_REGEX
            .find_iter(corrected)
            .map(|m| m.as_str())
            .collect();
        let found_tags = found.iter().filter(|p| **p == TAG_PLACEHOLDER).count();
        let found_breaks = found.len() - found_tags;

        if found_tags != original.tags.len() || found_breaks != original.line_breaks.len() {
            return Err(ReassemblyError::TagMismatch {
                cue_index,
                expected: original.protected_count(),
                received: found.len(),
            });
        }

        let mut tags = original.tags.iter();
        let mut line_breaks = original.line_breaks.iter();
        let restored = PLACEHOLDER_REGEX.replace_all(corrected, |caps: &regex::Captures| {
            let fragment = if &caps[0] == TAG_PLACEHOLDER {
                tags.next()
            } else {
                line_breaks.next()
            };
            fragment.cloned().unwrap_or_default()
        });

        Ok(restored.into_owned())
    }
}
