//! Best-effort extraction of suggestion records from free-form model
//! output.
//!
//! The model is instructed to emit blank-line separated blocks of
//! `- Filename:` / `- Summary:` / `- Purpose:` lines, but its output is
//! not trusted: in lenient mode a block missing any field is dropped,
//! in strict mode it is reported. Neither mode ever panics, and the
//! returned list may be shorter than the number of blocks.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// A single proposed test case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestion {
    pub filename: String,
    pub summary: String,
    pub purpose: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Drop malformed blocks silently (the endpoint behavior).
    #[default]
    Lenient,
    /// Error on a block that has some but not all of the three fields.
    Strict,
}

#[derive(Debug, Clone)]
pub struct SuggestionParser {
    mode: ParseMode,
    filename: Regex,
    summary: Regex,
    purpose: Regex,
}

impl Default for SuggestionParser {
    fn default() -> Self {
        Self::new(ParseMode::default())
    }
}

impl SuggestionParser {
    pub fn new(mode: ParseMode) -> Self {
        // A label only counts when introduced by at least one dash;
        // a bare "Filename:" line is prose.
        Self {
            mode,
            filename: Regex::new(r"(?i)-+\s*Filename:\s*(.+)").expect("static pattern"),
            summary: Regex::new(r"(?i)-+\s*Summary:\s*(.+)").expect("static pattern"),
            purpose: Regex::new(r"(?i)-+\s*Purpose:\s*(.+)").expect("static pattern"),
        }
    }

    /// Split on blank-line runs and keep every block carrying all three
    /// fields, in source order.
    pub fn parse(&self, text: &str) -> ModelResult<Vec<Suggestion>> {
        let mut suggestions = Vec::new();

        for block in split_blocks(text) {
            let filename = self.capture(&self.filename, block);
            let summary = self.capture(&self.summary, block);
            let purpose = self.capture(&self.purpose, block);

            match (filename, summary, purpose) {
                (Some(filename), Some(summary), Some(purpose)) => suggestions.push(Suggestion {
                    filename,
                    summary,
                    purpose,
                }),
                (None, None, None) => {} // prose, not a suggestion block
                _ if self.mode == ParseMode::Strict => {
                    return Err(ModelError::MalformedBlock(block.trim().to_owned()));
                }
                _ => {}
            }
        }

        Ok(suggestions)
    }

    fn capture(&self, pattern: &Regex, block: &str) -> Option<String> {
        pattern
            .captures(block)
            .and_then(|captures| captures.get(1))
            .map(|field| field.as_str().trim().to_owned())
            .filter(|field| !field.is_empty())
    }
}

fn split_blocks(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n")
        .flat_map(|chunk| chunk.split("\r\n\r\n"))
        .map(str::trim)
        .filter(|block| !block.is_empty())
}
