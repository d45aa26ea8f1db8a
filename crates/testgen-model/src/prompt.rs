//! Prompt assembly with bounded per-file input size.

use serde::{Deserialize, Serialize};

use crate::parser::Suggestion;

/// Per-file cap on prompt input, for cost and latency control.
pub const MAX_FILE_CHARS: usize = 4000;
pub const TRUNCATION_MARKER: &str = "\n/* ...truncated... */";

/// One source file submitted for suggestion generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    pub content: String,
}

/// Clip `content` to `MAX_FILE_CHARS` characters, appending the marker
/// only when something was actually cut.
pub fn truncate_content(content: &str) -> String {
    let mut chars = content.char_indices();
    match chars.nth(MAX_FILE_CHARS) {
        Some((byte_offset, _)) => format!("{}{TRUNCATION_MARKER}", &content[..byte_offset]),
        None => content.to_owned(),
    }
}

/// Prompt asking for one or more fixed-format suggestion blocks.
pub fn summary_prompt(files: &[SourceFile]) -> String {
    let sections: Vec<String> = files
        .iter()
        .map(|file| {
            format!(
                "Filename: {}\n---\n{}",
                file.filename,
                truncate_content(&file.content)
            )
        })
        .collect();

    format!(
        "You are a senior test engineer. For each file below, propose *one or more* specific test cases.\n\
         Return in this strict list format (repeat for each test):\n\n\
         - Filename: <file path>\n\
         - Summary: <one concise line>\n\
         - Purpose: <short reason focusing on behavior or edge case>\n\n\
         Files:\n{}",
        sections.join("\n\n")
    )
}

/// Prompt asking for the test code for one accepted suggestion.
pub fn code_prompt(suggestion: &Suggestion) -> String {
    format!(
        "You are an expert test engineer. Generate only the test code (no commentary).\n\
         Choose the correct framework:\n\
         - JS/TS/React: Jest + React Testing Library if applicable\n\
         - Python: pytest\n\
         - Java: JUnit 5\n\n\
         Filename: {}\n\
         Test Summary: {}\n\
         Purpose: {}\n\n\
         Constraints:\n\
         - Import the subject under test correctly based on filename.\n\
         - Make tests deterministic, no external IO/network.\n\
         - Include at least one edge-case assertion.\n\
         - Output ONLY code.",
        suggestion.filename, suggestion.summary, suggestion.purpose
    )
}
