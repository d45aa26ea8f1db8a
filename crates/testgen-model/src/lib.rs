//! Test-case generation against a text-generation model.
//!
//! Two operations: turn a batch of source files into structured test
//! suggestions, and turn one accepted suggestion into raw test code.
//! Both are single model calls; the output of the first is recovered
//! through the best-effort [`SuggestionParser`].

mod client;
mod error;
mod parser;
mod prompt;

pub use client::{DEFAULT_MODEL, GEMINI_API_BASE, GeminiClient, TextGenerator};
pub use error::{ModelError, ModelResult};
pub use parser::{ParseMode, Suggestion, SuggestionParser};
pub use prompt::{MAX_FILE_CHARS, SourceFile, TRUNCATION_MARKER, code_prompt, summary_prompt};

/// Propose test cases for a non-empty batch of source files.
///
/// Malformed model output yields a shorter (possibly empty) list, not
/// an error; only an empty input batch or a failed model call fails.
pub async fn generate_suggestions(
    generator: &dyn TextGenerator,
    parser: &SuggestionParser,
    files: &[SourceFile],
) -> ModelResult<Vec<Suggestion>> {
    if files.is_empty() {
        return Err(ModelError::MissingInput("files[]"));
    }

    let text = generator.generate(&summary_prompt(files)).await?;
    parser.parse(&text)
}

/// Generate test code for one suggestion. The result is opaque text;
/// nothing validates or executes it here.
pub async fn generate_test_code(
    generator: &dyn TextGenerator,
    suggestion: &Suggestion,
) -> ModelResult<String> {
    if suggestion.filename.is_empty() {
        return Err(ModelError::MissingInput("filename"));
    }
    if suggestion.summary.is_empty() {
        return Err(ModelError::MissingInput("summary"));
    }
    if suggestion.purpose.is_empty() {
        return Err(ModelError::MissingInput("purpose"));
    }

    let code = generator.generate(&code_prompt(suggestion)).await?;
    Ok(code.trim().to_owned())
}
