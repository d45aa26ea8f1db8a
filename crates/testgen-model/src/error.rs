//! Error types for the text-generation integration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// The model API answered with a non-success status.
    #[error("model API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The HTTP call itself failed.
    #[error("model API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API key was missing or empty at construction time.
    #[error("model API key is required")]
    MissingApiKey,

    /// The model answered but the response carried no text candidate.
    #[error("model response contained no text")]
    EmptyResponse,

    /// A required input was missing or empty.
    #[error("{0} is required")]
    MissingInput(&'static str),

    /// Strict parsing found a block with some but not all expected fields.
    #[error("malformed suggestion block: {0}")]
    MalformedBlock(String),
}

impl ModelError {
    /// Status to surface to the caller: the upstream status when known,
    /// 502 for transport/empty-response failures, 400 for input errors.
    pub fn surface_status(&self) -> u16 {
        match self {
            Self::Upstream { status, .. } => *status,
            Self::Transport(_) | Self::EmptyResponse => 502,
            Self::MissingApiKey | Self::MissingInput(_) | Self::MalformedBlock(_) => 400,
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
