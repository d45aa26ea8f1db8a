//! Error types for GitHub API interactions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GithubError {
    /// The GitHub API answered with a non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The HTTP call itself failed (DNS, connect, timeout, body decode).
    #[error("GitHub API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The OAuth token exchange completed but carried no access token.
    #[error("OAuth exchange returned no access token")]
    OauthExchangeFailed,

    /// A required request field was missing or empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Upstream content could not be decoded (bad base64, bad UTF-8).
    #[error("failed to decode file content: {0}")]
    ContentDecode(String),
}

impl GithubError {
    /// Status to surface to the caller: the upstream status when known,
    /// 502 for transport failures, 400 for input errors.
    pub fn surface_status(&self) -> u16 {
        match self {
            Self::Upstream { status, .. } => *status,
            Self::Transport(_) | Self::ContentDecode(_) => 502,
            Self::OauthExchangeFailed | Self::MissingField(_) => 400,
        }
    }
}

pub type GithubResult<T> = Result<T, GithubError>;
