//! Environment-driven configuration, resolved once at startup and
//! injected into handlers through the shared state.

use anyhow::{Context, Result};

const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_client_id: String,
    pub github_client_secret: String,
    pub gemini_api_key: String,
    /// The single browser origin allowed to make credentialed requests.
    pub client_origin: String,
    /// Controls the `Secure` flag on the session cookie.
    pub production: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            github_client_id: require("GITHUB_CLIENT_ID")?,
            github_client_secret: require("GITHUB_CLIENT_SECRET")?,
            gemini_api_key: require("GEMINI_API_KEY")?,
            client_origin: std::env::var("CLIENT_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_CLIENT_ORIGIN.to_owned()),
            production: std::env::var("APP_ENV").is_ok_and(|env| env == "production"),
        })
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}
