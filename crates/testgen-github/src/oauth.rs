//! GitHub OAuth web-flow: authorize URL and one-shot code-for-token
//! exchange. No retry; a response without a token is a hard failure.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GithubError, GithubResult};

pub const GITHUB_OAUTH_BASE: &str = "https://github.com/login/oauth";
const OAUTH_SCOPE: &str = "repo,user";

#[derive(Debug, Clone)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Overridable for wire tests; defaults to github.com.
    pub base_url: String,
}

impl OauthConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: GITHUB_OAUTH_BASE.to_owned(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Provider page the browser is redirected to for consent.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/authorize?client_id={}&scope={}",
            self.base_url,
            self.client_id,
            OAUTH_SCOPE.replace(',', "%2C")
        )
    }
}

#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Exchange an authorization code for a bearer token.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &OauthConfig,
    code: &str,
) -> GithubResult<String> {
    debug!("exchanging OAuth code for access token");
    let response = client
        .post(format!("{}/access_token", config.base_url))
        .header("Accept", "application/json")
        .json(&ExchangeRequest {
            client_id: &config.client_id,
            client_secret: &config.client_secret,
            code,
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(GithubError::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    let exchange: ExchangeResponse = response.json().await?;
    exchange.access_token.ok_or(GithubError::OauthExchangeFailed)
}
