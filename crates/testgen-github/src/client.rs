//! reqwest-backed implementation of the [`GithubApi`] port.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use crate::api::GithubApi;
use crate::error::{GithubError, GithubResult};
use crate::types::{
    BranchRef, NewFile, NewPullRequest, PullRequest, Repository, TreeEntry, TreeResponse,
    UserProfile,
};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = "testgen-api";
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct GithubRestClient {
    client: Client,
    base_url: String,
}

impl GithubRestClient {
    pub fn new() -> GithubResult<Self> {
        Self::with_base_url(GITHUB_API_BASE)
    }

    /// Point the client at a different API root (used by wire tests).
    pub fn with_base_url(base_url: impl Into<String>) -> GithubResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn get(&self, token: &str, path: &str) -> RequestBuilder {
        self.request(self.client.get(self.url(path)), token)
    }

    fn post(&self, token: &str, path: &str) -> RequestBuilder {
        self.request(self.client.post(self.url(path)), token)
    }

    fn put(&self, token: &str, path: &str) -> RequestBuilder {
        self.request(self.client.put(self.url(path)), token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

/// Map a non-success response to `GithubError::Upstream`, preferring the
/// `message` field GitHub puts in its error bodies.
async fn check(response: Response) -> GithubResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    #[derive(Deserialize)]
    struct GithubMessage {
        message: String,
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GithubMessage>(&body)
        .map(|m| m.message)
        .unwrap_or(body);

    Err(GithubError::Upstream {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl GithubApi for GithubRestClient {
    async fn current_user(&self, token: &str) -> GithubResult<UserProfile> {
        let response = check(self.get(token, "/user").send().await?).await?;
        Ok(response.json().await?)
    }

    async fn list_repositories(&self, token: &str) -> GithubResult<Vec<Repository>> {
        let response = check(
            self.get(token, "/user/repos?per_page=100&sort=updated")
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    async fn repository(&self, token: &str, owner: &str, repo: &str) -> GithubResult<Repository> {
        let response = check(
            self.get(token, &format!("/repos/{owner}/{repo}"))
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    async fn file_tree(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> GithubResult<Vec<TreeEntry>> {
        debug!(owner, repo, branch, "fetching recursive file tree");
        let response = check(
            self.get(
                token,
                &format!("/repos/{owner}/{repo}/git/trees/{branch}?recursive=1"),
            )
            .send()
            .await?,
        )
        .await?;
        let tree: TreeResponse = response.json().await?;
        Ok(tree.tree)
    }

    async fn file_content(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> GithubResult<String> {
        let response = check(
            self.get(token, &format!("/repos/{owner}/{repo}/contents/{path}"))
                .send()
                .await?,
        )
        .await?;
        let contents: ContentsResponse = response.json().await?;

        // GitHub returns base64 with embedded newlines.
        let raw: String = contents
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = BASE64
            .decode(raw)
            .map_err(|error| GithubError::ContentDecode(error.to_string()))?;
        String::from_utf8(bytes).map_err(|error| GithubError::ContentDecode(error.to_string()))
    }

    async fn branch_ref(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> GithubResult<BranchRef> {
        let response = check(
            self.get(token, &format!("/repos/{owner}/{repo}/git/ref/heads/{branch}"))
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    async fn create_branch(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> GithubResult<()> {
        debug!(owner, repo, branch, sha, "creating branch ref");
        let body = serde_json::json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": sha,
        });
        check(
            self.post(token, &format!("/repos/{owner}/{repo}/git/refs"))
                .json(&body)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn create_file(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
        file: &NewFile,
    ) -> GithubResult<()> {
        debug!(owner, repo, path, branch = %file.branch, "creating file");
        check(
            self.put(token, &format!("/repos/{owner}/{repo}/contents/{path}"))
                .json(file)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn open_pull_request(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        pull: &NewPullRequest,
    ) -> GithubResult<PullRequest> {
        debug!(owner, repo, head = %pull.head, base = %pull.base, "opening pull request");
        let response = check(
            self.post(token, &format!("/repos/{owner}/{repo}/pulls"))
                .json(pull)
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn current_user_parses_profile() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/user")
            .match_header("authorization", "Bearer t0ken")
            .match_header("x-github-api-version", API_VERSION)
            .with_status(200)
            .with_body(r#"{"login":"octocat","id":1,"name":"Octo Cat"}"#)
            .create_async()
            .await;

        let client = GithubRestClient::with_base_url(server.url())?;
        let user = client.current_user("t0ken").await?;

        assert_eq!(user.login, "octocat");
        assert_eq!(user.name.as_deref(), Some("Octo Cat"));
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn upstream_error_carries_status_and_message() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/acme/missing")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let client = GithubRestClient::with_base_url(server.url())?;
        let error = client
            .repository("t0ken", "acme", "missing")
            .await
            .expect_err("404 should surface as an error");

        match error {
            GithubError::Upstream { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn file_content_decodes_wrapped_base64() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        // "hello world" split across lines, as GitHub serves it.
        server
            .mock("GET", "/repos/acme/widgets/contents/src/hello.js")
            .with_status(200)
            .with_body(r#"{"content":"aGVsbG8g\nd29ybGQ=\n","encoding":"base64"}"#)
            .create_async()
            .await;

        let client = GithubRestClient::with_base_url(server.url())?;
        let content = client
            .file_content("t0ken", "acme", "widgets", "src/hello.js")
            .await?;

        assert_eq!(content, "hello world");
        Ok(())
    }

    #[tokio::test]
    async fn file_tree_unwraps_tree_array() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/acme/widgets/git/trees/main?recursive=1")
            .with_status(200)
            .with_body(
                r#"{"tree":[{"path":"src/a.js","type":"blob","sha":"s1","size":10},
                           {"path":"src","type":"tree","sha":"s2"}],"truncated":false}"#,
            )
            .create_async()
            .await;

        let client = GithubRestClient::with_base_url(server.url())?;
        let tree = client.file_tree("t0ken", "acme", "widgets", "main").await?;

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].path, "src/a.js");
        Ok(())
    }
}
