//! The five-step pull-request creation flow.
//!
//! Strictly sequential; each step consumes the previous step's result
//! and the first failure aborts the remainder. There is no rollback: a
//! failure after branch creation leaves the branch in place, matching
//! the upstream-visible behavior this flow has always had.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use tracing::{info, instrument};

use crate::api::GithubApi;
use crate::error::{GithubError, GithubResult};
use crate::types::{NewFile, NewPullRequest};

pub const DEFAULT_PR_TITLE: &str = "Add generated test cases";
pub const DEFAULT_PR_BODY: &str =
    "This PR was created automatically by the test case generator.";
const FALLBACK_BASE_BRANCH: &str = "main";

/// Everything needed to open a PR carrying one generated test file.
#[derive(Debug, Clone)]
pub struct PullRequestSpec {
    pub owner: String,
    pub repo: String,
    pub test_path: String,
    pub test_code: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub base_branch: Option<String>,
}

impl PullRequestSpec {
    /// Reject the request before any upstream call is made.
    pub fn validate(&self) -> GithubResult<()> {
        if self.owner.is_empty() {
            return Err(GithubError::MissingField("owner"));
        }
        if self.repo.is_empty() {
            return Err(GithubError::MissingField("repo"));
        }
        if self.test_path.is_empty() {
            return Err(GithubError::MissingField("testPath"));
        }
        if self.test_code.is_empty() {
            return Err(GithubError::MissingField("testCode"));
        }
        Ok(())
    }

    fn commit_message(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("test: add tests for {}", self.test_path))
    }
}

/// Terminal artifact of the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPullRequest {
    pub number: u64,
    pub url: String,
}

/// Branch name for a generated-tests branch. Millisecond timestamp is
/// the only collision avoidance; two requests in the same millisecond
/// will race and the second branch creation fails upstream.
fn generated_branch_name() -> String {
    format!("testcases/{}", Utc::now().timestamp_millis())
}

#[instrument(skip(api, token, spec), fields(owner = %spec.owner, repo = %spec.repo, path = %spec.test_path))]
pub async fn open_test_pull_request(
    api: &dyn GithubApi,
    token: &str,
    spec: &PullRequestSpec,
) -> GithubResult<CreatedPullRequest> {
    spec.validate()?;
    let owner = &spec.owner;
    let repo = &spec.repo;

    // 1) repo metadata decides the base branch when none was supplied
    let repository = api.repository(token, owner, repo).await?;
    let base = spec
        .base_branch
        .clone()
        .filter(|branch| !branch.is_empty())
        .unwrap_or(if repository.default_branch.is_empty() {
            FALLBACK_BASE_BRANCH.to_owned()
        } else {
            repository.default_branch
        });

    // 2) current commit of the base branch
    let base_ref = api.branch_ref(token, owner, repo, &base).await?;
    let base_sha = base_ref.object.sha;

    // 3) new branch at that commit
    let branch = generated_branch_name();
    api.create_branch(token, owner, repo, &branch, &base_sha)
        .await?;

    // 4) test file on the new branch
    let file = NewFile {
        message: spec.commit_message(),
        content: BASE64.encode(spec.test_code.as_bytes()),
        branch: branch.clone(),
    };
    api.create_file(token, owner, repo, &spec.test_path, &file)
        .await?;

    // 5) the pull request itself
    let pull = NewPullRequest {
        title: spec.title.clone().unwrap_or_else(|| DEFAULT_PR_TITLE.to_owned()),
        head: branch,
        base,
        body: spec.body.clone().unwrap_or_else(|| DEFAULT_PR_BODY.to_owned()),
    };
    let created = api.open_pull_request(token, owner, repo, &pull).await?;

    info!(number = created.number, url = %created.html_url, "opened pull request");
    Ok(CreatedPullRequest {
        number: created.number,
        url: created.html_url,
    })
}
