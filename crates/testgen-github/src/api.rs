//! Runtime port for GitHub API access.
//!
//! The server and the pull-request flow talk to GitHub only through this
//! trait, so tests can substitute a recording stub and assert which
//! upstream calls were (or were not) made.
//!
//! The bearer token is an argument on every call rather than client state:
//! the credential lives in the caller's session cookie and differs per
//! request, while one client instance is shared across all of them.

use async_trait::async_trait;

use crate::error::GithubResult;
use crate::types::{
    BranchRef, NewFile, NewPullRequest, PullRequest, Repository, TreeEntry, UserProfile,
};

#[async_trait]
pub trait GithubApi: Send + Sync {
    /// `GET /user`
    async fn current_user(&self, token: &str) -> GithubResult<UserProfile>;

    /// `GET /user/repos` — first page only, 100 per page, newest first.
    async fn list_repositories(&self, token: &str) -> GithubResult<Vec<Repository>>;

    /// `GET /repos/{owner}/{repo}` — full repository record.
    async fn repository(&self, token: &str, owner: &str, repo: &str) -> GithubResult<Repository>;

    /// `GET /repos/{owner}/{repo}/git/trees/{branch}?recursive=1`
    async fn file_tree(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> GithubResult<Vec<TreeEntry>>;

    /// `GET /repos/{owner}/{repo}/contents/{path}` — decoded to text.
    async fn file_content(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> GithubResult<String>;

    /// `GET /repos/{owner}/{repo}/git/ref/heads/{branch}`
    async fn branch_ref(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> GithubResult<BranchRef>;

    /// `POST /repos/{owner}/{repo}/git/refs` — new branch at `sha`.
    async fn create_branch(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> GithubResult<()>;

    /// `PUT /repos/{owner}/{repo}/contents/{path}` — create a file.
    async fn create_file(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
        file: &NewFile,
    ) -> GithubResult<()>;

    /// `POST /repos/{owner}/{repo}/pulls`
    async fn open_pull_request(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        pull: &NewPullRequest,
    ) -> GithubResult<PullRequest>;
}
