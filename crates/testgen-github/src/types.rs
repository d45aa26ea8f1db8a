//! Wire types for the subset of the GitHub REST API this service uses.

use serde::{Deserialize, Serialize};

/// Authenticated user profile (`GET /user`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// Repository listing entry (`GET /user/repos`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: RepositoryOwner,
    #[serde(default)]
    pub private: bool,
    pub default_branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One node of a recursive git tree (`GET /repos/{o}/{r}/git/trees/{branch}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: TreeEntryKind,
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeEntryKind {
    Blob,
    Tree,
    Commit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

/// Branch reference (`GET /repos/{o}/{r}/git/ref/heads/{branch}`).
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: RefObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefObject {
    pub sha: String,
}

/// Pull request as returned by `POST /repos/{o}/{r}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// Payload for creating a file via the contents API.
#[derive(Debug, Clone, Serialize)]
pub struct NewFile {
    pub message: String,
    /// Base64-encoded file body.
    pub content: String,
    pub branch: String,
}

/// Payload for opening a pull request.
#[derive(Debug, Clone, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

/// A file fetched through the contents API, decoded to text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchedFile {
    pub path: String,
    pub content: String,
}
