//! GitHub integration for the test-case generator backend.
//!
//! One reqwest-backed client behind the [`GithubApi`] port, the OAuth
//! web-flow exchange, repository browsing helpers, and the sequential
//! pull-request creation flow that ships a generated test file.

mod api;
mod batch;
mod client;
mod error;
mod oauth;
mod pr;
mod tree;
mod types;

pub use api::GithubApi;
pub use batch::fetch_sources;
pub use client::{GITHUB_API_BASE, GithubRestClient};
pub use error::{GithubError, GithubResult};
pub use oauth::{GITHUB_OAUTH_BASE, OauthConfig, exchange_code};
pub use pr::{
    CreatedPullRequest, DEFAULT_PR_BODY, DEFAULT_PR_TITLE, PullRequestSpec,
    open_test_pull_request,
};
pub use tree::filter_source_entries;
pub use types::{
    BranchRef, FetchedFile, NewFile, NewPullRequest, PullRequest, RefObject, Repository,
    RepositoryOwner, TreeEntry, TreeEntryKind, TreeResponse, UserProfile,
};
