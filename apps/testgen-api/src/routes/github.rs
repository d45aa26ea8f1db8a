//! Guarded GitHub relay endpoints: profile, repositories, file tree,
//! file content, and the create-pr flow.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::json;
use testgen_github::{
    PullRequestSpec, Repository, TreeEntry, UserProfile, filter_source_entries,
    open_test_pull_request,
};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::session::SessionToken;

pub async fn user(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state.github.current_user(&token).await?;
    Ok(Json(profile))
}

pub async fn repos(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Repository>>> {
    let repositories = state.github.list_repositories(&token).await?;
    Ok(Json(repositories))
}

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    owner: Option<String>,
    repo: Option<String>,
    branch: Option<String>,
}

pub async fn files(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Query(query): Query<FilesQuery>,
) -> ApiResult<Json<Vec<TreeEntry>>> {
    let owner = require(query.owner, "owner")?;
    let repo = require(query.repo, "repo")?;
    let branch = query.branch.unwrap_or_else(|| "main".to_owned());

    let entries = state.github.file_tree(&token, &owner, &repo, &branch).await?;
    Ok(Json(filter_source_entries(entries)))
}

#[derive(Debug, Deserialize)]
pub struct FileContentQuery {
    owner: Option<String>,
    repo: Option<String>,
    path: Option<String>,
}

pub async fn file_content(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Query(query): Query<FileContentQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let owner = require(query.owner, "owner")?;
    let repo = require(query.repo, "repo")?;
    let path = require(query.path, "path")?;

    let content = state.github.file_content(&token, &owner, &repo, &path).await?;
    Ok(Json(json!({ "content": content })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrRequest {
    #[serde(default)]
    owner: String,
    #[serde(default)]
    repo: String,
    #[serde(default)]
    test_path: String,
    #[serde(default)]
    test_code: String,
    title: Option<String>,
    body: Option<String>,
    base_branch: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrResponse {
    pr_number: u64,
    pr_url: String,
}

/// Field validation happens inside the flow, before any upstream call.
pub async fn create_pr(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Json(request): Json<CreatePrRequest>,
) -> ApiResult<Json<CreatePrResponse>> {
    let spec = PullRequestSpec {
        owner: request.owner,
        repo: request.repo,
        test_path: request.test_path,
        test_code: request.test_code,
        title: request.title,
        body: request.body,
        base_branch: request.base_branch,
    };

    let created = open_test_pull_request(state.github.as_ref(), &token, &spec).await?;
    Ok(Json(CreatePrResponse {
        pr_number: created.number,
        pr_url: created.url,
    }))
}

fn require(value: Option<String>, name: &'static str) -> ApiResult<String> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{name} is required")))
}
