//! Concurrent fetch of several file contents for the suggestion flow.

use futures_util::future::join_all;
use tracing::warn;

use crate::api::GithubApi;
use crate::types::FetchedFile;

/// Fetch every path concurrently and keep the ones that succeed, in the
/// order the paths were given. A failed fetch is logged and dropped
/// rather than failing the whole batch.
pub async fn fetch_sources(
    api: &dyn GithubApi,
    token: &str,
    owner: &str,
    repo: &str,
    paths: &[String],
) -> Vec<FetchedFile> {
    let fetches = paths
        .iter()
        .map(|path| async move { (path, api.file_content(token, owner, repo, path).await) });

    join_all(fetches)
        .await
        .into_iter()
        .filter_map(|(path, result)| match result {
            Ok(content) => Some(FetchedFile {
                path: path.clone(),
                content,
            }),
            Err(error) => {
                warn!(%path, %error, "skipping file that failed to fetch");
                None
            }
        })
        .collect()
}
