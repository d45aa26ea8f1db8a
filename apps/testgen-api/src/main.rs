use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde_json::json;
use testgen_github::{GithubApi, GithubRestClient, OauthConfig};
use testgen_model::{GeminiClient, SuggestionParser, TextGenerator};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod config;
mod error;
mod extract;
mod routes;
mod session;

use crate::config::AppConfig;
use crate::error::ApiError;

#[derive(Debug, Parser)]
#[command(name = "testgen-api")]
#[command(about = "Backend for the GitHub test-case generator")]
struct Cli {
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,
}

#[derive(Clone)]
pub struct AppState {
    pub github: Arc<dyn GithubApi>,
    pub model: Arc<dyn TextGenerator>,
    pub parser: SuggestionParser,
    pub oauth: OauthConfig,
    pub http: reqwest::Client,
    pub client_origin: String,
    pub secure_cookies: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let state = AppState {
        github: Arc::new(GithubRestClient::new()?),
        model: Arc::new(GeminiClient::new(config.gemini_api_key.clone())?),
        parser: SuggestionParser::default(),
        oauth: OauthConfig::new(config.github_client_id.clone(), config.github_client_secret.clone()),
        http: reqwest::Client::new(),
        client_origin: config.client_origin.clone(),
        secure_cookies: config.production,
    };

    let app = build_app(state)?;

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    info!(listen = %cli.listen, origin = %config.client_origin, "testgen-api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_app(state: AppState) -> Result<Router> {
    // Credentialed CORS is only valid for an explicit origin.
    let cors = CorsLayer::new()
        .allow_origin(state.client_origin.parse::<HeaderValue>()?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/healthz", get(healthz))
        .route("/auth/github", get(routes::auth::login))
        .route("/auth/github/callback", get(routes::auth::callback))
        .route("/api/github/user", get(routes::github::user))
        .route("/api/github/repos", get(routes::github::repos))
        .route("/api/github/files", get(routes::github::files))
        .route("/api/github/file-content", get(routes::github::file_content))
        .route("/api/github/create-pr", post(routes::github::create_pr))
        .route(
            "/api/ai/generate-test-summary",
            post(routes::ai::generate_test_summary),
        )
        .route("/api/ai/generate-test-code", post(routes::ai::generate_code))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    {
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(error) => {
                    tracing::error!(%error, "failed to install SIGTERM handler");
                }
            }
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use testgen_github::{
        BranchRef, GithubResult, NewFile, NewPullRequest, PullRequest, RefObject, Repository,
        RepositoryOwner, TreeEntry, TreeEntryKind, UserProfile,
    };
    use testgen_model::{ModelResult, SuggestionParser};
    use tower::util::ServiceExt;

    use super::*;

    /// Records upstream calls so tests can assert which were attempted.
    #[derive(Default)]
    struct RecordingStub {
        calls: Mutex<Vec<String>>,
        branches: Mutex<Vec<(String, String)>>,
        pulls: Mutex<Vec<NewPullRequest>>,
        files: Mutex<Vec<String>>,
    }

    impl RecordingStub {
        fn record(&self, step: &str) {
            self.calls.lock().unwrap().push(step.to_owned());
        }

        fn call_log(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GithubApi for RecordingStub {
        async fn current_user(&self, _token: &str) -> GithubResult<UserProfile> {
            self.record("current_user");
            Ok(UserProfile {
                login: "octocat".to_owned(),
                id: 1,
                name: None,
                avatar_url: None,
            })
        }

        async fn list_repositories(&self, _token: &str) -> GithubResult<Vec<Repository>> {
            self.record("list_repositories");
            Ok(Vec::new())
        }

        async fn repository(
            &self,
            _token: &str,
            owner: &str,
            repo: &str,
        ) -> GithubResult<Repository> {
            self.record("repository");
            Ok(Repository {
                id: 7,
                name: repo.to_owned(),
                full_name: format!("{owner}/{repo}"),
                owner: RepositoryOwner {
                    login: owner.to_owned(),
                },
                private: false,
                default_branch: "main".to_owned(),
                updated_at: None,
            })
        }

        async fn file_tree(
            &self,
            _token: &str,
            _owner: &str,
            _repo: &str,
            _branch: &str,
        ) -> GithubResult<Vec<TreeEntry>> {
            self.record("file_tree");
            Ok(vec![
                TreeEntry {
                    path: "src/app.ts".to_owned(),
                    kind: TreeEntryKind::Blob,
                    sha: "s1".to_owned(),
                    size: Some(64),
                },
                TreeEntry {
                    path: "README.md".to_owned(),
                    kind: TreeEntryKind::Blob,
                    sha: "s2".to_owned(),
                    size: Some(16),
                },
            ])
        }

        async fn file_content(
            &self,
            _token: &str,
            _owner: &str,
            _repo: &str,
            _path: &str,
        ) -> GithubResult<String> {
            self.record("file_content");
            Ok("export const x = 1;".to_owned())
        }

        async fn branch_ref(
            &self,
            _token: &str,
            _owner: &str,
            _repo: &str,
            branch: &str,
        ) -> GithubResult<BranchRef> {
            self.record("branch_ref");
            Ok(BranchRef {
                name: format!("refs/heads/{branch}"),
                object: RefObject {
                    sha: "abc123".to_owned(),
                },
            })
        }

        async fn create_branch(
            &self,
            _token: &str,
            _owner: &str,
            _repo: &str,
            branch: &str,
            sha: &str,
        ) -> GithubResult<()> {
            self.record("create_branch");
            self.branches
                .lock()
                .unwrap()
                .push((branch.to_owned(), sha.to_owned()));
            Ok(())
        }

        async fn create_file(
            &self,
            _token: &str,
            _owner: &str,
            _repo: &str,
            path: &str,
            _file: &NewFile,
        ) -> GithubResult<()> {
            self.record("create_file");
            self.files.lock().unwrap().push(path.to_owned());
            Ok(())
        }

        async fn open_pull_request(
            &self,
            _token: &str,
            _owner: &str,
            _repo: &str,
            pull: &NewPullRequest,
        ) -> GithubResult<PullRequest> {
            self.record("open_pull_request");
            self.pulls.lock().unwrap().push(pull.clone());
            Ok(PullRequest {
                number: 42,
                html_url: "https://github.com/acme/widgets/pull/42".to_owned(),
            })
        }
    }

    struct CannedGenerator {
        text: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_owned(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str) -> ModelResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_owned());
            Ok(self.text.clone())
        }
    }

    fn test_state(github: Arc<RecordingStub>, model: Arc<CannedGenerator>) -> AppState {
        AppState {
            github,
            model,
            parser: SuggestionParser::default(),
            oauth: OauthConfig::new("cid", "secret"),
            http: reqwest::Client::new(),
            client_origin: "http://localhost:5173".to_owned(),
            secure_cookies: false,
        }
    }

    fn app(github: Arc<RecordingStub>, model: Arc<CannedGenerator>) -> Router {
        build_app(test_state(github, model)).expect("router builds")
    }

    fn get_request(uri: &str, with_cookie: bool) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if with_cookie {
            builder = builder.header("cookie", "github_token=t0ken");
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value, with_cookie: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if with_cookie {
            builder = builder.header("cookie", "github_token=t0ken");
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn healthz_is_open() {
        let response = app(Arc::default(), Arc::new(CannedGenerator::new("")))
            .oneshot(get_request("/healthz", false))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn guarded_endpoint_without_cookie_is_401_with_no_upstream_call() {
        let github = Arc::new(RecordingStub::default());
        let response = app(github.clone(), Arc::new(CannedGenerator::new("")))
            .oneshot(get_request("/api/github/user", false))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "error": "Unauthorized" }));
        assert!(github.call_log().is_empty());
    }

    #[tokio::test]
    async fn user_endpoint_relays_the_profile() {
        let github = Arc::new(RecordingStub::default());
        let response = app(github.clone(), Arc::new(CannedGenerator::new("")))
            .oneshot(get_request("/api/github/user", true))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["login"], "octocat");
        assert_eq!(github.call_log(), vec!["current_user"]);
    }

    #[tokio::test]
    async fn files_endpoint_filters_to_source_blobs() {
        let github = Arc::new(RecordingStub::default());
        let response = app(github, Arc::new(CannedGenerator::new("")))
            .oneshot(get_request(
                "/api/github/files?owner=acme&repo=widgets&branch=main",
                true,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["path"], "src/app.ts");
    }

    #[tokio::test]
    async fn files_endpoint_requires_owner_and_repo() {
        let github = Arc::new(RecordingStub::default());
        let response = app(github.clone(), Arc::new(CannedGenerator::new("")))
            .oneshot(get_request("/api/github/files?repo=widgets", true))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(github.call_log().is_empty());
    }

    #[tokio::test]
    async fn create_pr_happy_path_hits_the_five_steps_in_order() {
        let github = Arc::new(RecordingStub::default());
        let request = post_json(
            "/api/github/create-pr",
            json!({
                "owner": "acme",
                "repo": "widgets",
                "testPath": "__tests__/a.test.js",
                "testCode": "test('x',()=>{})",
                "baseBranch": "main",
            }),
            true,
        );

        let response = app(github.clone(), Arc::new(CannedGenerator::new("")))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["prNumber"], 42);
        assert_eq!(body["prUrl"], "https://github.com/acme/widgets/pull/42");

        assert_eq!(
            github.call_log(),
            vec![
                "repository",
                "branch_ref",
                "create_branch",
                "create_file",
                "open_pull_request",
            ]
        );
        let branches = github.branches.lock().unwrap();
        assert_eq!(branches[0].1, "abc123");
        let files = github.files.lock().unwrap();
        assert_eq!(files[0], "__tests__/a.test.js");
        let pulls = github.pulls.lock().unwrap();
        assert_eq!(pulls[0].base, "main");
    }

    #[tokio::test]
    async fn create_pr_missing_field_fails_fast() {
        let github = Arc::new(RecordingStub::default());
        let request = post_json(
            "/api/github/create-pr",
            json!({ "owner": "acme", "repo": "widgets", "testPath": "__tests__/a.test.js" }),
            true,
        );

        let response = app(github.clone(), Arc::new(CannedGenerator::new("")))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "testCode is required" })
        );
        assert!(github.call_log().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_body_gets_a_json_error_body() {
        let github = Arc::new(RecordingStub::default());
        let request = Request::builder()
            .method("POST")
            .uri("/api/github/create-pr")
            .header("content-type", "application/json")
            .header("cookie", "github_token=t0ken")
            .body(Body::from("{\"owner\": "))
            .unwrap();

        let response = app(github.clone(), Arc::new(CannedGenerator::new("")))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_owned();
        assert!(content_type.starts_with("application/json"));
        let body = body_json(response).await;
        assert!(body["error"].is_string());
        assert!(github.call_log().is_empty());
    }

    #[tokio::test]
    async fn create_pr_without_cookie_is_rejected() {
        let github = Arc::new(RecordingStub::default());
        let request = post_json(
            "/api/github/create-pr",
            json!({
                "owner": "acme",
                "repo": "widgets",
                "testPath": "__tests__/a.test.js",
                "testCode": "test('x',()=>{})",
            }),
            false,
        );

        let response = app(github.clone(), Arc::new(CannedGenerator::new("")))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(github.call_log().is_empty());
    }

    #[tokio::test]
    async fn summary_endpoint_parses_model_blocks() {
        let model = Arc::new(CannedGenerator::new(
            "- Filename: src/app.ts\n- Summary: renders\n- Purpose: empty props edge case",
        ));
        let request = post_json(
            "/api/ai/generate-test-summary",
            json!({ "files": [{ "filename": "src/app.ts", "content": "export {}" }] }),
            false,
        );

        let response = app(Arc::default(), model.clone())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["summary"][0]["filename"], "src/app.ts");
        assert_eq!(body["summary"][0]["purpose"], "empty props edge case");
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn summary_endpoint_rejects_empty_file_list() {
        let model = Arc::new(CannedGenerator::new("unused"));
        let request = post_json("/api/ai/generate-test-summary", json!({ "files": [] }), false);

        let response = app(Arc::default(), model.clone())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn code_endpoint_returns_trimmed_code() {
        let model = Arc::new(CannedGenerator::new("\ntest('adds', () => {});\n"));
        let request = post_json(
            "/api/ai/generate-test-code",
            json!({
                "filename": "src/app.ts",
                "summary": "renders",
                "purpose": "empty props edge case",
            }),
            false,
        );

        let response = app(Arc::default(), model).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "code": "test('adds', () => {});" })
        );
    }

    #[tokio::test]
    async fn code_endpoint_rejects_missing_fields() {
        let model = Arc::new(CannedGenerator::new("unused"));
        let request = post_json(
            "/api/ai/generate-test-code",
            json!({ "filename": "src/app.ts" }),
            false,
        );

        let response = app(Arc::default(), model).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_routes_get_a_json_404() {
        let response = app(Arc::default(), Arc::new(CannedGenerator::new("")))
            .oneshot(get_request("/api/unknown", false))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({ "error": "Not Found" }));
    }

    #[tokio::test]
    async fn login_redirects_to_the_provider() {
        let response = app(Arc::default(), Arc::new(CannedGenerator::new("")))
            .oneshot(get_request("/auth/github", false))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response.headers()["location"].to_str().unwrap();
        assert!(location.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(location.contains("client_id=cid"));
    }

    #[tokio::test]
    async fn callback_without_code_is_bad_request() {
        let response = app(Arc::default(), Arc::new(CannedGenerator::new("")))
            .oneshot(get_request("/auth/github/callback", false))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get("set-cookie").is_none());
    }
}
