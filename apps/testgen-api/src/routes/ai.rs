//! Model-backed generation endpoints.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::json;
use testgen_model::{SourceFile, Suggestion, generate_suggestions, generate_test_code};

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::Json;

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    files: Vec<SourceFile>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    summary: Vec<Suggestion>,
}

pub async fn generate_test_summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> ApiResult<Json<SummaryResponse>> {
    let suggestions =
        generate_suggestions(state.model.as_ref(), &state.parser, &request.files).await?;
    Ok(Json(SummaryResponse {
        summary: suggestions,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    #[serde(default)]
    filename: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    purpose: String,
}

pub async fn generate_code(
    State(state): State<AppState>,
    Json(request): Json<CodeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let suggestion = Suggestion {
        filename: request.filename,
        summary: request.summary,
        purpose: request.purpose,
    };

    let code = generate_test_code(state.model.as_ref(), &suggestion).await?;
    Ok(Json(json!({ "code": code })))
}
