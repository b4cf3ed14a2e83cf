use analysis_pipeline::StaticAnalysis;
use axum::{extract::State, response::IntoResponse, Json};
use review_pipeline::review::AiReview;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub code: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Static checks at the top level, AI review nested. One response shape
/// serves both the JSON API and the HTML fragment renderer.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub static_analysis: StaticAnalysis,
    pub ai_review: AiReview,
}

pub async fn analyze_code(
    State(state): State<ApiState>,
    Json(input): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if input.code.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "code must not be empty".to_string(),
        ));
    }
    if input.code.len() > state.config.max_code_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "code exceeds {} bytes",
            state.config.max_code_bytes
        )));
    }

    let model = input.model.as_deref();
    info!(
        code_bytes = input.code.len(),
        model = model.unwrap_or("default"),
        "Received analysis request"
    );

    let static_analysis = analysis_pipeline::analyze(&input.code, model);
    let ai_review = state.dispatcher.review(&input.code, model).await;

    Ok(Json(AnalyzeResponse {
        static_analysis,
        ai_review,
    }))
}
