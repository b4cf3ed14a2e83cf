use analysis_pipeline::StaticAnalysis;
use axum::{extract::State, response::IntoResponse, Form};
use axum_htmx::HxRequest;
use minijinja::context;
use review_pipeline::review::AiReview;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::HtmlError,
    html_state::HtmlState,
    render::{render_fragment, render_page},
    routes::index::ModelOption,
};

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub code: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct ReportContext {
    #[serde(flatten)]
    pub(crate) static_analysis: StaticAnalysis,
    pub(crate) ai_review: AiReview,
}

/// Runs the full analysis for a form submission. htmx requests get the
/// report fragment alone; plain submissions get the whole page back.
pub async fn review_handler(
    State(state): State<HtmlState>,
    HxRequest(is_htmx): HxRequest,
    Form(input): Form<ReviewForm>,
) -> Result<impl IntoResponse, HtmlError> {
    if input.code.trim().is_empty() {
        return Err(HtmlError::BadRequest("Paste some code first.".to_string()));
    }
    if input.code.len() > state.config.max_code_bytes {
        return Err(HtmlError::BadRequest(format!(
            "Code exceeds the {} byte limit.",
            state.config.max_code_bytes
        )));
    }

    let model = input.model.as_deref().filter(|m| !m.is_empty());
    info!(
        code_bytes = input.code.len(),
        model = model.unwrap_or("default"),
        htmx = is_htmx,
        "Review form submitted"
    );

    let report = ReportContext {
        static_analysis: analysis_pipeline::analyze(&input.code, model),
        ai_review: state.dispatcher.review(&input.code, model).await,
    };

    if is_htmx {
        let ctx = context! { report => report };
        return Ok(render_fragment(&state, "report.html", "report", &ctx)?);
    }

    let models: Vec<ModelOption> = state
        .dispatcher
        .list_models()
        .await
        .into_iter()
        .map(|model| ModelOption {
            id: model.id,
            name: model.name,
            available: model.available,
        })
        .collect();
    let ctx = context! {
        models => models,
        default_model => state.dispatcher.default_model(),
        report => report,
        code => input.code,
    };
    Ok(render_page(&state, "index.html", &ctx)?)
}
