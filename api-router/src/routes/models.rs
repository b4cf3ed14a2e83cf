use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

/// Lists every review backend with its current availability, plus the
/// model the dispatcher uses when a request names none.
pub async fn list_models(State(state): State<ApiState>) -> impl IntoResponse {
    let models = state.dispatcher.list_models().await;
    Json(json!({
        "models": models,
        "default": state.dispatcher.default_model(),
    }))
}
