use axum::{extract::State, response::IntoResponse};
use minijinja::context;
use serde::Serialize;

use crate::{error::HtmlError, html_state::HtmlState, render::render_page};

#[derive(Serialize)]
pub struct ModelOption {
    pub id: String,
    pub name: String,
    pub available: bool,
}

pub async fn index_handler(State(state): State<HtmlState>) -> Result<impl IntoResponse, HtmlError> {
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
    };
    render_page(&state, "index.html", &ctx)
}
