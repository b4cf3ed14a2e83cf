use std::sync::Arc;

use common::utils::template_engine::{ProvidesTemplateEngine, TemplateEngine};
use common::{create_template_engine, utils::config::AppConfig};
use review_pipeline::ReviewDispatcher;
use tracing::debug;

#[derive(Clone)]
pub struct HtmlState {
    pub templates: Arc<TemplateEngine>,
    pub config: AppConfig,
    pub dispatcher: Arc<ReviewDispatcher>,
}

impl HtmlState {
    pub fn new(
        config: &AppConfig,
        dispatcher: Arc<ReviewDispatcher>,
        template_engine: Option<Arc<TemplateEngine>>,
    ) -> Self {
        let templates =
            template_engine.unwrap_or_else(|| Arc::new(create_template_engine!("templates")));
        debug!("Template engine configured for html_router.");

        Self {
            templates,
            config: config.clone(),
            dispatcher,
        }
    }
}

impl ProvidesTemplateEngine for HtmlState {
    fn template_engine(&self) -> &Arc<TemplateEngine> {
        &self.templates
    }
}
