use std::sync::Arc;

use common::utils::config::AppConfig;
use review_pipeline::ReviewDispatcher;

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub dispatcher: Arc<ReviewDispatcher>,
}

impl ApiState {
    pub fn new(config: &AppConfig, dispatcher: Arc<ReviewDispatcher>) -> Self {
        Self {
            config: config.clone(),
            dispatcher,
        }
    }
}
