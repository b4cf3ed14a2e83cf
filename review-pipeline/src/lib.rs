pub mod backends;
pub mod prompt;
pub mod review;

use std::sync::Arc;

use common::{
    models::checkpoint::EmbeddingCheckpoint,
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    backends::{
        claude::ClaudeBackend, embedding::EmbeddingBackend, gemini::GeminiBackend,
        ollama::OllamaBackend, openai::OpenAiBackend, BackendKind, ReviewBackend,
    },
    review::{fallback_review, AiReview},
};

/// Catalogue entry for the model listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BackendKind,
    pub description: String,
    pub available: bool,
}

/// Routes a review request to the backend serving the requested model id.
/// A backend that is missing, unavailable, or failing never surfaces as an
/// error; the caller always gets a review, falling back to the canned one.
pub struct ReviewDispatcher {
    backends: Vec<Arc<dyn ReviewBackend>>,
    default_model: String,
}

impl ReviewDispatcher {
    pub fn from_config(
        config: &AppConfig,
        embedding_provider: Arc<EmbeddingProvider>,
        checkpoint: Option<EmbeddingCheckpoint>,
    ) -> Self {
        let openai_config = async_openai::config::OpenAIConfig::new()
            .with_api_key(config.openai_api_key.clone().unwrap_or_default())
            .with_api_base(config.openai_base_url.clone());
        let openai_client = Arc::new(async_openai::Client::with_config(openai_config));

        let backends: Vec<Arc<dyn ReviewBackend>> = vec![
            Arc::new(GeminiBackend::new(
                config.gemini_api_key.clone(),
                config.gemini_base_url.clone(),
            )),
            Arc::new(OpenAiBackend::new(
                openai_client,
                config.openai_api_key.is_some(),
            )),
            Arc::new(ClaudeBackend::new(
                config.anthropic_api_key.clone(),
                config.anthropic_base_url.clone(),
            )),
            Arc::new(OllamaBackend::new(
                config.ollama_base_url.clone(),
                config.ollama_model.clone(),
            )),
            Arc::new(EmbeddingBackend::new(embedding_provider, checkpoint)),
        ];

        Self {
            backends,
            default_model: config.default_review_model.clone(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    fn backend_for(&self, model: &str) -> Option<&Arc<dyn ReviewBackend>> {
        self.backends.iter().find(|backend| backend.matches(model))
    }

    /// Produces a review for `code` with the requested model, or the
    /// dispatcher's default when none is given.
    pub async fn review(&self, code: &str, model: Option<&str>) -> AiReview {
        let model = model.unwrap_or(&self.default_model);

        let Some(backend) = self.backend_for(model) else {
            debug!(model, "No backend serves the requested model");
            return fallback_review(model);
        };

        match backend.review(code).await {
            Ok(review) => review,
            Err(err) => {
                warn!(model, backend = backend.id(), error = %err, "Review backend failed");
                fallback_review(model)
            }
        }
    }

    /// Lists every backend with its current availability.
    pub async fn list_models(&self) -> Vec<ModelInfo> {
        let mut models = Vec::with_capacity(self.backends.len());
        for backend in &self.backends {
            models.push(ModelInfo {
                id: backend.id().to_string(),
                name: backend.name(),
                kind: backend.kind(),
                description: backend.description().to_string(),
                available: backend.available().await,
            });
        }
        models
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_dispatcher() -> ReviewDispatcher {
        let config = AppConfig {
            embedding_backend: "hashed".to_string(),
            ollama_base_url: "http://127.0.0.1:1".to_string(),
            ..AppConfig::default()
        };
        let provider = Arc::new(EmbeddingProvider::new_hashed(64).expect("hashed provider"));
        ReviewDispatcher::from_config(&config, provider, None)
    }

    #[tokio::test]
    async fn unconfigured_cloud_model_falls_back() {
        let dispatcher = offline_dispatcher();
        let review = dispatcher.review("x = 1", Some("gemini-pro")).await;
        assert_eq!(review.model_used, "gemini-pro (fallback)");
    }

    #[tokio::test]
    async fn unknown_model_falls_back() {
        let dispatcher = offline_dispatcher();
        let review = dispatcher.review("x = 1", Some("mystery-model")).await;
        assert!(review.model_used.ends_with("(fallback)"));
    }

    #[tokio::test]
    async fn embedding_model_reviews_offline() {
        let dispatcher = offline_dispatcher();
        let review = dispatcher
            .review("def f():\n    return 1\n", Some("embedding"))
            .await;
        assert_eq!(review.model_used, "embedding (hashed)");
    }

    #[tokio::test]
    async fn model_catalogue_reports_availability() {
        let dispatcher = offline_dispatcher();
        let models = dispatcher.list_models().await;
        assert_eq!(models.len(), 5);

        let embedding = models
            .iter()
            .find(|m| m.id == "embedding")
            .expect("embedding entry");
        assert!(embedding.available);

        let gemini = models
            .iter()
            .find(|m| m.id == "gemini-pro")
            .expect("gemini entry");
        assert!(!gemini.available);
    }
}
