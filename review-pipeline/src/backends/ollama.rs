use async_trait::async_trait;
use common::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    backends::{BackendKind, ReviewBackend},
    prompt::{parse_review, review_prompt},
    review::AiReview,
};

pub struct OllamaBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: serde_json::Value,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
        }
    }

    /// A quick tags probe tells apart "server down" from "model error".
    async fn probe(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url.trim_end_matches('/'));
        match self
            .client
            .get(url)
            .timeout(std::time::Duration::from_secs(2))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(error = %err, "Ollama probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl ReviewBackend for OllamaBackend {
    fn id(&self) -> &'static str {
        "ollama"
    }

    fn name(&self) -> String {
        format!("Ollama ({})", self.model)
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn description(&self) -> &'static str {
        "Local review via an Ollama server, no API key required"
    }

    fn matches(&self, model: &str) -> bool {
        model == "ollama" || model == "local"
    }

    async fn available(&self) -> bool {
        self.probe().await
    }

    async fn review(&self, code: &str) -> Result<AiReview, AppError> {
        if !self.probe().await {
            return Err(AppError::ModelUnavailable(format!(
                "no Ollama server at {}",
                self.base_url
            )));
        }

        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let body = OllamaRequest {
            model: self.model.clone(),
            prompt: review_prompt(code),
            stream: false,
            options: json!({ "temperature": 0.7 }),
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .timeout(std::time::Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ModelUnavailable(format!(
                "Ollama returned {}",
                response.status()
            )));
        }

        let parsed: OllamaResponse = response.json().await?;
        info!(model = %self.model, "Ollama review completed");
        Ok(parse_review(
            &parsed.response,
            &format!("Ollama ({})", self.model),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_local_aliases() {
        let backend = OllamaBackend::new("http://127.0.0.1:1".into(), "llama2".into());
        assert!(backend.matches("ollama"));
        assert!(backend.matches("local"));
        assert!(!backend.matches("gpt-4"));
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        let backend = OllamaBackend::new("http://127.0.0.1:1".into(), "llama2".into());
        assert!(!backend.available().await);
        assert!(backend.review("x = 1").await.is_err());
    }
}
