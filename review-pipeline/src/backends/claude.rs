use async_trait::async_trait;
use common::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    backends::{BackendKind, ReviewBackend},
    prompt::{parse_review, review_prompt},
    review::AiReview,
};

const REVIEW_MODEL: &str = "claude-3-opus-20240229";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_REVIEW_TOKENS: u32 = 500;

pub struct ClaudeBackend {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeContentBlock>,
}

#[derive(Deserialize)]
struct ClaudeContentBlock {
    #[serde(default)]
    text: String,
}

impl ClaudeBackend {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ReviewBackend for ClaudeBackend {
    fn id(&self) -> &'static str {
        "claude"
    }

    fn name(&self) -> String {
        "Anthropic Claude".to_string()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Cloud
    }

    fn description(&self) -> &'static str {
        "Cloud review via the Anthropic messages API"
    }

    fn matches(&self, model: &str) -> bool {
        model.starts_with("claude")
    }

    async fn available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn review(&self, code: &str) -> Result<AiReview, AppError> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            AppError::ModelUnavailable("ANTHROPIC_API_KEY not configured".into())
        })?;

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let body = ClaudeRequest {
            model: REVIEW_MODEL.to_string(),
            max_tokens: MAX_REVIEW_TOKENS,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: review_prompt(code),
            }],
        };

        let response = self
            .client
            .post(url)
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(std::time::Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ModelUnavailable(format!(
                "Anthropic API returned {}",
                response.status()
            )));
        }

        let parsed: ClaudeResponse = response.json().await?;
        let text = parsed
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AppError::LLMParsing("Claude response carried no text".into()))?;

        info!("Claude review completed");
        Ok(parse_review(&text, "Claude 3 Opus"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_without_key() {
        let backend = ClaudeBackend::new(None, "https://example.invalid".into());
        assert!(!backend.available().await);
        assert!(backend.review("x = 1").await.is_err());
    }

    #[test]
    fn matches_claude_family() {
        let backend = ClaudeBackend::new(None, "https://example.invalid".into());
        assert!(backend.matches("claude"));
        assert!(backend.matches("claude-3-opus"));
        assert!(!backend.matches("gemini-pro"));
    }
}
