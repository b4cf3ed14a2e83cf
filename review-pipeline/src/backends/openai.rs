use std::sync::Arc;

use async_openai::types::{ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs};
use async_trait::async_trait;
use common::error::AppError;
use tracing::info;

use crate::{
    backends::{BackendKind, ReviewBackend},
    prompt::{parse_review, review_prompt},
    review::AiReview,
};

pub type OpenAIClientType = async_openai::Client<async_openai::config::OpenAIConfig>;

const REVIEW_MODEL: &str = "gpt-4";
const MAX_REVIEW_TOKENS: u32 = 500;

pub struct OpenAiBackend {
    client: Arc<OpenAIClientType>,
    has_key: bool,
}

impl OpenAiBackend {
    pub fn new(client: Arc<OpenAIClientType>, has_key: bool) -> Self {
        Self { client, has_key }
    }
}

#[async_trait]
impl ReviewBackend for OpenAiBackend {
    fn id(&self) -> &'static str {
        "gpt-4"
    }

    fn name(&self) -> String {
        "OpenAI GPT-4".to_string()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Cloud
    }

    fn description(&self) -> &'static str {
        "Cloud review via an OpenAI-compatible chat completion API"
    }

    fn matches(&self, model: &str) -> bool {
        model.starts_with("gpt")
    }

    async fn available(&self) -> bool {
        self.has_key
    }

    async fn review(&self, code: &str) -> Result<AiReview, AppError> {
        if !self.has_key {
            return Err(AppError::ModelUnavailable(
                "OPENAI_API_KEY not configured".into(),
            ));
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(REVIEW_MODEL)
            .messages([ChatCompletionRequestUserMessage::from(review_prompt(code)).into()])
            .temperature(0.7)
            .max_tokens(MAX_REVIEW_TOKENS)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
            .ok_or(AppError::LLMParsing(
                "No content found in chat completion response".into(),
            ))?;

        info!("OpenAI review completed");
        Ok(parse_review(content, "GPT-4"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_without_key() {
        let client = Arc::new(OpenAIClientType::new());
        let backend = OpenAiBackend::new(client, false);
        assert!(!backend.available().await);
        assert!(backend.review("x = 1").await.is_err());
    }

    #[test]
    fn matches_gpt_family() {
        let backend = OpenAiBackend::new(Arc::new(OpenAIClientType::new()), false);
        assert!(backend.matches("gpt-4"));
        assert!(backend.matches("gpt-4o"));
        assert!(!backend.matches("claude"));
    }
}
