use async_trait::async_trait;
use common::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    backends::{BackendKind, ReviewBackend},
    prompt::{parse_review, review_prompt},
    review::AiReview,
};

/// Gemini models tried in order; the first one that answers wins.
const CANDIDATE_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-2.0-flash",
    "gemini-pro",
];

pub struct GeminiBackend {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiBackend {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn generate(&self, model: &str, key: &str, prompt: &str) -> Result<String, AppError> {
        let url = format!(
            "{}/v1beta/models/{model}:generateContent?key={key}",
            self.base_url.trim_end_matches('/')
        );
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(std::time::Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ModelUnavailable(format!(
                "Gemini model {model} returned {}",
                response.status()
            )));
        }

        let parsed: GeminiResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| AppError::LLMParsing("Gemini response carried no text".into()))
    }
}

#[async_trait]
impl ReviewBackend for GeminiBackend {
    fn id(&self) -> &'static str {
        "gemini-pro"
    }

    fn name(&self) -> String {
        "Google Gemini".to_string()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Cloud
    }

    fn description(&self) -> &'static str {
        "Cloud review via the Gemini generative language API"
    }

    fn matches(&self, model: &str) -> bool {
        model.starts_with("gemini")
    }

    async fn available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn review(&self, code: &str) -> Result<AiReview, AppError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ModelUnavailable("GEMINI_API_KEY not configured".into()))?;

        let prompt = review_prompt(code);
        for model in CANDIDATE_MODELS {
            match self.generate(model, key, &prompt).await {
                Ok(text) => {
                    info!(model, "Gemini review completed");
                    return Ok(parse_review(&text, &format!("Gemini ({model})")));
                }
                Err(err) => {
                    debug!(model, error = %err, "Gemini model attempt failed");
                }
            }
        }

        warn!("No Gemini candidate model responded");
        Err(AppError::ModelUnavailable(
            "no Gemini model responded".into(),
        ))
    }
}
