use std::sync::Arc;

use async_trait::async_trait;
use common::{
    error::AppError,
    models::checkpoint::EmbeddingCheckpoint,
    utils::embedding::EmbeddingProvider,
};
use tracing::info;

use crate::{
    backends::{BackendKind, ReviewBackend},
    review::AiReview,
};

/// Offline reviewer built on the local embedding model. It never calls
/// out to a remote API, so it is the one backend that is always
/// available.
pub struct EmbeddingBackend {
    provider: Arc<EmbeddingProvider>,
    checkpoint: Option<EmbeddingCheckpoint>,
}

impl EmbeddingBackend {
    pub fn new(provider: Arc<EmbeddingProvider>, checkpoint: Option<EmbeddingCheckpoint>) -> Self {
        Self {
            provider,
            checkpoint,
        }
    }

    fn model_label(&self) -> String {
        match self.provider.model_code() {
            Some(code) => format!("embedding ({code})"),
            None => "embedding (hashed)".to_string(),
        }
    }
}

/// Spread of the embedding vector, scaled into a 0..=10 band. Dense,
/// varied code activates more of the vector than trivial snippets do.
fn complexity_score(vector: &[f32]) -> f32 {
    if vector.is_empty() {
        return 0.0;
    }
    let mean = vector.iter().sum::<f32>() / vector.len() as f32;
    let variance =
        vector.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / vector.len() as f32;
    (variance * vector.len() as f32 * 10.0).min(10.0)
}

#[async_trait]
impl ReviewBackend for EmbeddingBackend {
    fn id(&self) -> &'static str {
        "embedding"
    }

    fn name(&self) -> String {
        match self.provider.model_code() {
            Some(code) => format!("Embedding classifier ({code})"),
            None => "Embedding classifier (hashed)".to_string(),
        }
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Embedding
    }

    fn description(&self) -> &'static str {
        "Offline structural review from code embeddings and trained label centroids"
    }

    fn matches(&self, model: &str) -> bool {
        model == "embedding" || model == "codebert" || model.starts_with("custom-")
    }

    async fn available(&self) -> bool {
        true
    }

    async fn review(&self, code: &str) -> Result<AiReview, AppError> {
        let vector = self.provider.embed(code).await?;
        let score = complexity_score(&vector);

        let (band, summary) = if score > 7.0 {
            (
                "high",
                "The embedding signature indicates dense, highly varied code.",
            )
        } else if score > 4.0 {
            (
                "moderate",
                "The embedding signature indicates moderately structured code.",
            )
        } else {
            (
                "low",
                "The embedding signature indicates simple, regular code.",
            )
        };

        let mut suggestions = vec![
            format!("Structural complexity from the embedding profile is {band}"),
            "Use a cloud or local language model for a semantic review".to_string(),
        ];
        let mut issues = Vec::new();

        if let Some(checkpoint) = &self.checkpoint {
            if let Some((label, similarity)) = checkpoint.classify(&vector) {
                suggestions.push(format!(
                    "Closest training cohort is label {label} (similarity {similarity:.2})"
                ));
            } else {
                issues.push(
                    "Trained checkpoint does not match the current embedding dimension".to_string(),
                );
            }
        } else {
            suggestions
                .push("Train a checkpoint with `granska-eval train` for cohort matching".to_string());
        }

        info!(score, band, "Embedding review completed");
        Ok(AiReview {
            summary: summary.to_string(),
            suggestions,
            issues,
            quality_rating: format!("{:.1}/10 (structural)", 10.0 - score),
            recommendation:
                "Embedding analysis covers structure only; pair it with an AI review for semantics"
                    .to_string(),
            model_used: self.model_label(),
        })
    }
}
