pub mod claude;
pub mod embedding;
pub mod gemini;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use common::error::AppError;
use serde::Serialize;

use crate::review::AiReview;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Cloud,
    Local,
    Embedding,
}

/// One review backend. Implementations are cheap to construct and hold no
/// request state; `available` must be quick (credential presence or a
/// short probe) since it feeds the model listing endpoint.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> String;
    fn kind(&self) -> BackendKind;
    fn description(&self) -> &'static str;
    /// Whether this backend serves the requested model id.
    fn matches(&self, model: &str) -> bool;
    async fn available(&self) -> bool;
    async fn review(&self, code: &str) -> Result<AiReview, AppError>;
}
