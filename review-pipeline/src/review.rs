use serde::{Deserialize, Serialize};

/// Structured review produced by any backend. The fallback variant is
/// returned whenever no backend can serve the request; an AI review is
/// never an error at the API surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiReview {
    pub summary: String,
    pub suggestions: Vec<String>,
    pub issues: Vec<String>,
    pub quality_rating: String,
    pub recommendation: String,
    pub model_used: String,
}

/// Canned review used when the requested backend is missing credentials,
/// unreachable, or errors out.
pub fn fallback_review(model: &str) -> AiReview {
    AiReview {
        summary: "AI review unavailable. Configure an API key to get a model-generated review."
            .to_string(),
        suggestions: vec![
            "Set GRANSKA_GEMINI_API_KEY, GRANSKA_OPENAI_API_KEY, or GRANSKA_ANTHROPIC_API_KEY"
                .to_string(),
            "Add docstrings to functions and classes".to_string(),
            "Implement robust error handling and input validation".to_string(),
            "Consider adding type hints for clarity".to_string(),
            "Break complex functions into smaller, focused units".to_string(),
        ],
        issues: vec!["API not configured".to_string()],
        quality_rating: "unable to rate".to_string(),
        recommendation: "Configure an API key or start a local Ollama server to enable AI review"
            .to_string(),
        model_used: format!("{model} (fallback)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_names_the_requested_model() {
        let review = fallback_review("gemini-pro");
        assert_eq!(review.model_used, "gemini-pro (fallback)");
        assert_eq!(review.issues, vec!["API not configured".to_string()]);
        assert!(!review.suggestions.is_empty());
    }
}
