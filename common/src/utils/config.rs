use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_anthropic_base_url")]
    pub anthropic_base_url: String,
    #[serde(default = "default_ollama_base_url")]
    pub ollama_base_url: String,
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,
    #[serde(default = "default_review_model")]
    pub default_review_model: String,
    #[serde(default = "default_embedding_backend")]
    pub embedding_backend: String,
    pub embedding_model: Option<String>,
    /// Path to the trained embedding checkpoint. Defaults to
    /// `<data_dir>/models/checkpoint.json` when unset.
    pub checkpoint_path: Option<String>,
    #[serde(default = "default_max_code_bytes")]
    pub max_code_bytes: usize,
}

fn default_http_port() -> u16 {
    3000
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama2".to_string()
}

fn default_review_model() -> String {
    "gemini-pro".to_string()
}

fn default_embedding_backend() -> String {
    "fastembed".to_string()
}

fn default_max_code_bytes() -> usize {
    200_000
}

impl AppConfig {
    pub fn checkpoint_path(&self) -> String {
        self.checkpoint_path
            .clone()
            .unwrap_or_else(|| format!("{}/models/checkpoint.json", self.data_dir))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            data_dir: default_data_dir(),
            gemini_api_key: None,
            openai_api_key: None,
            anthropic_api_key: None,
            openai_base_url: default_openai_base_url(),
            gemini_base_url: default_gemini_base_url(),
            anthropic_base_url: default_anthropic_base_url(),
            ollama_base_url: default_ollama_base_url(),
            ollama_model: default_ollama_model(),
            default_review_model: default_review_model(),
            embedding_backend: default_embedding_backend(),
            embedding_model: None,
            checkpoint_path: None,
            max_code_bytes: default_max_code_bytes(),
        }
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::with_prefix("GRANSKA"))
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.default_review_model, "gemini-pro");
        assert_eq!(config.checkpoint_path(), "./data/models/checkpoint.json");
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn checkpoint_path_override_wins() {
        let config = AppConfig {
            checkpoint_path: Some("/tmp/ckpt.json".into()),
            ..Default::default()
        };
        assert_eq!(config.checkpoint_path(), "/tmp/ckpt.json");
    }
}
