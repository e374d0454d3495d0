use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

/// Printed verbatim when `GOOGLE_API_KEY` is absent.
pub const MISSING_API_KEY_MESSAGE: [&str; 2] = [
    "Error: Google API key not found.",
    "Please create a .env file and add the line: GOOGLE_API_KEY='your_key_here'",
];

#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    Gemini,
    Hashed,
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default)]
    pub google_api_key: Option<String>,
    #[serde(default = "default_documents_folder")]
    pub documents_folder: String,
    #[serde(default = "default_index_storage_path")]
    pub index_storage_path: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default)]
    pub embedding_dimensions: Option<u32>,
    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,
    #[serde(default = "default_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_similarity_top_k")]
    pub similarity_top_k: usize,
    #[serde(default = "default_chunk_min_chars")]
    pub chunk_min_chars: usize,
    #[serde(default = "default_chunk_max_chars")]
    pub chunk_max_chars: usize,
    #[serde(default = "default_chunk_overlap_chars")]
    pub chunk_overlap_chars: usize,
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
    #[serde(default = "default_true")]
    pub recursive: bool,
    #[serde(default = "default_true")]
    pub streaming: bool,
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_documents_folder() -> String {
    "transcripts".to_string()
}

fn default_index_storage_path() -> String {
    "./storage_gemini".to_string()
}

fn default_model_name() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_embedding_model() -> String {
    "gemini-embedding-001".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

const fn default_similarity_top_k() -> usize {
    2
}

const fn default_chunk_min_chars() -> usize {
    1000
}

const fn default_chunk_max_chars() -> usize {
    4000
}

const fn default_chunk_overlap_chars() -> usize {
    200
}

const fn default_embed_batch_size() -> usize {
    100
}

const fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            documents_folder: default_documents_folder(),
            index_storage_path: default_index_storage_path(),
            model_name: default_model_name(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: None,
            embedding_backend: EmbeddingBackend::default(),
            gemini_base_url: default_base_url(),
            similarity_top_k: default_similarity_top_k(),
            chunk_min_chars: default_chunk_min_chars(),
            chunk_max_chars: default_chunk_max_chars(),
            chunk_overlap_chars: default_chunk_overlap_chars(),
            embed_batch_size: default_embed_batch_size(),
            recursive: true,
            streaming: true,
            show_progress: true,
        }
    }
}

impl AppConfig {
    /// Returns the configured API key, treating blank values as absent.
    pub fn api_key(&self) -> Result<&str, AppError> {
        self.google_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AppError::MissingApiKey)
    }
}

/// Loads `.env` into the process environment, then layers an optional
/// `config.{toml,yaml,json}` file and the environment itself.
pub fn get_config() -> Result<AppConfig, ConfigError> {
    dotenv::dotenv().ok();
    build_config(Environment::default())
}

pub fn build_config(environment: Environment) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(environment)
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        build_config(Environment::default().source(Some(map)))
    }

    #[test]
    fn defaults_match_the_documented_layout() {
        let config = config_from(&[("GOOGLE_API_KEY", "secret")]).expect("config");

        assert_eq!(config.documents_folder, "transcripts");
        assert_eq!(config.index_storage_path, "./storage_gemini");
        assert_eq!(config.model_name, "gemini-2.5-pro");
        assert_eq!(config.similarity_top_k, 2);
        assert_eq!(config.embedding_backend, EmbeddingBackend::Gemini);
        assert!(config.streaming);
        assert_eq!(config.api_key().expect("key"), "secret");
    }

    #[test]
    fn missing_api_key_is_reported() {
        let config = config_from(&[]).expect("config");
        assert!(matches!(config.api_key(), Err(AppError::MissingApiKey)));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = config_from(&[("GOOGLE_API_KEY", "   ")]).expect("config");
        assert!(matches!(config.api_key(), Err(AppError::MissingApiKey)));
    }

    #[test]
    fn environment_overrides_are_parsed() {
        let config = config_from(&[
            ("GOOGLE_API_KEY", "secret"),
            ("SIMILARITY_TOP_K", "5"),
            ("EMBEDDING_BACKEND", "hashed"),
            ("STREAMING", "false"),
            ("DOCUMENTS_FOLDER", "notes"),
        ])
        .expect("config");

        assert_eq!(config.similarity_top_k, 5);
        assert_eq!(config.embedding_backend, EmbeddingBackend::Hashed);
        assert!(!config.streaming);
        assert_eq!(config.documents_folder, "notes");
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let result = config_from(&[("SIMILARITY_TOP_K", "many")]);
        assert!(result.is_err());
    }
}
