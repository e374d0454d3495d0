use async_openai::{config::OpenAIConfig, Client};

use super::config::AppConfig;

/// Builds a client for Gemini's OpenAI-compatible endpoint. The same client
/// serves both chat completions and embeddings.
pub fn gemini_client(config: &AppConfig, api_key: &str) -> Client<OpenAIConfig> {
    Client::with_config(
        OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(config.gemini_base_url.trim_end_matches('/')),
    )
}
