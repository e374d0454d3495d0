use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
};

use anyhow::{anyhow, Result};
use async_openai::{config::OpenAIConfig, types::CreateEmbeddingRequestArgs, Client};
use tracing::debug;

use super::config::{AppConfig, EmbeddingBackend};

/// Vector width used by the offline hashed backend.
pub const HASHED_DIMENSION: usize = 384;

#[derive(Clone)]
pub struct EmbeddingProvider {
    inner: EmbeddingInner,
}

#[derive(Clone)]
enum EmbeddingInner {
    Gemini {
        client: Arc<Client<OpenAIConfig>>,
        model: String,
        dimensions: Option<u32>,
    },
    Hashed {
        dimension: usize,
    },
}

impl EmbeddingProvider {
    pub fn from_config(config: &AppConfig, client: Arc<Client<OpenAIConfig>>) -> Result<Self> {
        match config.embedding_backend {
            EmbeddingBackend::Gemini => Ok(Self::new_gemini(
                client,
                config.embedding_model.clone(),
                config.embedding_dimensions,
            )),
            EmbeddingBackend::Hashed => Self::new_hashed(HASHED_DIMENSION),
        }
    }

    pub fn backend_label(&self) -> &'static str {
        match self.inner {
            EmbeddingInner::Hashed { .. } => "hashed",
            EmbeddingInner::Gemini { .. } => "gemini",
        }
    }

    /// Known output width, if the backend fixes one up front.
    pub fn dimension(&self) -> Option<usize> {
        match &self.inner {
            EmbeddingInner::Hashed { dimension } => Some(*dimension),
            EmbeddingInner::Gemini { dimensions, .. } => dimensions.map(|d| d as usize),
        }
    }

    /// Label recorded alongside a persisted index.
    pub fn model_code(&self) -> String {
        match &self.inner {
            EmbeddingInner::Gemini { model, .. } => model.clone(),
            EmbeddingInner::Hashed { dimension } => format!("hashed-{dimension}"),
        }
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match &self.inner {
            EmbeddingInner::Hashed { dimension } => Ok(hashed_embedding(text, *dimension)),
            EmbeddingInner::Gemini {
                client,
                model,
                dimensions,
            } => {
                let mut args = CreateEmbeddingRequestArgs::default();
                args.model(model.clone()).input([text]);
                if let Some(dimensions) = dimensions {
                    args.dimensions(*dimensions);
                }
                let request = args.build()?;

                let response = client.embeddings().create(request).await?;

                let embedding = response
                    .data
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow!("No embedding data received from Gemini API"))?
                    .embedding;

                Ok(embedding)
            }
        }
    }

    pub async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        match &self.inner {
            EmbeddingInner::Hashed { dimension } => Ok(texts
                .into_iter()
                .map(|text| hashed_embedding(&text, *dimension))
                .collect()),
            EmbeddingInner::Gemini {
                client,
                model,
                dimensions,
            } => {
                if texts.is_empty() {
                    return Ok(Vec::new());
                }
                let expected = texts.len();

                let mut args = CreateEmbeddingRequestArgs::default();
                args.model(model.clone()).input(texts);
                if let Some(dimensions) = dimensions {
                    args.dimensions(*dimensions);
                }
                let request = args.build()?;

                let response = client.embeddings().create(request).await?;

                let mut data = response.data;
                data.sort_by_key(|item| item.index);
                let embeddings: Vec<Vec<f32>> =
                    data.into_iter().map(|item| item.embedding).collect();

                if embeddings.len() != expected {
                    return Err(anyhow!(
                        "Gemini returned {} embeddings for {expected} inputs",
                        embeddings.len()
                    ));
                }

                debug!(
                    count = embeddings.len(),
                    dimension = embeddings.first().map_or(0, Vec::len),
                    "Embedding batch created"
                );

                Ok(embeddings)
            }
        }
    }

    pub fn new_gemini(
        client: Arc<Client<OpenAIConfig>>,
        model: String,
        dimensions: Option<u32>,
    ) -> Self {
        EmbeddingProvider {
            inner: EmbeddingInner::Gemini {
                client,
                model,
                dimensions,
            },
        }
    }

    pub fn new_hashed(dimension: usize) -> Result<Self> {
        Ok(EmbeddingProvider {
            inner: EmbeddingInner::Hashed {
                dimension: dimension.max(1),
            },
        })
    }
}

// Helper functions for hashed embeddings
fn hashed_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let dim = dimension.max(1);
    let mut vector = vec![0.0f32; dim];
    if text.is_empty() {
        return vector;
    }

    let mut token_count = 0f32;
    for token in tokens(text) {
        token_count += 1.0;
        let idx = bucket(&token, dim);
        if let Some(slot) = vector.get_mut(idx) {
            *slot += 1.0;
        }
    }

    if token_count == 0.0 {
        return vector;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }

    vector
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn bucket(token: &str, dimension: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    (hasher.finish() as usize) % dimension
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashed_embeddings_are_normalized_and_deterministic() {
        let provider = EmbeddingProvider::new_hashed(64).expect("provider");

        let first = provider.embed("Quarterly revenue grew").await.expect("embed");
        let second = provider.embed("quarterly REVENUE grew").await.expect("embed");

        assert_eq!(first.len(), 64);
        assert_eq!(first, second);
        let norm = first.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn hashed_batch_preserves_order() {
        let provider = EmbeddingProvider::new_hashed(32).expect("provider");
        let texts = vec!["alpha".to_string(), "beta".to_string()];

        let batch = provider.embed_batch(texts).await.expect("batch");

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], provider.embed("alpha").await.expect("embed"));
        assert_eq!(batch[1], provider.embed("beta").await.expect("embed"));
    }

    #[test]
    fn empty_text_yields_zero_vector() {
        let vector = hashed_embedding("", 8);
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn backend_follows_config() {
        let config = AppConfig {
            embedding_backend: EmbeddingBackend::Hashed,
            ..Default::default()
        };
        let client = Arc::new(Client::with_config(OpenAIConfig::new()));
        let provider = EmbeddingProvider::from_config(&config, client).expect("provider");

        assert_eq!(provider.backend_label(), "hashed");
        assert_eq!(provider.dimension(), Some(HASHED_DIMENSION));
        assert_eq!(provider.model_code(), format!("hashed-{HASHED_DIMENSION}"));
    }
}
