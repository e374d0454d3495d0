pub mod answer_retrieval;
pub mod llm;
pub mod query_engine;
pub mod scoring;

use common::{
    error::AppError,
    storage::{index::VectorIndex, types::text_chunk::TextChunk},
    utils::embedding::EmbeddingProvider,
};
use tracing::instrument;

pub use llm::{GeminiChatModel, LanguageModel, ResponseStream};
pub use query_engine::{QueryEngine, RagQueryEngine};

use scoring::{cosine_similarity, top_k, Scored};

// Captures a supporting chunk plus its similarity score for downstream prompts.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: TextChunk,
    pub score: f32,
}

/// Embeds the question and returns the `similarity_top_k` closest chunks.
#[instrument(skip(index, embedding_provider, input_text))]
pub async fn retrieve_chunks(
    index: &VectorIndex,
    embedding_provider: &EmbeddingProvider,
    input_text: &str,
    similarity_top_k: usize,
) -> Result<Vec<RetrievedChunk>, AppError> {
    if index.is_empty() || similarity_top_k == 0 {
        return Ok(Vec::new());
    }

    let query_embedding = embedding_provider.embed(input_text).await?;
    if query_embedding.len() != index.dimension() {
        return Err(AppError::Validation(format!(
            "query embedding has {} dimensions but the index was built with {}",
            query_embedding.len(),
            index.dimension()
        )));
    }

    let scored: Vec<Scored<TextChunk>> = index
        .entries()
        .iter()
        .map(|entry| {
            Scored::new(
                entry.chunk.clone(),
                cosine_similarity(&query_embedding, &entry.embedding),
            )
        })
        .collect();

    Ok(top_k(scored, similarity_top_k)
        .into_iter()
        .map(|scored| RetrievedChunk {
            chunk: scored.item,
            score: scored.score,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::storage::{index::EmbeddedChunk, types::Metadata};

    fn entry(text: &str, embedding: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            chunk: TextChunk::new("doc".into(), text.into(), Metadata::new()),
            embedding,
        }
    }

    #[tokio::test]
    async fn returns_closest_chunks_first() {
        let provider = EmbeddingProvider::new_hashed(128).expect("provider");
        let texts = ["budget forecast for next quarter", "team offsite logistics"];
        let mut entries = Vec::new();
        for text in texts {
            entries.push(entry(text, provider.embed(text).await.expect("embed")));
        }
        let index = VectorIndex::new(entries, provider.model_code()).expect("index");

        let retrieved = retrieve_chunks(&index, &provider, "quarter budget forecast", 2)
            .await
            .expect("retrieve");

        assert_eq!(retrieved.len(), 2);
        assert_eq!(retrieved[0].chunk.text, "budget forecast for next quarter");
        assert!(retrieved[0].score > retrieved[1].score);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let provider = EmbeddingProvider::new_hashed(8).expect("provider");
        let index = VectorIndex::new(vec![entry("a", vec![1.0, 0.0])], "other".into())
            .expect("index");

        let result = retrieve_chunks(&index, &provider, "a", 2).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
