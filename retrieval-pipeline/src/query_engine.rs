use std::sync::Arc;

use async_trait::async_trait;
use common::{
    error::AppError,
    storage::index::VectorIndex,
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};
use futures::{stream, StreamExt};
use tracing::debug;

use crate::{
    answer_retrieval::{create_qa_prompt, format_context},
    llm::{LanguageModel, ResponseStream},
    retrieve_chunks,
};

/// Answers one question at a time; no state is carried between calls.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn query(&self, question: &str) -> Result<ResponseStream, AppError>;
}

pub struct RagQueryEngine {
    index: Arc<VectorIndex>,
    embedding_provider: Arc<EmbeddingProvider>,
    llm: Arc<dyn LanguageModel>,
    similarity_top_k: usize,
    streaming: bool,
}

impl RagQueryEngine {
    pub fn new(
        index: Arc<VectorIndex>,
        embedding_provider: Arc<EmbeddingProvider>,
        llm: Arc<dyn LanguageModel>,
        similarity_top_k: usize,
        streaming: bool,
    ) -> Self {
        Self {
            index,
            embedding_provider,
            llm,
            similarity_top_k,
            streaming,
        }
    }

    pub fn from_config(
        index: Arc<VectorIndex>,
        embedding_provider: Arc<EmbeddingProvider>,
        llm: Arc<dyn LanguageModel>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            index,
            embedding_provider,
            llm,
            config.similarity_top_k,
            config.streaming,
        )
    }
}

#[async_trait]
impl QueryEngine for RagQueryEngine {
    async fn query(&self, question: &str) -> Result<ResponseStream, AppError> {
        let retrieved = retrieve_chunks(
            &self.index,
            &self.embedding_provider,
            question,
            self.similarity_top_k,
        )
        .await?;

        let prompt = create_qa_prompt(&format_context(&retrieved), question);
        debug!(
            retrieved = retrieved.len(),
            prompt_chars = prompt.len(),
            streaming = self.streaming,
            "Submitting question"
        );

        if self.streaming {
            self.llm.stream(prompt).await
        } else {
            let answer = self.llm.complete(prompt).await?;
            Ok(stream::once(async move { Ok(answer) }).boxed())
        }
    }
}
