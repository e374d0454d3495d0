mod chunking;
mod config;

pub use chunking::{chunk_document, prepare_chunks};
pub use config::{ChunkSettings, IngestionConfig};

use std::{sync::Arc, time::Instant};

use common::{
    error::AppError,
    storage::{
        index::{EmbeddedChunk, VectorIndex},
        types::{document::Document, text_chunk::TextChunk},
    },
    utils::embedding::EmbeddingProvider,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, instrument};

/// Turns documents into a persisted-ready [`VectorIndex`].
pub struct IndexBuilder {
    embedding_provider: Arc<EmbeddingProvider>,
    pipeline_config: IngestionConfig,
}

impl IndexBuilder {
    pub fn new(embedding_provider: Arc<EmbeddingProvider>) -> Self {
        Self::new_with_config(embedding_provider, IngestionConfig::default())
    }

    pub fn new_with_config(
        embedding_provider: Arc<EmbeddingProvider>,
        pipeline_config: IngestionConfig,
    ) -> Self {
        Self {
            embedding_provider,
            pipeline_config,
        }
    }

    #[instrument(skip_all, fields(documents = documents.len()))]
    pub async fn build(&self, documents: Vec<Document>) -> Result<VectorIndex, AppError> {
        let started = Instant::now();

        let mut chunks: Vec<TextChunk> = Vec::new();
        for document in &documents {
            let document_chunks = chunk_document(document, self.pipeline_config.chunking)?;
            debug!(
                document = document.file_path().unwrap_or(&document.id),
                chunks = document_chunks.len(),
                "Chunked document"
            );
            chunks.extend(document_chunks);
        }
        drop(documents);

        if chunks.is_empty() {
            return Err(AppError::Validation(
                "documents contained no text to index".into(),
            ));
        }

        let entries = self.embed_chunks(chunks).await?;
        let index = VectorIndex::new(entries, self.embedding_provider.model_code())?;

        info!(
            nodes = index.len(),
            dimension = index.dimension(),
            elapsed_ms = started.elapsed().as_millis(),
            "Built vector index"
        );
        Ok(index)
    }

    async fn embed_chunks(&self, chunks: Vec<TextChunk>) -> Result<Vec<EmbeddedChunk>, AppError> {
        let progress = self.progress_bar(chunks.len());
        let batch_size = self.pipeline_config.embed_batch_size.max(1);
        let mut entries = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(batch_size) {
            let texts = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let embeddings = self.embedding_provider.embed_batch(texts).await?;

            if embeddings.len() != batch.len() {
                return Err(AppError::Processing(format!(
                    "expected {} embeddings, received {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            entries.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(embeddings)
                    .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding }),
            );
            progress.inc(batch.len() as u64);
        }

        progress.finish_and_clear();
        Ok(entries)
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.pipeline_config.show_progress {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        ProgressBar::new(total as u64)
            .with_style(style)
            .with_message("Generating embeddings")
    }
}
