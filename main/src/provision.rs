use std::{path::Path, sync::Arc};

use common::{
    error::AppError,
    storage::{index::VectorIndex, store::StorageManager},
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};
use ingestion_pipeline::{DirectoryReader, IndexBuilder, IngestionConfig};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Built,
    Loaded,
}

pub struct ProvisionedIndex {
    pub index: VectorIndex,
    pub outcome: ProvisionOutcome,
}

/// Loads the persisted index when the storage directory exists, otherwise
/// builds one from the documents folder and persists it.
#[instrument(skip_all, fields(storage = %config.index_storage_path))]
pub async fn provision_index(
    config: &AppConfig,
    embedding_provider: Arc<EmbeddingProvider>,
) -> Result<ProvisionedIndex, AppError> {
    let storage_path = Path::new(&config.index_storage_path);

    if tokio::fs::try_exists(storage_path).await? {
        println!(
            "\nLoading existing index from '{}'...",
            config.index_storage_path
        );
        let storage = StorageManager::local(storage_path).await?;
        let index = VectorIndex::load(&storage).await?;

        let configured_model = embedding_provider.model_code();
        if index.metadata().embedding_model != configured_model {
            warn!(
                stored = %index.metadata().embedding_model,
                configured = %configured_model,
                "Persisted index was embedded with a different model"
            );
        }

        println!("Index loaded successfully!");
        info!(nodes = index.len(), "Index loaded");
        return Ok(ProvisionedIndex {
            index,
            outcome: ProvisionOutcome::Loaded,
        });
    }

    println!(
        "Index not found at '{}'. Creating new index...",
        config.index_storage_path
    );
    println!("This process may take a while depending on your internet connection.");

    let documents = DirectoryReader::new(&config.documents_folder)
        .recursive(config.recursive)
        .load_data()
        .await?;
    info!(documents = documents.len(), "Documents loaded");

    let builder =
        IndexBuilder::new_with_config(embedding_provider, IngestionConfig::from_app_config(config));
    let index = builder.build(documents).await?;

    let storage = StorageManager::local(storage_path).await?;
    index.persist(&storage).await?;

    println!("Index created and saved successfully!");
    info!(nodes = index.len(), "Index built and persisted");
    Ok(ProvisionedIndex {
        index,
        outcome: ProvisionOutcome::Built,
    })
}
