use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::{store::StorageManager, types::text_chunk::TextChunk};
use crate::error::AppError;

pub const DOCSTORE_FILE: &str = "docstore.json";
pub const VECTOR_STORE_FILE: &str = "default__vector_store.json";
pub const INDEX_STORE_FILE: &str = "index_store.json";

/// A chunk together with its embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedChunk {
    pub chunk: TextChunk,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub index_id: String,
    pub embedding_model: String,
    pub dimension: usize,
    pub node_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct DocStoreData {
    nodes: BTreeMap<String, TextChunk>,
}

#[derive(Serialize, Deserialize)]
struct VectorStoreData {
    embedding_dict: BTreeMap<String, Vec<f32>>,
    text_id_to_ref_doc_id: BTreeMap<String, String>,
}

/// Flat vector index: every node is scored at query time.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    metadata: IndexMetadata,
    entries: Vec<EmbeddedChunk>,
}

impl VectorIndex {
    pub fn new(entries: Vec<EmbeddedChunk>, embedding_model: String) -> Result<Self, AppError> {
        let dimension = entries.first().map_or(0, |entry| entry.embedding.len());
        validate_entries(&entries, dimension)?;

        Ok(Self {
            metadata: IndexMetadata {
                index_id: Uuid::new_v4().to_string(),
                embedding_model,
                dimension,
                node_count: entries.len(),
                created_at: Utc::now(),
            },
            entries,
        })
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    pub fn dimension(&self) -> usize {
        self.metadata.dimension
    }

    pub fn entries(&self) -> &[EmbeddedChunk] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the docstore, vector store and index metadata files.
    pub async fn persist(&self, storage: &StorageManager) -> Result<(), AppError> {
        let mut nodes = BTreeMap::new();
        let mut embedding_dict = BTreeMap::new();
        let mut text_id_to_ref_doc_id = BTreeMap::new();

        for entry in &self.entries {
            let id = entry.chunk.id.clone();
            text_id_to_ref_doc_id.insert(id.clone(), entry.chunk.doc_id.clone());
            embedding_dict.insert(id.clone(), entry.embedding.clone());
            nodes.insert(id, entry.chunk.clone());
        }

        put_json(storage, DOCSTORE_FILE, &DocStoreData { nodes }).await?;
        put_json(
            storage,
            VECTOR_STORE_FILE,
            &VectorStoreData {
                embedding_dict,
                text_id_to_ref_doc_id,
            },
        )
        .await?;
        // Written last so its presence marks a complete index.
        put_json(storage, INDEX_STORE_FILE, &self.metadata).await?;

        info!(
            index_id = %self.metadata.index_id,
            nodes = self.entries.len(),
            "Persisted vector index"
        );
        Ok(())
    }

    pub async fn load(storage: &StorageManager) -> Result<Self, AppError> {
        if !storage.exists(INDEX_STORE_FILE).await? {
            return Err(AppError::NotFound(format!(
                "{INDEX_STORE_FILE} is missing; the index is absent or was not fully written"
            )));
        }

        let metadata: IndexMetadata = get_json(storage, INDEX_STORE_FILE).await?;
        let docstore: DocStoreData = get_json(storage, DOCSTORE_FILE).await?;
        let mut vectors: VectorStoreData = get_json(storage, VECTOR_STORE_FILE).await?;

        if docstore.nodes.len() != vectors.embedding_dict.len() {
            return Err(AppError::Validation(format!(
                "index is inconsistent: {} nodes but {} embeddings",
                docstore.nodes.len(),
                vectors.embedding_dict.len()
            )));
        }

        let mut entries = Vec::with_capacity(docstore.nodes.len());
        for (id, chunk) in docstore.nodes {
            let embedding = vectors.embedding_dict.remove(&id).ok_or_else(|| {
                AppError::Validation(format!("index is missing the embedding for node {id}"))
            })?;
            entries.push(EmbeddedChunk { chunk, embedding });
        }

        validate_entries(&entries, metadata.dimension)?;
        debug!(
            refs = vectors.text_id_to_ref_doc_id.len(),
            "Loaded vector store"
        );

        Ok(Self {
            metadata: IndexMetadata {
                node_count: entries.len(),
                ..metadata
            },
            entries,
        })
    }
}

fn validate_entries(entries: &[EmbeddedChunk], dimension: usize) -> Result<(), AppError> {
    if let Some(entry) = entries
        .iter()
        .find(|entry| entry.embedding.len() != dimension)
    {
        return Err(AppError::Validation(format!(
            "embedding for node {} has {} dimensions, expected {dimension}",
            entry.chunk.id,
            entry.embedding.len()
        )));
    }
    Ok(())
}

async fn put_json<T: Serialize>(
    storage: &StorageManager,
    location: &str,
    value: &T,
) -> Result<(), AppError> {
    let body = serde_json::to_vec(value)?;
    storage.put(location, Bytes::from(body)).await?;
    Ok(())
}

async fn get_json<T: DeserializeOwned>(
    storage: &StorageManager,
    location: &str,
) -> Result<T, AppError> {
    let raw = storage.get(location).await?;
    Ok(serde_json::from_slice(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::Metadata;

    fn entry(doc_id: &str, text: &str, embedding: Vec<f32>) -> EmbeddedChunk {
        let mut metadata = Metadata::new();
        metadata.insert("file_path".into(), format!("transcripts/{doc_id}.txt"));
        EmbeddedChunk {
            chunk: TextChunk::new(doc_id.into(), text.into(), metadata),
            embedding,
        }
    }

    #[tokio::test]
    async fn persisted_index_loads_back_identically() {
        let storage = StorageManager::memory();
        let index = VectorIndex::new(
            vec![
                entry("a", "first chunk", vec![1.0, 0.0]),
                entry("b", "second chunk", vec![0.0, 1.0]),
            ],
            "hashed-2".into(),
        )
        .expect("index");

        index.persist(&storage).await.expect("persist");
        let loaded = VectorIndex::load(&storage).await.expect("load");

        assert_eq!(loaded.metadata(), index.metadata());
        assert_eq!(loaded.len(), 2);
        for original in index.entries() {
            let found = loaded
                .entries()
                .iter()
                .find(|candidate| candidate.chunk.id == original.chunk.id)
                .expect("node present");
            assert_eq!(found, original);
        }
    }

    #[test]
    fn mixed_dimensions_are_rejected() {
        let result = VectorIndex::new(
            vec![
                entry("a", "one", vec![1.0, 0.0]),
                entry("b", "two", vec![1.0, 0.0, 0.0]),
            ],
            "hashed".into(),
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn corrupted_docstore_fails_to_load() {
        let storage = StorageManager::memory();
        let index = VectorIndex::new(vec![entry("a", "one", vec![1.0])], "hashed".into())
            .expect("index");
        index.persist(&storage).await.expect("persist");

        storage
            .put(DOCSTORE_FILE, Bytes::from_static(b"{not json"))
            .await
            .expect("overwrite");

        let result = VectorIndex::load(&storage).await;
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }

    #[tokio::test]
    async fn missing_embedding_is_reported() {
        let storage = StorageManager::memory();
        let index = VectorIndex::new(
            vec![entry("a", "one", vec![1.0]), entry("b", "two", vec![0.5])],
            "hashed".into(),
        )
        .expect("index");
        index.persist(&storage).await.expect("persist");

        let empty = VectorStoreData {
            embedding_dict: BTreeMap::new(),
            text_id_to_ref_doc_id: BTreeMap::new(),
        };
        put_json(&storage, VECTOR_STORE_FILE, &empty)
            .await
            .expect("overwrite");

        let result = VectorIndex::load(&storage).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn index_without_index_store_is_incomplete() {
        let storage = StorageManager::memory();
        let index = VectorIndex::new(vec![entry("a", "one", vec![1.0])], "hashed".into())
            .expect("index");
        index.persist(&storage).await.expect("persist");

        let partial = StorageManager::memory();
        for file in [DOCSTORE_FILE, VECTOR_STORE_FILE] {
            let body = storage.get(file).await.expect("read");
            partial.put(file, body).await.expect("copy");
        }

        let result = VectorIndex::load(&partial).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn empty_storage_is_not_an_index() {
        let storage = StorageManager::memory();
        let result = VectorIndex::load(&storage).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
