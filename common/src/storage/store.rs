use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::{path::Path as ObjPath, ObjectStore};

pub type DynStore = Arc<dyn ObjectStore>;

/// Object storage rooted at a single index directory.
#[derive(Clone)]
pub struct StorageManager {
    store: DynStore,
}

impl StorageManager {
    /// Open (creating if needed) a local directory as the storage root.
    pub async fn local(base: impl AsRef<Path>) -> object_store::Result<Self> {
        let base = base.as_ref().to_path_buf();
        if !base.exists() {
            tokio::fs::create_dir_all(&base)
                .await
                .map_err(|e| object_store::Error::Generic {
                    store: "LocalFileSystem",
                    source: e.into(),
                })?;
        }
        let store = LocalFileSystem::new_with_prefix(base)?;

        Ok(Self::with_backend(Arc::new(store)))
    }

    /// Volatile storage, used by tests.
    pub fn memory() -> Self {
        Self::with_backend(Arc::new(InMemory::new()))
    }

    /// Create a StorageManager with a custom storage backend.
    pub fn with_backend(store: DynStore) -> Self {
        Self { store }
    }

    /// Store bytes at the specified location.
    pub async fn put(&self, location: &str, data: Bytes) -> object_store::Result<()> {
        let path = ObjPath::from(location);
        let payload = object_store::PutPayload::from_bytes(data);
        self.store.put(&path, payload).await.map(|_| ())
    }

    /// Retrieve bytes from the specified location, buffered in memory.
    pub async fn get(&self, location: &str) -> object_store::Result<Bytes> {
        let path = ObjPath::from(location);
        let result = self.store.get(&path).await?;
        result.bytes().await
    }

    /// Check if an object exists at the specified location.
    pub async fn exists(&self, location: &str) -> object_store::Result<bool> {
        let path = ObjPath::from(location);
        self.store
            .head(&path)
            .await
            .map(|_| true)
            .or_else(|e| match e {
                object_store::Error::NotFound { .. } => Ok(false),
                _ => Err(e),
            })
    }
}
