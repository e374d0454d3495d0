use serde::{Deserialize, Serialize};
pub mod document;
pub mod text_chunk;

/// Metadata attached to documents and inherited by their chunks.
pub type Metadata = std::collections::BTreeMap<String, String>;

pub trait StoredObject: Serialize + for<'de> Deserialize<'de> {
    fn get_id(&self) -> &str;
}
