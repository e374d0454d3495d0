use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{document::FILE_PATH_KEY, Metadata, StoredObject};

/// A slice of a document; the unit that is embedded and retrieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub id: String,
    pub doc_id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl TextChunk {
    pub fn new(doc_id: String, text: String, metadata: Metadata) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            doc_id,
            text,
            metadata,
        }
    }

    pub fn file_path(&self) -> Option<&str> {
        self.metadata.get(FILE_PATH_KEY).map(String::as_str)
    }
}

impl StoredObject for TextChunk {
    fn get_id(&self) -> &str {
        &self.id
    }
}
