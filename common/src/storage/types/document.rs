use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Metadata, StoredObject};

pub const FILE_PATH_KEY: &str = "file_path";
pub const FILE_NAME_KEY: &str = "file_name";
pub const FILE_TYPE_KEY: &str = "file_type";
pub const FILE_SIZE_KEY: &str = "file_size";
pub const LAST_MODIFIED_KEY: &str = "last_modified_date";

/// Raw text read from one file of the documents folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(text: String, metadata: Metadata) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text,
            metadata,
        }
    }

    pub fn file_path(&self) -> Option<&str> {
        self.metadata.get(FILE_PATH_KEY).map(String::as_str)
    }
}

impl StoredObject for Document {
    fn get_id(&self) -> &str {
        &self.id
    }
}
