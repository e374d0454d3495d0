use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use common::{
    error::AppError,
    storage::types::{
        document::{
            Document, FILE_NAME_KEY, FILE_PATH_KEY, FILE_SIZE_KEY, FILE_TYPE_KEY,
            LAST_MODIFIED_KEY,
        },
        Metadata,
    },
};
use tracing::{debug, info, instrument};
use walkdir::{DirEntry, WalkDir};

use crate::utils::file_text_extraction::extract_text_from_file;

/// Loads every readable file under a folder as a [`Document`].
#[derive(Debug, Clone)]
pub struct DirectoryReader {
    input_dir: PathBuf,
    recursive: bool,
}

impl DirectoryReader {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            recursive: true,
        }
    }

    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Documents in path order. Hidden files and directories are skipped.
    #[instrument(skip_all, fields(input_dir = %self.input_dir.display()))]
    pub async fn load_data(&self) -> Result<Vec<Document>, AppError> {
        if !self.input_dir.is_dir() {
            return Err(AppError::NotFound(format!(
                "Directory {} does not exist.",
                self.input_dir.display()
            )));
        }

        let files = self.list_files().await?;
        if files.is_empty() {
            return Err(AppError::Validation(format!(
                "No files found in {}.",
                self.input_dir.display()
            )));
        }

        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            if let Some(document) = load_document(&path).await? {
                documents.push(document);
            }
        }

        if documents.is_empty() {
            return Err(AppError::Validation(format!(
                "No readable documents found in {}.",
                self.input_dir.display()
            )));
        }

        info!(documents = documents.len(), "Loaded documents");
        Ok(documents)
    }

    async fn list_files(&self) -> Result<Vec<PathBuf>, AppError> {
        let root = self.input_dir.clone();
        let max_depth = if self.recursive { usize::MAX } else { 1 };

        tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>, AppError> {
            let mut files = Vec::new();
            for entry in WalkDir::new(&root)
                .max_depth(max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| !is_hidden(entry))
            {
                let entry = entry.map_err(|err| {
                    AppError::Io(err.into_io_error().unwrap_or_else(|| {
                        std::io::Error::other("filesystem loop while walking documents")
                    }))
                })?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
            Ok(files)
        })
        .await?
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

async fn load_document(path: &Path) -> Result<Option<Document>, AppError> {
    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let Some(text) = extract_text_from_file(path, mime_type).await? else {
        return Ok(None);
    };

    let file_meta = tokio::fs::metadata(path).await?;
    let mut metadata = Metadata::new();
    metadata.insert(FILE_PATH_KEY.into(), path.display().to_string());
    metadata.insert(
        FILE_NAME_KEY.into(),
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    metadata.insert(FILE_TYPE_KEY.into(), mime_type.to_string());
    metadata.insert(FILE_SIZE_KEY.into(), file_meta.len().to_string());
    if let Ok(modified) = file_meta.modified() {
        let modified: DateTime<Utc> = modified.into();
        metadata.insert(
            LAST_MODIFIED_KEY.into(),
            modified.format("%Y-%m-%d").to_string(),
        );
    }

    debug!(path = %path.display(), chars = text.len(), "Read document");
    Ok(Some(Document::new(text, metadata)))
}
