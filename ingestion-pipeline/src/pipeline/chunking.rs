use common::{
    error::AppError,
    storage::types::{document::Document, text_chunk::TextChunk},
};
use text_splitter::{ChunkCapacity, ChunkConfig, TextSplitter};

use super::config::ChunkSettings;

pub fn prepare_chunks(text: &str, settings: ChunkSettings) -> Result<Vec<String>, AppError> {
    let ChunkSettings {
        min_chars,
        max_chars,
        overlap_chars,
    } = settings;

    if min_chars == 0 || max_chars == 0 || min_chars > max_chars {
        return Err(AppError::Validation(
            "invalid chunk bounds; ensure 0 < min <= max".into(),
        ));
    }

    if overlap_chars >= min_chars {
        return Err(AppError::Validation(format!(
            "chunk_min_chars must be greater than the configured overlap of {overlap_chars}"
        )));
    }

    let chunk_capacity = ChunkCapacity::new(min_chars)
        .with_max(max_chars)
        .map_err(|e| AppError::Validation(format!("invalid chunk bounds: {e}")))?;
    let chunk_config = ChunkConfig::new(chunk_capacity)
        .with_overlap(overlap_chars)
        .map_err(|e| AppError::Validation(format!("invalid chunk overlap: {e}")))?;
    let splitter = TextSplitter::new(chunk_config);

    Ok(splitter
        .chunks(text)
        .filter(|chunk| !chunk.trim().is_empty())
        .map(str::to_owned)
        .collect())
}

/// Splits a document into chunks that inherit its metadata.
pub fn chunk_document(
    document: &Document,
    settings: ChunkSettings,
) -> Result<Vec<TextChunk>, AppError> {
    Ok(prepare_chunks(&document.text, settings)?
        .into_iter()
        .map(|text| TextChunk::new(document.id.clone(), text, document.metadata.clone()))
        .collect())
}
