use common::utils::config::AppConfig;

/// Character bounds handed to the text splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSettings {
    pub min_chars: usize,
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkSettings {
    fn default() -> Self {
        Self {
            min_chars: 1_000,
            max_chars: 4_000,
            overlap_chars: 200,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub chunking: ChunkSettings,
    pub embed_batch_size: usize,
    pub show_progress: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkSettings::default(),
            embed_batch_size: 100,
            show_progress: false,
        }
    }
}

impl IngestionConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            chunking: ChunkSettings {
                min_chars: config.chunk_min_chars,
                max_chars: config.chunk_max_chars,
                overlap_chars: config.chunk_overlap_chars,
            },
            embed_batch_size: config.embed_batch_size.max(1),
            show_progress: config.show_progress,
        }
    }
}
