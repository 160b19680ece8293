mod atomic_io;
mod catalog;
mod config;
mod images;
mod keys;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub(crate) use atomic_io::{read_optional, write_bytes_atomic};
pub use catalog::{load_catalog, parse_catalog, QuestCatalog, QuestDef, MAX_QUEST_ROOMS};
pub use config::{
    load_config, parse_config, ConfigError, GameConfig, Movement, ScoreThresholds, Timings,
    DEFAULT_SCORE_THRESHOLDS,
};
pub use images::{ImageBank, PaletteImage};
pub use keys::ResourceKeyError;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} at {json_path}: {message}")]
    Parse {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("validation failed at {path}: {message}")]
    Invalid { path: String, message: String },
    #[error("invalid resource key '{key}': {source}")]
    ResourceKey {
        key: String,
        #[source]
        source: ResourceKeyError,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image '{name}' is {width}x{height} but has {actual} pixels")]
    ImageSize {
        name: String,
        width: u32,
        height: u32,
        actual: usize,
    },
}

impl ContentError {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        ContentError::Invalid {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn expected_actual(
        path: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::invalid(path, format!("expected {expected}, got {actual}"))
    }
}

/// Deserializes JSON, reporting failures as `(json_path, message)`.
pub(crate) fn parse_json_with_path<T: DeserializeOwned>(raw: &str) -> Result<T, (String, String)> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let message = error.into_inner().to_string();
        let path = if path.is_empty() { ".".to_string() } else { path };
        (path, message)
    })
}
