use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::content::{read_optional, write_bytes_atomic};

use super::bits::BitError;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to read save {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write save {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("save record does not fit its format: {0}")]
    Encode(#[from] BitError),
}

/// Where save blobs live between runs.
pub trait SaveStore {
    /// `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<u8>>, SaveError>;

    fn store(&mut self, bytes: &[u8]) -> Result<(), SaveError>;
}

/// Single save file replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileSaveStore {
    path: PathBuf,
}

impl FileSaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStore for FileSaveStore {
    fn load(&self) -> Result<Option<Vec<u8>>, SaveError> {
        read_optional(&self.path).map_err(|source| SaveError::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn store(&mut self, bytes: &[u8]) -> Result<(), SaveError> {
        write_bytes_atomic(&self.path, bytes).map_err(|source| SaveError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySaveStore {
    bytes: Option<Vec<u8>>,
    writes: usize,
}

impl MemorySaveStore {
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes),
            writes: 0,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SaveStore for MemorySaveStore {
    fn load(&self) -> Result<Option<Vec<u8>>, SaveError> {
        Ok(self.bytes.clone())
    }

    fn store(&mut self, bytes: &[u8]) -> Result<(), SaveError> {
        self.bytes = Some(bytes.to_vec());
        self.writes += 1;
        Ok(())
    }
}
