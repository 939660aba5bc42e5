//! Content providers: where the raw bytes of a statement come from.
//!
//! The parsers never open files themselves; the host hands them a provider,
//! which keeps every other stage free of I/O.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::LoadError;

pub trait ContentProvider {
    /// Return the raw bytes of `source_id`.
    fn read(&self, source_id: &str) -> Result<Vec<u8>, LoadError>;
}

/// Reads sources from the filesystem, optionally relative to a root.
#[derive(Debug, Clone, Default)]
pub struct FsProvider {
    root: Option<PathBuf>,
}

impl FsProvider {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, source_id: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(source_id),
            None => PathBuf::from(source_id),
        }
    }
}

impl ContentProvider for FsProvider {
    fn read(&self, source_id: &str) -> Result<Vec<u8>, LoadError> {
        fs::read(self.resolve(source_id)).map_err(|source| LoadError::Io {
            source_id: source_id.to_string(),
            source,
        })
    }
}

/// In-memory sources keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    sources: HashMap<String, Vec<u8>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source_id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.sources.insert(source_id.into(), content.into());
        self
    }
}

impl ContentProvider for MemoryProvider {
    fn read(&self, source_id: &str) -> Result<Vec<u8>, LoadError> {
        self.sources
            .get(source_id)
            .cloned()
            .ok_or_else(|| LoadError::Io {
                source_id: source_id.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such source"),
            })
    }
}
