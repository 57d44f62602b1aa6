//! Storage trait definitions

use crate::graph::Graph;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing documents
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Graph file not found: {0}")]
    GraphNotFound(PathBuf),

    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence of the single graph document.
///
/// Read-modify-write cycles are not locked: callers must serialize
/// concurrent runs against the same document.
pub trait GraphStore: Send + Sync {
    /// Whether a graph document exists
    fn exists(&self) -> bool;

    /// Load the graph document. Fails with `GraphNotFound` if absent.
    fn load(&self) -> StorageResult<Graph>;

    /// Replace the graph document
    fn save(&self, graph: &Graph) -> StorageResult<()>;

    /// Copy the current document to a timestamped backup, returning where
    fn backup(&self) -> StorageResult<PathBuf>;
}
