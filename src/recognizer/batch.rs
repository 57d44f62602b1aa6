//! Extraction over files and directories of chunk records

use super::mention::ExtractedEntities;
use super::EntityRecognizer;
use crate::storage::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Entities found in one plain-text file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileExtraction {
    pub file: String,
    pub entities: ExtractedEntities,
    pub stats: BTreeMap<String, usize>,
}

/// Entities found in one chunk record.
///
/// This is also the record shape of an entities file consumed by the
/// enricher; every field tolerates absence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkExtraction {
    pub source_file: String,
    pub chunk_id: String,
    pub entities: ExtractedEntities,
    pub stats: BTreeMap<String, usize>,
}

impl ChunkExtraction {
    pub fn new(source_file: impl Into<String>, chunk_id: impl Into<String>, entities: ExtractedEntities) -> Self {
        let stats = entities.counts();
        Self {
            source_file: source_file.into(),
            chunk_id: chunk_id.into(),
            entities,
            stats,
        }
    }
}

impl EntityRecognizer {
    /// Extract from a plain-text file.
    pub fn extract_file(&self, path: &Path) -> StorageResult<FileExtraction> {
        if !path.is_file() {
            return Err(StorageError::SourceNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let entities = self.extract(&text);
        info!(file = %path.display(), total = entities.total(), "extracted entities");
        Ok(FileExtraction {
            file: path.display().to_string(),
            stats: entities.counts(),
            entities,
        })
    }

    /// Extract from every `*.json` chunk file in `dir`, in file-name order.
    ///
    /// A chunk file holds one record or an array of records. Unreadable
    /// files and non-object records are skipped with a warning; records
    /// without any configured text field are skipped silently.
    pub fn extract_chunk_dir(&self, dir: &Path) -> StorageResult<Vec<ChunkExtraction>> {
        if !dir.is_dir() {
            return Err(StorageError::SourceNotFound(dir.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut results = Vec::new();
        for path in &files {
            let value = match fs::read_to_string(path)
                .map_err(StorageError::from)
                .and_then(|text| serde_json::from_str::<Value>(&text).map_err(StorageError::from))
            {
                Ok(value) => value,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unreadable chunk file");
                    continue;
                }
            };

            let source_file = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let records = match value {
                Value::Array(items) => items,
                other => vec![other],
            };
            for (index, record) in records.iter().enumerate() {
                if let Some(chunk) = self.extract_record(&source_file, index, record) {
                    results.push(chunk);
                }
            }
        }

        info!(
            dir = %dir.display(),
            files = files.len(),
            chunks = results.len(),
            "chunk extraction complete"
        );
        Ok(results)
    }

    fn extract_record(&self, source_file: &str, index: usize, record: &Value) -> Option<ChunkExtraction> {
        let Some(fields) = record.as_object() else {
            warn!(file = source_file, index, "skipping malformed chunk record");
            return None;
        };

        let text = self
            .text_fields
            .iter()
            .filter_map(|field| fields.get(field).and_then(Value::as_str))
            .find(|text| !text.trim().is_empty());
        let Some(text) = text else {
            debug!(file = source_file, index, "chunk has no text");
            return None;
        };

        let chunk_id = match fields.get(&self.id_field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        Some(ChunkExtraction::new(source_file, chunk_id, self.extract(text)))
    }
}
