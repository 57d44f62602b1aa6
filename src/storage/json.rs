//! JSON file storage for the graph document

use super::traits::{GraphStore, StorageError, StorageResult};
use crate::config::LexConfig;
use crate::graph::Graph;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Write `value` as pretty JSON next to `path`, then rename over it.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document.json".to_string());
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    {
        let file = fs::File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "wrote document");
    Ok(())
}

/// Read a JSON document, mapping a missing file to `SourceNotFound`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    if !path.exists() {
        return Err(StorageError::SourceNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Graph document persisted as one JSON file, with backups in a
/// separate directory.
#[derive(Debug, Clone)]
pub struct JsonGraphStore {
    path: PathBuf,
    backup_dir: PathBuf,
}

impl JsonGraphStore {
    pub fn new(path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn from_config(config: &LexConfig) -> Self {
        Self::new(&config.graph_path, &config.backup_dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    fn backup_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "graph".to_string());
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let base = format!("{}_backup_{}", stem, timestamp);

        let mut candidate = self.backup_dir.join(format!("{}.json", base));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.backup_dir.join(format!("{}_{}.json", base, n));
            n += 1;
        }
        candidate
    }
}

impl GraphStore for JsonGraphStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> StorageResult<Graph> {
        if !self.exists() {
            return Err(StorageError::GraphNotFound(self.path.clone()));
        }
        let text = fs::read_to_string(&self.path)?;
        let graph: Graph = serde_json::from_str(&text)?;
        debug!(
            path = %self.path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "loaded graph"
        );
        Ok(graph)
    }

    fn save(&self, graph: &Graph) -> StorageResult<()> {
        write_json_atomic(&self.path, graph)?;
        info!(
            path = %self.path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph saved"
        );
        Ok(())
    }

    fn backup(&self) -> StorageResult<PathBuf> {
        if !self.exists() {
            return Err(StorageError::GraphNotFound(self.path.clone()));
        }
        fs::create_dir_all(&self.backup_dir)?;
        let target = self.backup_path();
        fs::copy(&self.path, &target)?;
        info!(path = %target.display(), "backup saved");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, EdgeType, GraphDelta, Node, NodeType};
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonGraphStore {
        JsonGraphStore::new(
            dir.path().join("kb").join("legal_graph.json"),
            dir.path().join("archive"),
        )
    }

    fn small_graph() -> Graph {
        let delta = GraphDelta::new()
            .with_node(Node::new("STJ_297", NodeType::Sumula).with_attribute("numero", 297))
            .with_node(Node::new("ARTIGO_CDC_Art6", NodeType::Artigo))
            .with_edge(Edge::new("STJ_297", "ARTIGO_CDC_Art6", EdgeType::Cites));
        Graph::new().merge(delta).0
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(!store.exists());

        let graph = small_graph();
        store.save(&graph).unwrap();
        assert!(store.exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, graph);
    }

    #[test]
    fn test_load_missing_graph() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir).load().unwrap_err();
        assert!(matches!(err, StorageError::GraphNotFound(_)));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&small_graph()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path().join("kb"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, vec!["legal_graph.json".to_string()]);
    }

    #[test]
    fn test_backup_copies_current_document() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&small_graph()).unwrap();

        let first = store.backup().unwrap();
        let second = store.backup().unwrap();
        assert_ne!(first, second);
        assert_eq!(fs::read(&first).unwrap(), fs::read(store.path()).unwrap());
        assert!(first
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("legal_graph_backup_"));
    }

    #[test]
    fn test_backup_without_graph_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            store(&dir).backup(),
            Err(StorageError::GraphNotFound(_))
        ));
    }
}
