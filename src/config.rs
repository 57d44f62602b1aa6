//! Paths and tunables shared by the components.
//!
//! A `LexConfig` is handed to every component at construction; nothing
//! reads ambient state, so tests can point a whole run at a temp dir.

use crate::storage::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File names of the curated knowledge-base sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub sumulas: String,
    pub temas: String,
    pub domains: String,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            sumulas: "sumulas.json".to_string(),
            temas: "temas_repetitivos.json".to_string(),
            domains: "domain_mapping.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexConfig {
    /// Directory holding the curated knowledge-base files
    pub knowledge_base_dir: PathBuf,
    /// The graph document
    pub graph_path: PathBuf,
    /// Where timestamped backups of the graph go
    pub backup_dir: PathBuf,
    /// Discovery report location
    pub discoveries_path: PathBuf,
    pub source_files: SourceFiles,
    /// Characters captured on each side of a recognized mention
    pub context_window: usize,
    /// Sample size for dry-run previews
    pub preview_limit: usize,
    /// Chunk text fields, tried in order
    pub text_fields: Vec<String>,
    /// Chunk identifier field
    pub id_field: String,
}

impl Default for LexConfig {
    fn default() -> Self {
        Self::rooted_at(".")
    }
}

impl LexConfig {
    /// Environment variable naming a config file
    pub const ENV_VAR: &'static str = "LEXGRAPH_CONFIG";

    /// All paths under a single root, laid out as the project expects.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let kb = root.join("knowledge_base");
        Self {
            graph_path: kb.join("legal_graph.json"),
            discoveries_path: kb.join("discovered_relationships.json"),
            knowledge_base_dir: kb,
            backup_dir: root.join("archive").join("knowledge_base"),
            source_files: SourceFiles::default(),
            context_window: 50,
            preview_limit: 5,
            text_fields: vec!["text_for_embedding".to_string(), "text".to_string()],
            id_field: "id".to_string(),
        }
    }

    /// Load from YAML. Missing keys fall back to defaults.
    pub fn from_yaml_file(path: &Path) -> StorageResult<Self> {
        if !path.exists() {
            return Err(StorageError::SourceNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let config: LexConfig = serde_yaml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config for a CLI run: an explicit file, then
    /// `$LEXGRAPH_CONFIG`, then `<config dir>/lexgraph/config.yaml`, then
    /// defaults relative to the working directory.
    pub fn discover(explicit: Option<&Path>) -> StorageResult<Self> {
        if let Some(path) = explicit {
            return Self::from_yaml_file(path);
        }
        if let Some(path) = std::env::var_os(Self::ENV_VAR) {
            return Self::from_yaml_file(Path::new(&path));
        }
        if let Some(path) = Self::user_config_path().filter(|p| p.is_file()) {
            return Self::from_yaml_file(&path);
        }
        Ok(Self::default())
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lexgraph").join("config.yaml"))
    }

    pub fn validate(&self) -> StorageResult<()> {
        if self.text_fields.is_empty() {
            return Err(StorageError::InvalidConfig(
                "text_fields must name at least one field".to_string(),
            ));
        }
        if self.graph_path.as_os_str().is_empty() {
            return Err(StorageError::InvalidConfig("graph_path is empty".to_string()));
        }
        Ok(())
    }

    pub fn sumulas_path(&self) -> PathBuf {
        self.knowledge_base_dir.join(&self.source_files.sumulas)
    }

    pub fn temas_path(&self) -> PathBuf {
        self.knowledge_base_dir.join(&self.source_files.temas)
    }

    pub fn domains_path(&self) -> PathBuf {
        self.knowledge_base_dir.join(&self.source_files.domains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rooted_paths() {
        let config = LexConfig::rooted_at("/data");
        assert_eq!(config.graph_path, PathBuf::from("/data/knowledge_base/legal_graph.json"));
        assert_eq!(config.backup_dir, PathBuf::from("/data/archive/knowledge_base"));
        assert_eq!(config.sumulas_path(), PathBuf::from("/data/knowledge_base/sumulas.json"));
        assert_eq!(config.context_window, 50);
    }

    #[test]
    fn yaml_overrides_keep_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "graph_path: /tmp/g.json\ncontext_window: 20\nsource_files:\n  temas: temas.json\n",
        )
        .unwrap();

        let config = LexConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.graph_path, PathBuf::from("/tmp/g.json"));
        assert_eq!(config.context_window, 20);
        assert_eq!(config.source_files.temas, "temas.json");
        assert_eq!(config.source_files.sumulas, "sumulas.json");
        assert_eq!(config.preview_limit, 5);
    }

    #[test]
    fn rejects_empty_text_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "text_fields: []\n").unwrap();
        assert!(matches!(
            LexConfig::from_yaml_file(&path),
            Err(StorageError::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_config_file() {
        let err = LexConfig::from_yaml_file(Path::new("/nonexistent/lexgraph.yaml")).unwrap_err();
        assert!(matches!(err, StorageError::SourceNotFound(_)));
    }
}
