//! Curated knowledge-base sources.
//!
//! Each category loads independently. A missing or unparseable file yields
//! no records; a malformed record is skipped on its own.

use crate::config::LexConfig;
use crate::graph::ids;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SumulaRecord {
    pub texto: String,
    pub domains: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Detalhamento {
    pub cenarios: Option<Value>,
    pub vedacoes: Option<Value>,
    pub requisitos: Option<Value>,
    pub efeitos: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemaRecord {
    pub tribunal: Option<String>,
    pub situacao: Option<String>,
    pub tese: String,
    pub domains: Vec<String>,
    pub keywords: Vec<String>,
    pub aplicacao: String,
    pub detalhamento: Option<Detalhamento>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainRecord {
    pub agente_especializado: String,
    pub keywords: Vec<String>,
    pub base_legal: Vec<Value>,
    /// Súmula references: `"297"`, `"SV-61"`, `"297-STF"`, or bare numbers
    pub sumulas_principais: Vec<Value>,
    pub temas_principais: Vec<Value>,
}

impl DomainRecord {
    pub fn sumula_refs(&self) -> Vec<String> {
        self.sumulas_principais.iter().filter_map(reference_text).collect()
    }

    pub fn tema_refs(&self) -> Vec<String> {
        self.temas_principais.iter().filter_map(reference_text).collect()
    }
}

fn reference_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SumulaEntry {
    pub tribunal: String,
    pub numero: String,
    pub record: SumulaRecord,
}

impl SumulaEntry {
    pub fn id(&self) -> String {
        ids::sumula_id(&self.tribunal, &self.numero)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemaEntry {
    pub numero: String,
    pub record: TemaRecord,
}

impl TemaEntry {
    pub fn id(&self) -> String {
        ids::tema_id(&self.numero)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainEntry {
    pub name: String,
    pub record: DomainRecord,
}

impl DomainEntry {
    pub fn id(&self) -> String {
        ids::dominio_id(&self.name)
    }
}

/// All curated records, in key order within each category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    pub sumulas: Vec<SumulaEntry>,
    pub temas: Vec<TemaEntry>,
    pub domains: Vec<DomainEntry>,
}

impl KnowledgeBase {
    pub fn load(config: &LexConfig) -> Self {
        let kb = Self {
            sumulas: load_sumulas(&config.sumulas_path()),
            temas: load_temas(&config.temas_path()),
            domains: load_domains(&config.domains_path()),
        };
        info!(
            sumulas = kb.sumulas.len(),
            temas = kb.temas.len(),
            domains = kb.domains.len(),
            "knowledge base loaded"
        );
        kb
    }

    /// Súmula texts keyed by node id
    pub fn sumula_texts(&self) -> BTreeMap<String, String> {
        self.sumulas
            .iter()
            .map(|s| (s.id(), s.record.texto.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sumulas.is_empty() && self.temas.is_empty() && self.domains.is_empty()
    }
}

/// The mapping under `key` in a source document, or `None` with a warning.
fn read_section(path: &Path, key: &str) -> Option<Map<String, Value>> {
    if !path.is_file() {
        warn!(path = %path.display(), "{} source not found", key);
        return None;
    }
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));
    let document = match parsed {
        Ok(document) => document,
        Err(error) => {
            warn!(path = %path.display(), %error, "{} source unreadable", key);
            return None;
        }
    };
    match document.get(key) {
        Some(Value::Object(section)) => Some(section.clone()),
        _ => {
            warn!(path = %path.display(), "{} source has no `{}` mapping", key, key);
            None
        }
    }
}

fn parse_record<T: DeserializeOwned>(path: &Path, key: &str, value: &Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(record) => Some(record),
        Err(error) => {
            warn!(path = %path.display(), record = key, %error, "skipping malformed record");
            None
        }
    }
}

pub fn load_sumulas(path: &Path) -> Vec<SumulaEntry> {
    let Some(section) = read_section(path, "sumulas") else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    for (tribunal, numbered) in &section {
        let Some(numbered) = numbered.as_object() else {
            warn!(path = %path.display(), tribunal = %tribunal, "skipping malformed tribunal section");
            continue;
        };
        for (numero, value) in numbered {
            if let Some(record) = parse_record(path, numero, value) {
                entries.push(SumulaEntry {
                    tribunal: tribunal.trim().to_uppercase(),
                    numero: numero.trim().to_string(),
                    record,
                });
            }
        }
    }
    info!(count = entries.len(), "loaded sumulas");
    entries
}

pub fn load_temas(path: &Path) -> Vec<TemaEntry> {
    let Some(section) = read_section(path, "temas") else {
        return Vec::new();
    };
    let entries: Vec<TemaEntry> = section
        .iter()
        .filter_map(|(numero, value)| {
            parse_record(path, numero, value).map(|record| TemaEntry {
                numero: numero.trim().to_string(),
                record,
            })
        })
        .collect();
    info!(count = entries.len(), "loaded temas");
    entries
}

pub fn load_domains(path: &Path) -> Vec<DomainEntry> {
    let Some(section) = read_section(path, "domains") else {
        return Vec::new();
    };
    let entries: Vec<DomainEntry> = section
        .iter()
        .filter_map(|(name, value)| {
            parse_record(path, name, value).map(|record| DomainEntry {
                name: name.trim().to_string(),
                record,
            })
        })
        .collect();
    info!(count = entries.len(), "loaded domains");
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_source_is_empty() {
        assert!(load_sumulas(Path::new("/nonexistent/sumulas.json")).is_empty());
        assert!(load_temas(Path::new("/nonexistent/temas.json")).is_empty());
        assert!(load_domains(Path::new("/nonexistent/domains.json")).is_empty());
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sumulas.json");
        fs::write(
            &path,
            json!({"sumulas": {"STJ": {
                "297": {"texto": "O CDC é aplicável", "domains": ["direito_bancario"]},
                "30": {"texto": 30},
                "54": {}
            }}})
            .to_string(),
        )
        .unwrap();

        let entries = load_sumulas(&path);
        let ids: Vec<_> = entries.iter().map(SumulaEntry::id).collect();
        assert_eq!(ids, vec!["STJ_297", "STJ_54"]);
    }

    #[test]
    fn test_unparseable_source_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("temas.json");
        fs::write(&path, "[not json").unwrap();
        assert!(load_temas(&path).is_empty());
    }

    #[test]
    fn test_domain_references_accept_numbers() {
        let record: DomainRecord = serde_json::from_value(json!({
            "sumulas_principais": ["297", 479, "SV-61", ""],
            "temas_principais": [1368]
        }))
        .unwrap();
        assert_eq!(record.sumula_refs(), vec!["297", "479", "SV-61"]);
        assert_eq!(record.tema_refs(), vec!["1368"]);
    }
}
