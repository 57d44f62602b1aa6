//! Shared fixtures for the end-to-end tests
//!
//! A small knowledge base (three súmulas, one tema, three domains) and a
//! chunk directory, written into a temp dir laid out like a real project.

#![allow(dead_code)]

use lexgraph::LexConfig;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Fixture {
    pub dir: TempDir,
    pub config: LexConfig,
}

impl Fixture {
    /// Temp project with the knowledge base written but no graph yet.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let config = LexConfig::rooted_at(dir.path());
        write_knowledge_base(&config);
        Self { dir, config }
    }

    pub fn chunk_dir(&self) -> PathBuf {
        let chunks = self.dir.path().join("chunks");
        fs::create_dir_all(&chunks).expect("chunk dir");
        write_json(&chunks.join("acordaos.json"), &chunk_records());
        chunks
    }
}

pub fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir");
    }
    fs::write(path, serde_json::to_string_pretty(value).expect("json")).expect("write fixture");
}

pub fn write_knowledge_base(config: &LexConfig) {
    write_json(
        &config.sumulas_path(),
        &json!({"sumulas": {"STJ": {
            "297": {
                "texto": "O Codigo de Defesa do Consumidor e aplicavel as instituicoes financeiras. Ver Sumula 381 e art. 14 do CDC.",
                "domains": ["direito_bancario", "consumidor"],
                "keywords": ["cdc", "banco", "consumidor"]
            },
            "381": {
                "texto": "Nos contratos bancarios, e vedado ao julgador conhecer, de oficio, da abusividade das clausulas.",
                "domains": ["direito_bancario"],
                "keywords": ["banco", "abusividade", "cdc"]
            },
            "54": {
                "texto": "Os juros moratorios fluem a partir do evento danoso, em caso de responsabilidade extracontratual.",
                "domains": ["responsabilidade_civil"],
                "keywords": ["juros", "mora"]
            }
        }}}),
    );
    write_json(
        &config.temas_path(),
        &json!({"temas": {
            "1368": {
                "tribunal": "STJ",
                "situacao": "JULGADO",
                "tese": "A correcao monetaria e os juros de mora seguem a taxa SELIC.",
                "domains": ["responsabilidade_civil"],
                "keywords": ["juros", "selic"]
            }
        }}),
    );
    write_json(
        &config.domains_path(),
        &json!({"domains": {
            "direito_bancario": {
                "agente_especializado": "agente_bancario",
                "keywords": ["banco"],
                "sumulas_principais": ["297", "381"]
            },
            "consumidor": {
                "agente_especializado": "agente_consumidor",
                "sumulas_principais": ["297"]
            },
            "responsabilidade_civil": {
                "agente_especializado": "agente_civil",
                "sumulas_principais": ["54"],
                "temas_principais": ["1368"]
            }
        }}),
    );
}

/// Two chunks with text and one without
pub fn chunk_records() -> Value {
    json!([
        {"id": "c1", "text": "O Tema 1368 altera a Súmula 54, nos termos do art. 406 do CC."},
        {"id": 2, "text": "Aplica-se a Súmula 479 do STJ: responsabilidade objetiva dos bancos."},
        {"id": "c3"}
    ])
}
