//! Recognized mentions and the per-type result map

use crate::graph::NodeType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entity types the recognizer looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Sumula,
    Tema,
    Artigo,
    Lei,
    Processo,
    Conceito,
    Tribunal,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Sumula,
        EntityKind::Tema,
        EntityKind::Artigo,
        EntityKind::Lei,
        EntityKind::Processo,
        EntityKind::Conceito,
        EntityKind::Tribunal,
    ];

    /// Key used in result maps and reports
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Sumula => "sumulas",
            EntityKind::Tema => "temas",
            EntityKind::Artigo => "artigos",
            EntityKind::Lei => "leis",
            EntityKind::Processo => "processos",
            EntityKind::Conceito => "conceitos",
            EntityKind::Tribunal => "tribunais",
        }
    }

    /// The graph node type a mention of this kind becomes, if any.
    /// Tribunals are recognized for context but never become nodes.
    pub fn node_type(&self) -> Option<NodeType> {
        match self {
            EntityKind::Sumula => Some(NodeType::Sumula),
            EntityKind::Tema => Some(NodeType::Tema),
            EntityKind::Artigo => Some(NodeType::Artigo),
            EntityKind::Lei => Some(NodeType::Lei),
            EntityKind::Processo => Some(NodeType::Processo),
            EntityKind::Conceito => Some(NodeType::Conceito),
            EntityKind::Tribunal => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Sumula => "Sumula",
            EntityKind::Tema => "Tema",
            EntityKind::Artigo => "Artigo",
            EntityKind::Lei => "Lei",
            EntityKind::Processo => "Processo",
            EntityKind::Conceito => "Conceito",
            EntityKind::Tribunal => "Tribunal",
        };
        f.write_str(name)
    }
}

/// One recognized reference in a block of text.
///
/// Offsets are byte offsets into the text the mention was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Matched surface text
    #[serde(default)]
    pub raw_value: String,
    /// Canonical display form, e.g. `Sumula 297/STJ`
    #[serde(rename = "value")]
    pub label: String,
    #[serde(default)]
    pub tribunal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Canonical code of an article, or the statute prefix of a law
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub normalized_id: String,
    #[serde(rename = "start")]
    pub start_offset: usize,
    #[serde(rename = "end")]
    pub end_offset: usize,
    #[serde(rename = "context", default)]
    pub context_snippet: String,
}

/// Mentions grouped by type. Every type is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedEntities {
    pub sumulas: Vec<EntityMention>,
    pub temas: Vec<EntityMention>,
    pub artigos: Vec<EntityMention>,
    pub leis: Vec<EntityMention>,
    pub processos: Vec<EntityMention>,
    pub conceitos: Vec<EntityMention>,
    pub tribunais: Vec<EntityMention>,
}

impl ExtractedEntities {
    pub fn get(&self, kind: EntityKind) -> &[EntityMention] {
        match kind {
            EntityKind::Sumula => &self.sumulas,
            EntityKind::Tema => &self.temas,
            EntityKind::Artigo => &self.artigos,
            EntityKind::Lei => &self.leis,
            EntityKind::Processo => &self.processos,
            EntityKind::Conceito => &self.conceitos,
            EntityKind::Tribunal => &self.tribunais,
        }
    }

    pub fn get_mut(&mut self, kind: EntityKind) -> &mut Vec<EntityMention> {
        match kind {
            EntityKind::Sumula => &mut self.sumulas,
            EntityKind::Tema => &mut self.temas,
            EntityKind::Artigo => &mut self.artigos,
            EntityKind::Lei => &mut self.leis,
            EntityKind::Processo => &mut self.processos,
            EntityKind::Conceito => &mut self.conceitos,
            EntityKind::Tribunal => &mut self.tribunais,
        }
    }

    /// All mentions, grouped in [`EntityKind::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = &EntityMention> {
        EntityKind::ALL.into_iter().flat_map(move |k| self.get(k).iter())
    }

    /// Mention count per type, keyed by the plural type name
    pub fn counts(&self) -> BTreeMap<String, usize> {
        EntityKind::ALL
            .iter()
            .map(|k| (k.plural().to_string(), self.get(*k).len()))
            .collect()
    }

    pub fn total(&self) -> usize {
        EntityKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
