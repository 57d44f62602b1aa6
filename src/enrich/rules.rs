//! Co-occurrence edge typing and per-run counters

use crate::graph::EdgeType;
use crate::recognizer::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of a kind when a chunk's mentions are paired: temas, súmulas,
/// articles, statutes, processes, concepts. Every typed rule below pairs a
/// lower rank with a higher one, so each stays reachable whatever the
/// order of the prose.
pub fn pairing_rank(kind: EntityKind) -> u8 {
    match kind {
        EntityKind::Tema => 0,
        EntityKind::Sumula => 1,
        EntityKind::Artigo => 2,
        EntityKind::Lei => 3,
        EntityKind::Processo => 4,
        EntityKind::Conceito => 5,
        EntityKind::Tribunal => 6,
    }
}

/// Edge type for two mentions found in the same chunk, `first` ranking
/// before `second` in [`pairing_rank`] order.
///
/// Keyed on the ordered pair: (Artigo, Sumula) is RELATED_TO even though
/// (Sumula, Artigo) is CITES.
pub fn cooccurrence_edge_type(first: EntityKind, second: EntityKind) -> EdgeType {
    match (first, second) {
        (EntityKind::Sumula, EntityKind::Artigo) => EdgeType::Cites,
        (EntityKind::Tema, EntityKind::Sumula) => EdgeType::Modifies,
        (EntityKind::Sumula, EntityKind::Conceito) => EdgeType::Governs,
        _ => EdgeType::RelatedTo,
    }
}

/// What one enrichment run added, per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    pub sumulas_added: usize,
    pub temas_added: usize,
    pub artigos_added: usize,
    pub leis_added: usize,
    pub processos_added: usize,
    pub conceitos_added: usize,
    pub edges_cites: usize,
    pub edges_modifies: usize,
    pub edges_governs: usize,
    pub edges_applies_to: usize,
    pub edges_related: usize,
    pub edges_rejected: usize,
}

impl EnrichmentStats {
    pub fn record_node(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Sumula => self.sumulas_added += 1,
            EntityKind::Tema => self.temas_added += 1,
            EntityKind::Artigo => self.artigos_added += 1,
            EntityKind::Lei => self.leis_added += 1,
            EntityKind::Processo => self.processos_added += 1,
            EntityKind::Conceito => self.conceitos_added += 1,
            EntityKind::Tribunal => {}
        }
    }

    pub fn record_edge(&mut self, edge_type: &EdgeType) {
        match edge_type {
            EdgeType::Cites => self.edges_cites += 1,
            EdgeType::Modifies => self.edges_modifies += 1,
            EdgeType::Governs => self.edges_governs += 1,
            EdgeType::AppliesTo => self.edges_applies_to += 1,
            _ => self.edges_related += 1,
        }
    }

    pub fn nodes_added(&self) -> usize {
        self.sumulas_added
            + self.temas_added
            + self.artigos_added
            + self.leis_added
            + self.processos_added
            + self.conceitos_added
    }

    pub fn edges_added(&self) -> usize {
        self.edges_cites + self.edges_modifies + self.edges_governs + self.edges_applies_to + self.edges_related
    }

    /// Flat form written to `metadata.enrichmentStats`
    pub fn to_map(&self) -> BTreeMap<String, usize> {
        [
            ("sumulas_added", self.sumulas_added),
            ("temas_added", self.temas_added),
            ("artigos_added", self.artigos_added),
            ("leis_added", self.leis_added),
            ("processos_added", self.processos_added),
            ("conceitos_added", self.conceitos_added),
            ("edges_cites", self.edges_cites),
            ("edges_modifies", self.edges_modifies),
            ("edges_governs", self.edges_governs),
            ("edges_applies_to", self.edges_applies_to),
            ("edges_related", self.edges_related),
            ("edges_rejected", self.edges_rejected),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}
