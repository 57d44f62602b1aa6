//! The discovery heuristics.
//!
//! Each heuristic proposes edges whose endpoints exist and whose triple is
//! not already in the graph. Heuristics never see each other's output.

use super::tables::{ConceptMapping, Supersession, CONCEPT_MAPPINGS, SUBJECT_CLUSTERS, SUPERSESSIONS};
use crate::graph::{ids, Edge, EdgeKey, EdgeType, Graph, NodeId};
use crate::recognizer::{ARTICLE_REFERENCE, SUMULA_REFERENCE, TEMA_REFERENCE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Characters kept either side of a textual cross-reference
pub const TEXT_CONTEXT_CHARS: usize = 30;

/// How a relationship was found; written as `discovered_by`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    SubjectAnalysis,
    ConceptMapping,
    SupersessionAnalysis,
    TextAnalysis,
}

impl DiscoveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryMethod::SubjectAnalysis => "subject_analysis",
            DiscoveryMethod::ConceptMapping => "concept_mapping",
            DiscoveryMethod::SupersessionAnalysis => "supersession_analysis",
            DiscoveryMethod::TextAnalysis => "text_analysis",
        }
    }
}

impl std::fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot a heuristic runs against
pub struct DiscoveryContext<'a> {
    graph: &'a Graph,
    existing: HashSet<EdgeKey>,
    /// Súmula id → its raw text
    sumula_texts: &'a BTreeMap<String, String>,
}

impl<'a> DiscoveryContext<'a> {
    pub fn new(graph: &'a Graph, sumula_texts: &'a BTreeMap<String, String>) -> Self {
        Self {
            graph,
            existing: graph.edge_keys(),
            sumula_texts,
        }
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.graph.contains_node(&NodeId::from(id))
    }

    pub fn has_edge(&self, source: &str, target: &str, edge_type: &EdgeType) -> bool {
        self.existing
            .contains(&(NodeId::from(source), NodeId::from(target), edge_type.clone()))
    }
}

/// A source of candidate edges
pub trait DiscoveryHeuristic {
    fn method(&self) -> DiscoveryMethod;

    fn discover(&self, context: &DiscoveryContext<'_>) -> Vec<Edge>;
}

/// Collects candidates for one heuristic, dropping repeats and edges that
/// already exist.
struct Proposals<'c, 'a> {
    context: &'c DiscoveryContext<'a>,
    method: DiscoveryMethod,
    seen: HashSet<EdgeKey>,
    edges: Vec<Edge>,
}

impl<'c, 'a> Proposals<'c, 'a> {
    fn new(context: &'c DiscoveryContext<'a>, method: DiscoveryMethod) -> Self {
        Self {
            context,
            method,
            seen: HashSet::new(),
            edges: Vec::new(),
        }
    }

    fn propose(&mut self, edge: Edge) {
        if self
            .context
            .has_edge(edge.source.as_str(), edge.target.as_str(), &edge.edge_type)
        {
            return;
        }
        if self.seen.insert(edge.key()) {
            self.edges
                .push(edge.with_property("discovered_by", self.method.as_str()));
        }
    }

    fn finish(self) -> Vec<Edge> {
        self.edges
    }
}

/// Every pair inside a subject cluster becomes RELATED_TO.
///
/// Pairs are ordered (lower id → higher id) and skipped when either
/// direction is already present. Quadratic in cluster size.
#[derive(Debug, Default)]
pub struct SubjectClusters;

impl DiscoveryHeuristic for SubjectClusters {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::SubjectAnalysis
    }

    fn discover(&self, context: &DiscoveryContext<'_>) -> Vec<Edge> {
        let mut proposals = Proposals::new(context, self.method());
        for (cluster, members) in SUBJECT_CLUSTERS {
            let present: Vec<&str> = members.iter().copied().filter(|id| context.has_node(id)).collect();
            for (i, a) in present.iter().enumerate() {
                for b in &present[i + 1..] {
                    let (source, target) = if a <= b { (*a, *b) } else { (*b, *a) };
                    if context.has_edge(target, source, &EdgeType::RelatedTo) {
                        continue;
                    }
                    proposals.propose(
                        Edge::new(source, target, EdgeType::RelatedTo).with_property("cluster", *cluster),
                    );
                }
            }
        }
        proposals.finish()
    }
}

/// Súmulas GOVERN the concepts they instantiate; temas APPLY_TO them.
#[derive(Debug, Default)]
pub struct ConceptLinks;

impl ConceptLinks {
    fn link(proposals: &mut Proposals<'_, '_>, mapping: &ConceptMapping, members: &[&str], edge_type: EdgeType) {
        let context = proposals.context;
        for id in members.iter().filter(|id| context.has_node(id)) {
            proposals.propose(
                Edge::new(*id, mapping.concept_id, edge_type.clone()).with_property("concept", mapping.concept),
            );
        }
    }
}

impl DiscoveryHeuristic for ConceptLinks {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::ConceptMapping
    }

    fn discover(&self, context: &DiscoveryContext<'_>) -> Vec<Edge> {
        let mut proposals = Proposals::new(context, self.method());
        for mapping in CONCEPT_MAPPINGS {
            if !context.has_node(mapping.concept_id) {
                continue;
            }
            Self::link(&mut proposals, mapping, mapping.sumulas, EdgeType::Governs);
            Self::link(&mut proposals, mapping, mapping.temas, EdgeType::AppliesTo);
        }
        proposals.finish()
    }
}

/// Fixed "X modifies Y" facts
#[derive(Debug, Default)]
pub struct Supersessions;

impl DiscoveryHeuristic for Supersessions {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::SupersessionAnalysis
    }

    fn discover(&self, context: &DiscoveryContext<'_>) -> Vec<Edge> {
        let mut proposals = Proposals::new(context, self.method());
        for Supersession { source, target, reason } in SUPERSESSIONS {
            if context.has_node(source) && context.has_node(target) {
                proposals.propose(Edge::new(*source, *target, EdgeType::Modifies).with_property("reason", *reason));
            }
        }
        proposals.finish()
    }
}

/// Cross-references inside súmula texts: other súmulas and articles are
/// CITES, temas are RELATED_TO.
#[derive(Debug, Default)]
pub struct TextReferences;

impl DiscoveryHeuristic for TextReferences {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::TextAnalysis
    }

    fn discover(&self, context: &DiscoveryContext<'_>) -> Vec<Edge> {
        let mut proposals = Proposals::new(context, self.method());
        for (source, texto) in context.sumula_texts {
            if !context.has_node(source) {
                continue;
            }

            for caps in SUMULA_REFERENCE.captures_iter(texto) {
                let target = ids::sumula_id(ids::DEFAULT_TRIBUNAL, &caps[1]);
                if &target != source && context.has_node(&target) {
                    proposals.propose(text_edge(source, target, EdgeType::Cites, texto, &caps));
                }
            }
            for caps in TEMA_REFERENCE.captures_iter(texto) {
                let target = ids::tema_id(&caps[1]);
                if context.has_node(&target) {
                    proposals.propose(text_edge(source, target, EdgeType::RelatedTo, texto, &caps));
                }
            }
            for caps in ARTICLE_REFERENCE.captures_iter(texto) {
                let code = caps[2].to_uppercase();
                let target = ids::artigo_id(Some(&code), &caps[1], None);
                if context.has_node(&target) {
                    proposals.propose(text_edge(source, target, EdgeType::Cites, texto, &caps));
                }
            }
        }
        proposals.finish()
    }
}

fn text_edge(source: &str, target: String, edge_type: EdgeType, texto: &str, caps: &regex::Captures<'_>) -> Edge {
    let context = caps
        .get(0)
        .map(|m| surrounding(texto, m.start(), m.end(), TEXT_CONTEXT_CHARS))
        .unwrap_or_default();
    Edge::new(source, target, edge_type).with_property("context", context)
}

/// The match plus up to `chars` characters either side, verbatim.
fn surrounding(text: &str, start: usize, end: usize, chars: usize) -> String {
    let left = text[..start]
        .char_indices()
        .rev()
        .take(chars)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let right = text[end..]
        .char_indices()
        .nth(chars)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    text[left..right].to_string()
}

/// The four heuristics in run order
pub fn default_heuristics() -> Vec<Box<dyn DiscoveryHeuristic>> {
    vec![
        Box::new(SubjectClusters),
        Box::new(ConceptLinks),
        Box::new(Supersessions),
        Box::new(TextReferences),
    ]
}
