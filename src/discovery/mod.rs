//! Relationship Discoverer: heuristic edges beyond the Builder's tables.
//!
//! Discovery only ever adds edges. Candidates from all heuristics are
//! concatenated as proposed; applying them goes through [`Graph::merge`],
//! which keeps the no-dangling and no-duplicate invariants.

mod heuristics;
mod tables;

pub use heuristics::{
    default_heuristics, ConceptLinks, DiscoveryContext, DiscoveryHeuristic, DiscoveryMethod, SubjectClusters,
    Supersessions, TextReferences, TEXT_CONTEXT_CHARS,
};
pub use tables::{ConceptMapping, Supersession, CONCEPT_MAPPINGS, SUBJECT_CLUSTERS, SUPERSESSIONS};

use crate::builder::load_sumulas;
use crate::config::LexConfig;
use crate::graph::{timestamp, Edge, Graph, GraphDelta, MergeSummary, NodeType};
use crate::storage::{write_json_atomic, GraphStore, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Standalone record of one discovery run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub discovered_at: String,
    pub total_relationships: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_discovery_method: BTreeMap<String, usize>,
    pub relationships: Vec<Edge>,
}

impl DiscoveryReport {
    pub fn new(relationships: Vec<Edge>) -> Self {
        let mut by_type = BTreeMap::new();
        let mut by_discovery_method = BTreeMap::new();
        for edge in &relationships {
            *by_type.entry(edge.edge_type.as_str().to_string()).or_insert(0) += 1;
            let method = edge.property_str("discovered_by").unwrap_or("unknown");
            *by_discovery_method.entry(method.to_string()).or_insert(0) += 1;
        }
        Self {
            discovered_at: timestamp(),
            total_relationships: relationships.len(),
            by_type,
            by_discovery_method,
            relationships,
        }
    }
}

/// What applying a set of discoveries would add
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyPreview {
    pub relationships_to_add: usize,
    pub by_type: BTreeMap<String, usize>,
}

/// How far a discovery run goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Discover and save the report
    ReportOnly,
    /// Also compute what applying would add; the graph is not touched
    DryRun,
    /// Back up, merge and write the graph
    Apply,
}

#[derive(Debug, Clone)]
pub struct DiscoveryOutcome {
    pub report: DiscoveryReport,
    pub preview: Option<ApplyPreview>,
    pub applied: Option<MergeSummary>,
    pub backup: Option<PathBuf>,
}

pub struct RelationshipDiscoverer {
    config: LexConfig,
    heuristics: Vec<Box<dyn DiscoveryHeuristic>>,
}

impl RelationshipDiscoverer {
    pub fn new(config: &LexConfig) -> Self {
        Self {
            config: config.clone(),
            heuristics: default_heuristics(),
        }
    }

    pub fn with_heuristics(mut self, heuristics: Vec<Box<dyn DiscoveryHeuristic>>) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Súmula texts for the text heuristic: the knowledge-base records,
    /// falling back to the graph's own `texto` attributes.
    pub fn sumula_texts(&self, graph: &Graph) -> BTreeMap<String, String> {
        let mut texts: BTreeMap<String, String> = load_sumulas(&self.config.sumulas_path())
            .into_iter()
            .map(|entry| (entry.id(), entry.record.texto))
            .collect();
        for node in graph.nodes_of_type(&NodeType::Sumula) {
            if let Some(texto) = node.text("texto") {
                texts.entry(node.id.to_string()).or_insert_with(|| texto.to_string());
            }
        }
        texts
    }

    /// Run every heuristic against the snapshot and concatenate.
    pub fn discover(&self, graph: &Graph, sumula_texts: &BTreeMap<String, String>) -> Vec<Edge> {
        let context = DiscoveryContext::new(graph, sumula_texts);
        let mut all = Vec::new();
        for heuristic in &self.heuristics {
            let found = heuristic.discover(&context);
            info!(method = %heuristic.method(), count = found.len(), "discovered relationships");
            all.extend(found);
        }
        all
    }

    pub fn save_report(&self, report: &DiscoveryReport) -> StorageResult<()> {
        write_json_atomic(&self.config.discoveries_path, report)?;
        info!(
            path = %self.config.discoveries_path.display(),
            total = report.total_relationships,
            "discovery report saved"
        );
        Ok(())
    }

    /// Count what [`apply`](Self::apply) would add, without keeping the result.
    pub fn preview(graph: &Graph, relationships: &[Edge]) -> ApplyPreview {
        let before = graph.edge_count();
        let (merged, summary) = graph.clone().merge(GraphDelta {
            nodes: Vec::new(),
            edges: relationships.to_vec(),
        });
        let mut by_type = BTreeMap::new();
        for edge in &merged.edges[before..] {
            *by_type.entry(edge.edge_type.as_str().to_string()).or_insert(0) += 1;
        }
        ApplyPreview {
            relationships_to_add: summary.edges_added,
            by_type,
        }
    }

    /// Merge discoveries into the graph and stamp the metadata.
    pub fn apply(graph: Graph, relationships: Vec<Edge>) -> (Graph, MergeSummary) {
        let (mut graph, summary) = graph.merge(GraphDelta {
            nodes: Vec::new(),
            edges: relationships,
        });
        graph.metadata.relationships_discovered_at = Some(timestamp());
        graph.metadata.relationships_added = Some(summary.edges_added);
        graph.touch();
        (graph, summary)
    }

    /// Load, discover, save the report and, depending on `mode`, preview or
    /// apply. Only [`ApplyMode::Apply`] writes the graph, after a backup.
    pub fn run(&self, store: &dyn GraphStore, mode: ApplyMode) -> StorageResult<DiscoveryOutcome> {
        let graph = store.load()?;
        let texts = self.sumula_texts(&graph);
        let relationships = self.discover(&graph, &texts);
        let report = DiscoveryReport::new(relationships);
        self.save_report(&report)?;

        let mut outcome = DiscoveryOutcome {
            report,
            preview: None,
            applied: None,
            backup: None,
        };
        match mode {
            ApplyMode::ReportOnly => {}
            ApplyMode::DryRun => {
                outcome.preview = Some(Self::preview(&graph, &outcome.report.relationships));
            }
            ApplyMode::Apply => {
                let backup = store.backup()?;
                let (graph, summary) = Self::apply(graph, outcome.report.relationships.clone());
                store.save(&graph)?;
                info!(added = summary.edges_added, total_edges = graph.edge_count(), "applied discoveries");
                outcome.backup = Some(backup);
                outcome.applied = Some(summary);
            }
        }
        Ok(outcome)
    }
}
