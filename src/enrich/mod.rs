//! Graph Enricher: merge freshly recognized mentions into the persisted graph.
//!
//! Each chunk's mentions become nodes (new ids only) and co-occurrence
//! edges typed by [`cooccurrence_edge_type`]. Planning is pure; [`GraphEnricher::run`]
//! backs the document up before writing, and a dry run writes nothing.

mod rules;

pub use rules::{cooccurrence_edge_type, pairing_rank, EnrichmentStats};

use crate::builder::numero_value;
use crate::config::LexConfig;
use crate::graph::{ids, timestamp, Edge, EdgeKey, Graph, GraphDelta, Node, NodeId, NodeType};
use crate::recognizer::{ChunkExtraction, EntityKind, EntityMention, EntityRecognizer};
use crate::storage::{GraphStore, StorageError, StorageResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Nodes and edges one enrichment would add
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentPlan {
    pub delta: GraphDelta,
    pub stats: EnrichmentStats,
}

/// Result of an enrichment run
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentReport {
    pub dry_run: bool,
    pub stats: EnrichmentStats,
    pub new_nodes: usize,
    pub new_edges: usize,
    /// First few planned nodes, for inspection
    pub preview_nodes: Vec<Node>,
    pub preview_edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
}

pub struct GraphEnricher {
    config: LexConfig,
}

impl GraphEnricher {
    pub fn new(config: &LexConfig) -> Self {
        Self { config: config.clone() }
    }

    /// Read an entities file: an array of chunk records. Records that do
    /// not parse are skipped with a warning.
    pub fn load_entities_file(path: &Path) -> StorageResult<Vec<ChunkExtraction>> {
        if !path.is_file() {
            return Err(StorageError::SourceNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let items = match serde_json::from_str::<Value>(&text)? {
            Value::Array(items) => items,
            other => vec![other],
        };

        let mut chunks = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<ChunkExtraction>(item) {
                Ok(chunk) => chunks.push(chunk),
                Err(e) => warn!(file = %path.display(), index, error = %e, "skipping malformed entity record"),
            }
        }
        info!(file = %path.display(), chunks = chunks.len(), "loaded entities");
        Ok(chunks)
    }

    /// Run the recognizer over a chunk directory.
    pub fn extract_chunks(&self, dir: &Path) -> StorageResult<Vec<ChunkExtraction>> {
        EntityRecognizer::new(&self.config).extract_chunk_dir(dir)
    }

    /// Work out what `chunks` would add to `graph`, without touching it.
    ///
    /// A chunk's nodes are planned before its edges, so an edge may point
    /// at a node introduced by the same chunk.
    pub fn plan(&self, graph: &Graph, chunks: &[ChunkExtraction]) -> EnrichmentPlan {
        let mut known: HashSet<NodeId> = graph.nodes.keys().cloned().collect();
        let mut edges: HashSet<EdgeKey> = graph.edge_keys();
        let mut plan = EnrichmentPlan::default();

        for chunk in chunks {
            let mentions = node_mentions(chunk);

            for mention in &mentions {
                let id = NodeId::from(mention.normalized_id.as_str());
                if known.contains(&id) {
                    continue;
                }
                if let Some(node) = mention_node(mention) {
                    known.insert(id);
                    plan.stats.record_node(mention.kind);
                    plan.delta.nodes.push(node);
                }
            }

            for (i, first) in mentions.iter().enumerate() {
                for second in &mentions[i + 1..] {
                    if first.normalized_id == second.normalized_id {
                        continue;
                    }
                    let edge_type = cooccurrence_edge_type(first.kind, second.kind);
                    let edge = Edge::new(first.normalized_id.as_str(), second.normalized_id.as_str(), edge_type);
                    if !known.contains(&edge.source) || !known.contains(&edge.target) {
                        warn!(
                            chunk = %chunk.chunk_id,
                            source = %edge.source,
                            target = %edge.target,
                            "rejecting co-occurrence edge with unknown endpoint"
                        );
                        plan.stats.edges_rejected += 1;
                        continue;
                    }
                    if edges.insert(edge.key()) {
                        plan.stats.record_edge(&edge.edge_type);
                        plan.delta.edges.push(edge);
                    }
                }
            }
        }

        debug!(
            nodes = plan.delta.nodes.len(),
            edges = plan.delta.edges.len(),
            rejected = plan.stats.edges_rejected,
            "enrichment planned"
        );
        plan
    }

    /// Load the graph, plan, and unless `dry_run`, back up and write.
    pub fn run(&self, store: &dyn GraphStore, chunks: &[ChunkExtraction], dry_run: bool) -> StorageResult<EnrichmentReport> {
        let graph = store.load()?;
        let EnrichmentPlan { delta, mut stats } = self.plan(&graph, chunks);

        let limit = self.config.preview_limit;
        let mut report = EnrichmentReport {
            dry_run,
            stats: stats.clone(),
            new_nodes: delta.nodes.len(),
            new_edges: delta.edges.len(),
            preview_nodes: delta.nodes.iter().take(limit).cloned().collect(),
            preview_edges: delta.edges.iter().take(limit).cloned().collect(),
            backup: None,
        };
        if dry_run {
            info!(nodes = report.new_nodes, edges = report.new_edges, "dry run, graph not written");
            return Ok(report);
        }

        let backup = store.backup()?;
        let (mut graph, summary) = graph.merge(delta);
        stats.edges_rejected += summary.edges_rejected;
        graph.metadata.enriched_at = Some(timestamp());
        graph.metadata.enrichment_stats = Some(stats.to_map());
        graph.touch();
        store.save(&graph)?;

        info!(
            nodes_added = summary.nodes_added,
            edges_added = summary.edges_added,
            total_nodes = graph.node_count(),
            total_edges = graph.edge_count(),
            "graph enriched"
        );
        report.stats = stats;
        report.new_nodes = summary.nodes_added;
        report.new_edges = summary.edges_added;
        report.backup = Some(backup);
        Ok(report)
    }
}

/// Mentions that can become nodes, grouped by [`pairing_rank`] and in
/// text order within a kind.
fn node_mentions(chunk: &ChunkExtraction) -> Vec<&EntityMention> {
    let mut mentions: Vec<&EntityMention> = chunk
        .entities
        .iter()
        .filter(|m| m.kind.node_type().is_some())
        .filter(|m| {
            let usable = !m.normalized_id.trim().is_empty();
            if !usable {
                warn!(chunk = %chunk.chunk_id, kind = %m.kind, "skipping mention without id");
            }
            usable
        })
        .collect();
    mentions.sort_by_key(|m| (pairing_rank(m.kind), m.start_offset));
    mentions
}

fn mention_node(mention: &EntityMention) -> Option<Node> {
    let node_type = mention.kind.node_type()?;
    let node = Node::new(mention.normalized_id.as_str(), node_type.clone())
        .with_attribute("extracted", true)
        .with_attribute("extraction_context", mention.context_snippet.as_str());

    let tribunal = mention.tribunal.as_deref().unwrap_or(ids::DEFAULT_TRIBUNAL);
    let node = match node_type {
        NodeType::Sumula => with_numero(node, mention)
            .with_attribute("tribunal", tribunal)
            .with_attribute("texto", mention.context_snippet.as_str()),
        NodeType::Tema => with_numero(node, mention)
            .with_attribute("tribunal", tribunal)
            .with_attribute("tese", ""),
        NodeType::Conceito => node.with_attribute("nome", mention.label.as_str()),
        _ => node.with_attribute("value", mention.label.as_str()),
    };
    Some(node)
}

fn with_numero(node: Node, mention: &EntityMention) -> Node {
    match mention.number.as_deref() {
        Some(numero) => node.with_attribute("numero", numero_value(numero)),
        None => node,
    }
}
