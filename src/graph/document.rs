//! The graph document: nodes keyed by id, an ordered edge list, metadata.
//!
//! Graphs are transformed by value: [`Graph::merge`] takes the old graph and
//! a [`GraphDelta`] and returns the new graph, leaving reads and writes of
//! the document to the storage layer.

use super::edge::{Edge, EdgeKey, EdgeType};
use super::node::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

pub const GRAPH_VERSION: &str = "1.0.0";
pub const GRAPH_DESCRIPTION: &str = "Legal Knowledge Graph for Brazilian Judicial System";

/// Today's date as written in `created` / `lastUpdate`.
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Local date-time for run stamps, e.g. `2024-05-01T10:22:03.123456`.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Counts derived from nodes and edges. Never patched incrementally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub nodes_by_type: BTreeMap<String, usize>,
    pub edges_by_type: BTreeMap<String, usize>,
}

impl GraphStats {
    pub fn compute<'a>(
        nodes: impl IntoIterator<Item = &'a Node>,
        edges: impl IntoIterator<Item = &'a Edge>,
    ) -> Self {
        let mut stats = GraphStats::default();
        for node in nodes {
            stats.total_nodes += 1;
            *stats
                .nodes_by_type
                .entry(node.node_type.as_str().to_string())
                .or_insert(0) += 1;
        }
        for edge in edges {
            stats.total_edges += 1;
            *stats
                .edges_by_type
                .entry(edge.edge_type.as_str().to_string())
                .or_insert(0) += 1;
        }
        stats
    }
}

/// Outcome of merging a delta into a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    pub nodes_added: usize,
    pub edges_added: usize,
    /// Edges dropped because an endpoint did not exist
    #[serde(default)]
    pub edges_rejected: usize,
    /// Edges dropped because their triple was already present
    #[serde(default)]
    pub edges_duplicate: usize,
}

/// Graph-level metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphMetadata {
    pub version: String,
    pub created: String,
    pub last_update: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub node_types: Vec<String>,
    pub edge_types: Vec<String>,
    pub stats: GraphStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enriched_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment_stats: Option<BTreeMap<String, usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships_discovered_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships_added: Option<usize>,
    /// Keys written by other tools, carried through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for GraphMetadata {
    fn default() -> Self {
        let today = today();
        Self {
            version: GRAPH_VERSION.to_string(),
            created: today.clone(),
            last_update: today,
            description: Some(GRAPH_DESCRIPTION.to_string()),
            node_types: NodeType::DECLARED.iter().map(|t| t.as_str().to_string()).collect(),
            edge_types: EdgeType::DECLARED.iter().map(|t| t.as_str().to_string()).collect(),
            stats: GraphStats::default(),
            enriched_at: None,
            enrichment_stats: None,
            relationships_discovered_at: None,
            relationships_added: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Nodes and edges proposed for insertion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphDelta {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// The persisted knowledge graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub metadata: GraphMetadata,
    /// Nodes keyed by id; written as a sequence
    #[serde(default, with = "node_sequence")]
    pub nodes: BTreeMap<NodeId, Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes of one type, in id order
    pub fn nodes_of_type<'a>(&'a self, node_type: &'a NodeType) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.values().filter(move |n| &n.node_type == node_type)
    }

    /// The set of (source, target, type) triples currently present
    pub fn edge_keys(&self) -> HashSet<EdgeKey> {
        self.edges.iter().map(Edge::key).collect()
    }

    pub fn has_edge(&self, source: &NodeId, target: &NodeId, edge_type: &EdgeType) -> bool {
        self.edges
            .iter()
            .any(|e| &e.source == source && &e.target == target && &e.edge_type == edge_type)
    }

    pub fn compute_stats(&self) -> GraphStats {
        GraphStats::compute(self.nodes.values(), self.edges.iter())
    }

    /// Recompute `metadata.stats` from the current collections
    pub fn recompute_stats(&mut self) {
        self.metadata.stats = self.compute_stats();
    }

    pub fn stats_are_current(&self) -> bool {
        self.metadata.stats == self.compute_stats()
    }

    pub fn touch(&mut self) {
        self.metadata.last_update = today();
    }

    /// Merge a delta into the graph.
    ///
    /// Nodes whose id already exists are skipped, never overwritten. An edge
    /// is inserted only if both endpoints exist at that point (including
    /// nodes added earlier in the same delta) and its triple is new.
    /// Statistics are recomputed from the merged collections.
    pub fn merge(mut self, delta: GraphDelta) -> (Graph, MergeSummary) {
        let mut summary = MergeSummary::default();

        for node in delta.nodes {
            if node.id.is_empty() || self.nodes.contains_key(&node.id) {
                continue;
            }
            self.nodes.insert(node.id.clone(), node);
            summary.nodes_added += 1;
        }

        let mut keys = self.edge_keys();
        for edge in delta.edges {
            if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
                warn!(
                    source = %edge.source,
                    target = %edge.target,
                    edge_type = %edge.edge_type,
                    "dropping edge with unknown endpoint"
                );
                summary.edges_rejected += 1;
                continue;
            }
            if !keys.insert(edge.key()) {
                summary.edges_duplicate += 1;
                continue;
            }
            self.edges.push(edge);
            summary.edges_added += 1;
        }

        self.recompute_stats();
        (self, summary)
    }
}

mod node_sequence {
    use super::{Node, NodeId};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::btree_map::Entry;
    use std::collections::BTreeMap;
    use tracing::warn;

    pub fn serialize<S: Serializer>(nodes: &BTreeMap<NodeId, Node>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(nodes.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<NodeId, Node>, D::Error> {
        let nodes = Vec::<Node>::deserialize(deserializer)?;
        let mut by_id = BTreeMap::new();
        for node in nodes {
            match by_id.entry(node.id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
                Entry::Occupied(_) => {
                    warn!(id = %node.id, "duplicate node id in graph document, keeping first");
                }
            }
        }
        Ok(by_id)
    }
}
