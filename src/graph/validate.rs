//! Consistency checks over a graph document.
//!
//! Validation never fails: it returns findings and leaves the decision to
//! the caller.

use super::document::Graph;
use super::edge::EdgeKey;
use super::node::NodeId;
use std::collections::HashSet;
use std::fmt;

/// A single consistency problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFinding {
    DanglingSource { key: EdgeKey },
    DanglingTarget { key: EdgeKey },
    DuplicateEdge { key: EdgeKey },
    NodeMissingId,
    NodeMissingType { node: NodeId },
    InvalidNodeType { node: NodeId, node_type: String },
    InvalidEdgeType { key: EdgeKey },
    /// Map key and the node's own id disagree
    NodeIdMismatch { key: NodeId, node: NodeId },
    StaleStats,
}

fn fmt_key(key: &EdgeKey) -> String {
    format!("({}, {}, {})", key.0, key.1, key.2)
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFinding::DanglingSource { key } => {
                write!(f, "Dangling edge source: {} in {}", key.0, fmt_key(key))
            }
            ValidationFinding::DanglingTarget { key } => {
                write!(f, "Dangling edge target: {} in {}", key.1, fmt_key(key))
            }
            ValidationFinding::DuplicateEdge { key } => write!(f, "Duplicate edge: {}", fmt_key(key)),
            ValidationFinding::NodeMissingId => write!(f, "Node missing id"),
            ValidationFinding::NodeMissingType { node } => write!(f, "Node missing type: {}", node),
            ValidationFinding::InvalidNodeType { node, node_type } => {
                write!(f, "Invalid node type: {} for {}", node_type, node)
            }
            ValidationFinding::InvalidEdgeType { key } => {
                write!(f, "Invalid edge type: {} in {}", key.2, fmt_key(key))
            }
            ValidationFinding::NodeIdMismatch { key, node } => {
                write!(f, "Node keyed as {} carries id {}", key, node)
            }
            ValidationFinding::StaleStats => write!(f, "Statistics do not match nodes/edges"),
        }
    }
}

/// Check dangling edges, duplicate triples, required node fields and
/// declared types.
pub fn validate(graph: &Graph) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();

    for edge in &graph.edges {
        if !graph.contains_node(&edge.source) {
            findings.push(ValidationFinding::DanglingSource { key: edge.key() });
        }
        if !graph.contains_node(&edge.target) {
            findings.push(ValidationFinding::DanglingTarget { key: edge.key() });
        }
        if !edge.edge_type.is_declared() {
            findings.push(ValidationFinding::InvalidEdgeType { key: edge.key() });
        }
    }

    let mut seen = HashSet::new();
    for edge in &graph.edges {
        let key = edge.key();
        if !seen.insert(key.clone()) {
            findings.push(ValidationFinding::DuplicateEdge { key });
        }
    }

    for (key, node) in &graph.nodes {
        if node.id.is_empty() {
            findings.push(ValidationFinding::NodeMissingId);
            continue;
        }
        if &node.id != key {
            findings.push(ValidationFinding::NodeIdMismatch {
                key: key.clone(),
                node: node.id.clone(),
            });
        }
        if node.node_type.as_str().is_empty() {
            findings.push(ValidationFinding::NodeMissingType { node: node.id.clone() });
        } else if !node.node_type.is_declared() {
            findings.push(ValidationFinding::InvalidNodeType {
                node: node.id.clone(),
                node_type: node.node_type.as_str().to_string(),
            });
        }
    }

    findings
}

/// [`validate`] plus a check that `metadata.stats` matches the collections.
/// Used on persisted documents, where stats may have been edited by hand.
pub fn validate_document(graph: &Graph) -> Vec<ValidationFinding> {
    let mut findings = validate(graph);
    if !graph.stats_are_current() {
        findings.push(ValidationFinding::StaleStats);
    }
    findings
}
