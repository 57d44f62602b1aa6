//! Directed, typed edges between legal entities

use super::node::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared edge types
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeType {
    Governs,
    Cites,
    Modifies,
    AppliesTo,
    Requires,
    RelatedTo,
    Unknown(String),
}

impl EdgeType {
    pub const DECLARED: [EdgeType; 6] = [
        EdgeType::Governs,
        EdgeType::Cites,
        EdgeType::Modifies,
        EdgeType::AppliesTo,
        EdgeType::Requires,
        EdgeType::RelatedTo,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EdgeType::Governs => "GOVERNS",
            EdgeType::Cites => "CITES",
            EdgeType::Modifies => "MODIFIES",
            EdgeType::AppliesTo => "APPLIES_TO",
            EdgeType::Requires => "REQUIRES",
            EdgeType::RelatedTo => "RELATED_TO",
            EdgeType::Unknown(s) => s,
        }
    }

    pub fn is_declared(&self) -> bool {
        !matches!(self, EdgeType::Unknown(_))
    }
}

impl Default for EdgeType {
    fn default() -> Self {
        EdgeType::Unknown(String::new())
    }
}

impl From<String> for EdgeType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "GOVERNS" => EdgeType::Governs,
            "CITES" => EdgeType::Cites,
            "MODIFIES" => EdgeType::Modifies,
            "APPLIES_TO" => EdgeType::AppliesTo,
            "REQUIRES" => EdgeType::Requires,
            "RELATED_TO" => EdgeType::RelatedTo,
            _ => EdgeType::Unknown(s),
        }
    }
}

impl From<EdgeType> for String {
    fn from(t: EdgeType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge properties
pub type Properties = BTreeMap<String, Value>;

/// The identity of an edge: no two edges in a graph share one.
pub type EdgeKey = (NodeId, NodeId, EdgeType);

/// A directed edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
    /// Relationship type
    #[serde(rename = "type", default)]
    pub edge_type: EdgeType,
    /// Additional properties
    #[serde(default)]
    pub properties: Properties,
}

impl Edge {
    /// Create a new edge
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, edge_type: EdgeType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            edge_type,
            properties: BTreeMap::new(),
        }
    }

    /// Add a property to the edge
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn key(&self) -> EdgeKey {
        (self.source.clone(), self.target.clone(), self.edge_type.clone())
    }

    /// String property, if present and a string
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}
