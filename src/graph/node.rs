//! Node representation in the legal knowledge graph

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Unique identifier for a node
///
/// Serializes as a plain string. Ids are derived from identifying fields
/// (see [`super::ids`]), never generated randomly.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a NodeId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Declared node types.
///
/// Documents written by other tools may carry a type outside the declared
/// set; those load as `Unknown` so validation can report them instead of
/// the whole document failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Sumula,
    Tema,
    Dominio,
    Artigo,
    Conceito,
    Lei,
    Processo,
    Unknown(String),
}

impl NodeType {
    /// All declared node types, in document order
    pub const DECLARED: [NodeType; 7] = [
        NodeType::Sumula,
        NodeType::Tema,
        NodeType::Dominio,
        NodeType::Artigo,
        NodeType::Conceito,
        NodeType::Lei,
        NodeType::Processo,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Sumula => "Sumula",
            NodeType::Tema => "Tema",
            NodeType::Dominio => "Dominio",
            NodeType::Artigo => "Artigo",
            NodeType::Conceito => "Conceito",
            NodeType::Lei => "Lei",
            NodeType::Processo => "Processo",
            NodeType::Unknown(s) => s,
        }
    }

    pub fn is_declared(&self) -> bool {
        !matches!(self, NodeType::Unknown(_))
    }
}

impl Default for NodeType {
    fn default() -> Self {
        NodeType::Unknown(String::new())
    }
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Sumula" => NodeType::Sumula,
            "Tema" => NodeType::Tema,
            "Dominio" => NodeType::Dominio,
            "Artigo" => NodeType::Artigo,
            "Conceito" => NodeType::Conceito,
            "Lei" => NodeType::Lei,
            "Processo" => NodeType::Processo,
            _ => NodeType::Unknown(s),
        }
    }
}

impl From<NodeType> for String {
    fn from(t: NodeType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heterogeneous per-type attributes (numbers, text, tag lists)
pub type Attributes = BTreeMap<String, Value>;

/// A node in the knowledge graph
///
/// On disk a node is a flat object: `id`, `type` and every attribute side
/// by side, which is the shape downstream retrieval tooling reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    #[serde(default)]
    pub id: NodeId,
    /// Node type
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    /// Type-specific attributes
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Node {
    /// Create a new node with the given id and type
    pub fn new(id: impl Into<NodeId>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute to the node
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// String attribute, if present and a string
    pub fn text(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// String-list attribute; non-string entries are ignored
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.attributes.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}
