//! Core graph data structures

mod document;
mod edge;
pub mod ids;
mod node;
mod validate;


pub use document::{timestamp, today, Graph, GraphDelta, GraphMetadata, GraphStats, MergeSummary};
pub use edge::{Edge, EdgeKey, EdgeType, Properties};
pub use node::{Attributes, Node, NodeId, NodeType};
pub use validate::{validate, validate_document, ValidationFinding};
