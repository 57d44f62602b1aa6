//! lexgraph: a knowledge graph of Brazilian legal entities
//!
//! Súmulas, temas repetitivos, statutory articles, statutes, processes,
//! legal concepts and legal domains, kept in a single JSON graph document.
//!
//! # Components
//!
//! - **Recognizer** ([`recognizer`]): pattern-based extraction of legal
//!   references from free text, with canonical ids.
//! - **Builder** ([`builder`]): the base graph from curated knowledge-base
//!   files plus a fixed article and concept catalog.
//! - **Discoverer** ([`discovery`]): heuristic relationships over an
//!   existing graph; only ever adds edges.
//! - **Enricher** ([`enrich`]): merges recognized mentions into the
//!   persisted graph, idempotently and with a backup first.
//!
//! # Example
//!
//! ```
//! use lexgraph::EntityRecognizer;
//!
//! let entities = EntityRecognizer::default().extract("Aplica-se a Súmula 297 do STJ.");
//! assert_eq!(entities.sumulas[0].normalized_id, "STJ_297");
//! ```

pub mod builder;
pub mod config;
pub mod discovery;
pub mod enrich;
pub mod graph;
pub mod recognizer;
pub mod storage;

pub use builder::{BuildOutput, GraphBuilder, KnowledgeBase};
pub use config::LexConfig;
pub use discovery::{ApplyMode, DiscoveryOutcome, DiscoveryReport, RelationshipDiscoverer};
pub use enrich::{EnrichmentReport, EnrichmentStats, GraphEnricher};
pub use graph::{Edge, EdgeType, Graph, GraphDelta, MergeSummary, Node, NodeId, NodeType, ValidationFinding};
pub use recognizer::{ChunkExtraction, EntityKind, EntityMention, EntityRecognizer, ExtractedEntities};
pub use storage::{GraphStore, JsonGraphStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
