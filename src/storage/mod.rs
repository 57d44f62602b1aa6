//! Persistence for the graph document and the JSON reports around it
//!
//! The graph lives in a single JSON document. Writes go to a sibling temp
//! file and are renamed into place; updates back the document up first.

mod json;
mod traits;

pub use json::{read_json, write_json_atomic, JsonGraphStore};
pub use traits::{GraphStore, StorageError, StorageResult};
