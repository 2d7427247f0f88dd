//! Hierarchical idea graph.
//!
//! - [`GraphStore`] owns nodes, typed edges and the root set, and keeps
//!   every node's level equal to its parent's plus one
//! - Bulk construction from the upstream `{ nodes, edges }` document
//! - Read-only projection into renderer records
//!
//! # Example
//!
//! ```
//! use idea_graph::graph::{GraphStore, NewNode, RelationType};
//!
//! let mut store = GraphStore::new();
//! let root = store.add_node(NewNode::new("Launch plan")).unwrap();
//! let child = store.add_node(NewNode::new("Marketing")).unwrap();
//! store
//!     .add_edge(&root.id, &child.id, RelationType::ParentChild, 1.0)
//!     .unwrap();
//!
//! assert_eq!(store.get_node(&child.id).unwrap().level, 1);
//! ```

mod config;
mod document;
mod error;
mod projection;
mod store;
mod types;

pub use config::{GraphConfig, ROOT_ID};
pub use document::{DocumentEdge, DocumentNode, GraphDocument};
pub use error::{EntityKind, GraphError, Result};
pub use store::GraphStore;
pub use types::{Edge, EdgeMetadata, NewNode, Node, NodeMetadata, NodeUpdate, RelationType};
