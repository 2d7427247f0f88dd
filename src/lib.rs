//! idea-graph: hierarchical brainstorm idea graph.
//!
//! This crate keeps ideas extracted from a conversation in a typed graph
//! whose PARENT_CHILD edges form a forest, keeps every node's level in sync
//! with its ancestry, and lays the forest out on concentric rings for a
//! force-directed renderer.

use log::info;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod extraction;
pub mod graph;
pub mod settings;
pub mod visualization;

pub use graph::{Edge, GraphConfig, GraphError, GraphStore, NewNode, Node, RelationType};
pub use settings::Settings;
pub use visualization::{GraphData, GraphLink, GraphNode, LayoutConfig, Theme, Visualization};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` overrides the default `info` filter. Later calls are no-ops.
pub fn init_logging() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let installed = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init()
		.is_ok();
	if installed {
		info!("idea-graph: logging initialized");
	}
}
