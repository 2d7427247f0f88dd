//! Renderer-facing records produced by projecting the graph store.

use serde::{Deserialize, Serialize};

/// A vertex as the rendering layer consumes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Text drawn next to the node.
	pub label: String,
	/// Hierarchy depth; 0 for roots.
	pub level: usize,
	/// CSS color, either the explicit node colour or the level hue.
	pub color: String,
	/// Rendered size, derived from priority.
	pub size: f64,
}

/// A directed edge between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Store id of the edge.
	pub id: String,
	/// Source node ID.
	pub from: String,
	/// Target node ID.
	pub to: String,
	/// Line width, derived from strength.
	pub width: f64,
	/// Dashed for every non-hierarchical relation.
	pub dashes: bool,
	/// CSS stroke colour.
	pub color: String,
}

/// Complete graph data: nodes and edges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// Nodes in store insertion order.
	pub nodes: Vec<GraphNode>,
	/// Edges in store insertion order.
	pub edges: Vec<GraphLink>,
}
