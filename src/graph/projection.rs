//! Read-only projection of graph entities into renderer records.

use crate::visualization::{GraphData, GraphLink, GraphNode, Theme};

use super::store::GraphStore;
use super::types::{Edge, Node, RelationType};

impl Node {
	/// Project into a renderer vertex.
	///
	/// Colour is the explicit node colour when set, otherwise the level hue.
	pub fn to_vis_node(&self, theme: &Theme) -> GraphNode {
		let color = self
			.colour
			.clone()
			.unwrap_or_else(|| theme.levels.color_for(self.level).to_css());
		GraphNode {
			id: self.id.clone(),
			label: self.label.clone(),
			level: self.level,
			color,
			size: f64::from(self.priority) * theme.node_size_per_priority,
		}
	}
}

impl Edge {
	/// Project into a renderer edge.
	pub fn to_vis_edge(&self, theme: &Theme) -> GraphLink {
		let color = match self.relation {
			RelationType::Contradicts => theme.edge.conflict,
			_ => theme.edge.neutral,
		};
		GraphLink {
			id: self.id.clone(),
			from: self.source.clone(),
			to: self.target.clone(),
			width: self.strength * theme.edge_width_per_strength,
			dashes: !self.relation.is_hierarchical(),
			color: color.to_css(),
		}
	}
}

impl GraphStore {
	/// Project every node and edge with the default theme.
	pub fn vis_network_data(&self) -> GraphData {
		self.vis_network_data_with(&Theme::default())
	}

	/// Project every node and edge, in insertion order.
	pub fn vis_network_data_with(&self, theme: &Theme) -> GraphData {
		GraphData {
			nodes: self.nodes().map(|n| n.to_vis_node(theme)).collect(),
			edges: self.edges().map(|e| e.to_vis_edge(theme)).collect(),
		}
	}
}
