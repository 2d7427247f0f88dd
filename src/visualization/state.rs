//! Physics scene state.
//!
//! Wraps the `force_graph` simulation with per-node display metadata and a
//! pan/zoom view transform. Nodes are seeded from a [`Layout`], roots are
//! anchored so the simulation never drags them away, and the simulation can
//! be suspended while a node is animated into place.

use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use serde::{Deserialize, Serialize};

use super::layout::Layout;
use super::types::GraphData;

/// Force simulation knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
	/// Repulsion between every pair of nodes.
	pub force_charge: f32,
	/// Pull along each link.
	pub force_spring: f32,
	/// Cap on the force applied to one node per step.
	pub force_max: f32,
	/// Velocity scale.
	pub node_speed: f32,
	/// Velocity kept between steps.
	pub damping_factor: f32,
	/// Mass given to every node.
	pub node_mass: f32,
}

impl Default for PhysicsConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			node_mass: 10.0,
		}
	}
}

impl PhysicsConfig {
	fn parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

/// Per-node display metadata attached to each node in the simulation.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	/// Store id of the node.
	pub id: String,
	/// Display label.
	pub label: String,
	/// CSS fill colour.
	pub color: String,
	/// Rendered radius in graph units.
	pub size: f64,
	/// Hierarchy level.
	pub level: usize,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ViewTransform {
	/// Horizontal pan, in screen pixels.
	pub x: f64,
	/// Vertical pan, in screen pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

impl ViewTransform {
	fn centered(width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
		}
	}
}

/// Current position of a node in graph coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodePosition {
	/// Store id of the node.
	pub id: String,
	/// Horizontal graph coordinate.
	pub x: f64,
	/// Vertical graph coordinate.
	pub y: f64,
	/// Anchored in the simulation.
	pub pinned: bool,
}

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;
/// Smallest clickable radius, in graph units.
const MIN_HIT_RADIUS: f64 = 4.0;

/// Physics simulation plus view state for one projected graph.
pub struct SceneState {
	/// The force simulation.
	pub graph: ForceGraph<NodeInfo, ()>,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	/// Viewport width in pixels.
	pub width: f64,
	/// Viewport height in pixels.
	pub height: f64,
	/// When false, [`tick`](Self::tick) leaves every node where it is.
	pub physics_enabled: bool,
	id_to_idx: HashMap<String, DefaultNodeIdx>,
	link_count: usize,
}

impl SceneState {
	/// Build a scene for `data`.
	///
	/// A node starts at its entry in `previous` when present, otherwise at
	/// its layout placement. Pinned placements always win so roots stay on
	/// the anchor.
	pub fn new(
		data: &GraphData,
		layout: &Layout,
		previous: &HashMap<String, (f64, f64)>,
		width: f64,
		height: f64,
		physics: &PhysicsConfig,
	) -> Self {
		let mut graph = ForceGraph::new(physics.parameters());
		let mut id_to_idx = HashMap::new();

		for node in &data.nodes {
			let placement = layout.get(&node.id);
			let pinned = placement.is_some_and(|p| p.pinned);
			let (x, y) = match (placement, previous.get(&node.id)) {
				(Some(p), _) if p.pinned => (p.x, p.y),
				(_, Some(&position)) => position,
				(Some(p), None) => (p.x, p.y),
				(None, None) => (0.0, 0.0),
			};
			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: physics.node_mass,
				is_anchor: pinned,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					color: node.color.clone(),
					size: node.size,
					level: node.level,
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		let mut link_count = 0;
		for link in &data.edges {
			let endpoints = (id_to_idx.get(&link.from), id_to_idx.get(&link.to));
			if let (Some(&src), Some(&tgt)) = endpoints {
				graph.add_edge(src, tgt, EdgeData::default());
				link_count += 1;
			}
		}

		Self {
			graph,
			transform: ViewTransform::centered(width, height),
			width,
			height,
			physics_enabled: true,
			id_to_idx,
			link_count,
		}
	}

	/// True when the scene has a node with this id.
	pub fn contains(&self, node_id: &str) -> bool {
		self.id_to_idx.contains_key(node_id)
	}

	/// Number of simulated nodes.
	pub fn node_count(&self) -> usize {
		self.id_to_idx.len()
	}

	/// Links whose endpoints both made it into the scene.
	pub fn link_count(&self) -> usize {
		self.link_count
	}

	/// Position of a node in graph coordinates.
	pub fn position(&self, node_id: &str) -> Option<(f64, f64)> {
		let idx = *self.id_to_idx.get(node_id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	/// Positions of every node, in simulation order.
	pub fn positions(&self) -> Vec<NodePosition> {
		let mut positions = Vec::with_capacity(self.id_to_idx.len());
		self.graph.visit_nodes(|node| {
			positions.push(NodePosition {
				id: node.data.user_data.id.clone(),
				x: node.x() as f64,
				y: node.y() as f64,
				pinned: node.data.is_anchor,
			});
		});
		positions
	}

	/// Move a node. Returns false for unknown ids.
	pub fn move_node(&mut self, node_id: &str, x: f64, y: f64) -> bool {
		let Some(&idx) = self.id_to_idx.get(node_id) else {
			return false;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = x as f32;
				node.data.y = y as f32;
			}
		});
		true
	}

	/// Pin or release a node. Returns false for unknown ids.
	pub fn set_pinned(&mut self, node_id: &str, pinned: bool) -> bool {
		let Some(&idx) = self.id_to_idx.get(node_id) else {
			return false;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = pinned;
			}
		});
		true
	}

	/// Convert a screen position to graph coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Convert graph coordinates to a screen position.
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	/// Id of the node under a screen position, if any.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let hit_radius = node.data.user_data.size.max(MIN_HIT_RADIUS);
			if (dx * dx + dy * dy).sqrt() < hit_radius {
				found = Some(node.data.user_data.id.clone());
			}
		});
		found
	}

	/// Zoom and pan so every node fits the viewport with `margin` graph
	/// units to spare on each side.
	pub fn fit(&mut self, margin: f64) {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			bounds = Some(match bounds {
				None => (x, y, x, y),
				Some((min_x, min_y, max_x, max_y)) => {
					(min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
				}
			});
		});
		let Some((min_x, min_y, max_x, max_y)) = bounds else {
			self.transform = ViewTransform::centered(self.width, self.height);
			return;
		};

		let margin = margin.max(1.0);
		let span_x = max_x - min_x + 2.0 * margin;
		let span_y = max_y - min_y + 2.0 * margin;
		let k = (self.width / span_x)
			.min(self.height / span_y)
			.clamp(MIN_ZOOM, MAX_ZOOM);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	/// Advance the simulation unless physics is suspended.
	pub fn tick(&mut self, dt: f32) {
		if self.physics_enabled {
			self.graph.update(dt);
		}
	}

	/// Record a new viewport size. The transform is left alone.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
