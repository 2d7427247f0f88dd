//! Live visualization of a graph store.
//!
//! [`Visualization`] owns the projected records, the computed layout and the
//! physics scene. The caller feeds it the store after every change and
//! drives it with [`Visualization::tick`] once per frame.

use std::collections::HashMap;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use super::animation::PlacementAnimation;
use super::layout::{Layout, LayoutConfig};
use super::state::{NodePosition, SceneState};
use super::theme::Theme;
use super::types::GraphData;
use crate::graph::{GraphError, GraphStore, Result};

/// Graph units of empty space kept around the graph by [`Visualization::center`].
const FIT_MARGIN: f64 = 40.0;

const NO_DESCRIPTION: &str = "No description provided";

/// What the details pane shows for a selected node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeDetails {
	/// Node id.
	pub id: String,
	/// Node label.
	pub label: String,
	/// Description, or a placeholder when the node has none.
	pub description: String,
	/// Hierarchy level.
	pub level: usize,
	/// Visual weight.
	pub priority: u32,
}

/// Projection, layout and physics for one graph store.
pub struct Visualization {
	config: LayoutConfig,
	theme: Theme,
	rng: StdRng,
	data: GraphData,
	layout: Layout,
	scene: SceneState,
	animation: Option<PlacementAnimation>,
}

impl Visualization {
	/// Empty visualization with an entropy-seeded angle jitter.
	pub fn new(width: f64, height: f64, config: LayoutConfig, theme: Theme) -> Self {
		Self::with_rng(width, height, config, theme, StdRng::from_entropy())
	}

	/// Empty visualization with reproducible angle jitter.
	pub fn with_seed(
		width: f64,
		height: f64,
		config: LayoutConfig,
		theme: Theme,
		seed: u64,
	) -> Self {
		Self::with_rng(width, height, config, theme, StdRng::seed_from_u64(seed))
	}

	fn with_rng(width: f64, height: f64, config: LayoutConfig, theme: Theme, rng: StdRng) -> Self {
		let scene = SceneState::new(
			&GraphData::default(),
			&Layout::default(),
			&HashMap::new(),
			width,
			height,
			&config.physics,
		);
		Self {
			config,
			theme,
			rng,
			data: GraphData::default(),
			layout: Layout::default(),
			scene,
			animation: None,
		}
	}

	/// Rebuild everything from the store: projection, layout and physics.
	///
	/// Cancels any placement animation in flight and re-enables physics.
	pub fn update_visualization(&mut self, store: &GraphStore) {
		if let Some(animation) = self.animation.take() {
			debug!("cancelled placement animation of {}", animation.node_id());
		}
		self.rebuild(store, &HashMap::new());
		self.scene.physics_enabled = true;
		info!(
			"visualization updated: {} nodes, {} edges",
			self.data.nodes.len(),
			self.data.edges.len()
		);
	}

	/// Recompute the layout and move every scene node to its placement.
	pub fn update_node_positions(&mut self, store: &GraphStore) {
		self.layout = Layout::compute(store, &self.config, &mut self.rng);
		for (id, placement) in self.layout.iter() {
			self.scene.move_node(id, placement.x, placement.y);
			self.scene.set_pinned(id, placement.pinned);
		}
	}

	/// Glide a node from its parent's position to its computed placement.
	///
	/// Physics is suspended until the last frame has been played by
	/// [`tick`](Self::tick). A node the scene does not know yet is added,
	/// keeping the current positions of every other node.
	pub fn animate_new_node(&mut self, store: &GraphStore, node_id: &str) -> Result<()> {
		let node = store
			.get_node(node_id)
			.ok_or_else(|| GraphError::node_not_found(node_id))?;

		let previous: HashMap<String, (f64, f64)> = self
			.scene
			.positions()
			.into_iter()
			.map(|p| (p.id, (p.x, p.y)))
			.collect();
		self.rebuild(store, &previous);
		self.scene.physics_enabled = false;

		let start = node
			.parent_id
			.as_deref()
			.and_then(|parent| self.scene.position(parent))
			.unwrap_or(self.config.anchor);
		let target = self
			.layout
			.get(node_id)
			.map(|p| (p.x, p.y))
			.unwrap_or(self.config.anchor);
		self.scene.move_node(node_id, start.0, start.1);

		debug!("animating {node_id} from {start:?} to {target:?}");
		self.animation = Some(PlacementAnimation::new(
			node_id,
			start,
			target,
			self.config.animation_frames,
		));
		Ok(())
	}

	/// Advance one frame: the placement animation if any, then physics.
	///
	/// When the animation finishes the whole layout is reapplied and
	/// physics resumes.
	pub fn tick(&mut self, store: &GraphStore, dt: f32) {
		if let Some(animation) = self.animation.as_mut() {
			match animation.next_frame() {
				Some((x, y)) => {
					let id = animation.node_id().to_string();
					self.scene.move_node(&id, x, y);
				}
				None => {
					debug!("placement animation of {} finished", animation.node_id());
					self.animation = None;
					self.update_node_positions(store);
					self.scene.physics_enabled = true;
				}
			}
		}
		self.scene.tick(dt);
	}

	/// True while a placement animation is playing.
	pub fn is_animating(&self) -> bool {
		self.animation.is_some()
	}

	/// Fit the whole graph into the viewport.
	pub fn center(&mut self) {
		self.scene.fit(FIT_MARGIN);
	}

	/// Follow a viewport size change.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.scene.resize(width, height);
	}

	/// Details pane content for a node.
	pub fn node_details(&self, store: &GraphStore, node_id: &str) -> Option<NodeDetails> {
		let node = store.get_node(node_id)?;
		let description = if node.description.trim().is_empty() {
			NO_DESCRIPTION.to_string()
		} else {
			node.description.clone()
		};
		Some(NodeDetails {
			id: node.id.clone(),
			label: node.label.clone(),
			description,
			level: node.level,
			priority: node.priority,
		})
	}

	/// Details of the node under a screen position.
	pub fn select_at(&self, store: &GraphStore, sx: f64, sy: f64) -> Option<NodeDetails> {
		let node_id = self.scene.node_at_position(sx, sy)?;
		self.node_details(store, &node_id)
	}

	/// Current scene positions of every node.
	pub fn positions(&self) -> Vec<NodePosition> {
		self.scene.positions()
	}

	/// Records from the last projection.
	pub fn data(&self) -> &GraphData {
		&self.data
	}

	/// Placements from the last layout pass.
	pub fn layout(&self) -> &Layout {
		&self.layout
	}

	/// The physics scene.
	pub fn scene(&self) -> &SceneState {
		&self.scene
	}

	/// Theme used for projection.
	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	/// Layout and animation parameters.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	fn rebuild(&mut self, store: &GraphStore, previous: &HashMap<String, (f64, f64)>) {
		self.data = store.vis_network_data_with(&self.theme);
		self.layout = Layout::compute(store, &self.config, &mut self.rng);
		let (width, height) = (self.scene.width, self.scene.height);
		self.scene = SceneState::new(
			&self.data,
			&self.layout,
			previous,
			width,
			height,
			&self.config.physics,
		);
	}
}
