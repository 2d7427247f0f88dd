//! Polar placement of the idea hierarchy.
//!
//! Roots sit pinned on the anchor. Every other node lands on a ring whose
//! radius grows with its level and widens for crowded sibling groups.
//! Children of a root share the full circle evenly; deeper nodes follow
//! their parent's direction with a small random offset. The result is only a
//! starting point: the physics simulation relaxes it afterwards.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::PhysicsConfig;
use crate::graph::{GraphStore, Node};

/// Placement and animation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Ring radius of level 1.
	pub base_radius: f64,
	/// Radius multiplier per additional level.
	pub radius_growth: f64,
	/// Weight of `log2(sibling_count)` in the crowding multiplier.
	pub degree_factor: f64,
	/// Maximum angular offset, in radians, of a node from its parent's
	/// direction.
	pub angle_jitter: f64,
	/// Where roots are pinned.
	pub anchor: (f64, f64),
	/// Frames played when a new node glides into place.
	pub animation_frames: u32,
	/// Force simulation parameters for the scene.
	pub physics: PhysicsConfig,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			base_radius: 150.0,
			radius_growth: 1.5,
			degree_factor: 0.5,
			angle_jitter: 0.2 * PI,
			anchor: (0.0, 0.0),
			animation_frames: 20,
			physics: PhysicsConfig::default(),
		}
	}
}

impl LayoutConfig {
	/// Ring radius for a node at `level` with `sibling_count` siblings
	/// (itself included). Roots have radius 0.
	pub fn radius_for(&self, level: usize, sibling_count: usize) -> f64 {
		if level == 0 {
			return 0.0;
		}
		let exponent = i32::try_from(level - 1).unwrap_or(i32::MAX);
		self.base_radius
			* self.radius_growth.powi(exponent)
			* degree_multiplier(sibling_count, self.degree_factor)
	}
}

/// Spread factor for a sibling group: `max(1, log2(count) * factor)`.
pub fn degree_multiplier(sibling_count: usize, factor: f64) -> f64 {
	if sibling_count == 0 {
		return 1.0;
	}
	((sibling_count as f64).log2() * factor).max(1.0)
}

/// Target position of one node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Placement {
	/// Horizontal graph coordinate.
	pub x: f64,
	/// Vertical graph coordinate.
	pub y: f64,
	/// Direction from the anchor, in radians.
	pub angle: f64,
	/// Distance from the anchor.
	pub radius: f64,
	/// Held in place by the physics simulation.
	pub pinned: bool,
}

impl Placement {
	fn pinned(anchor: (f64, f64)) -> Self {
		Self {
			x: anchor.0,
			y: anchor.1,
			angle: 0.0,
			radius: 0.0,
			pinned: true,
		}
	}

	fn polar(anchor: (f64, f64), angle: f64, radius: f64) -> Self {
		Self {
			x: anchor.0 + radius * angle.cos(),
			y: anchor.1 + radius * angle.sin(),
			angle,
			radius,
			pinned: false,
		}
	}
}

/// Placements for every node of a graph snapshot.
#[derive(Clone, Debug, Default)]
pub struct Layout {
	placements: HashMap<String, Placement>,
}

impl Layout {
	/// Place every node of `store`.
	///
	/// Nodes are visited by ascending level so a parent is always placed
	/// before its children. Sibling order follows node insertion order.
	pub fn compute<R: Rng + ?Sized>(
		store: &GraphStore,
		config: &LayoutConfig,
		rng: &mut R,
	) -> Self {
		let mut siblings: HashMap<&str, Vec<&str>> = HashMap::new();
		for node in store.nodes() {
			if let Some(parent_id) = node.parent_id.as_deref() {
				siblings
					.entry(parent_id)
					.or_default()
					.push(node.id.as_str());
			}
		}

		let mut order: Vec<&Node> = store.nodes().collect();
		order.sort_by_key(|n| n.level);

		let jitter = config.angle_jitter.abs();
		let mut placements: HashMap<String, Placement> = HashMap::with_capacity(order.len());
		for node in order {
			let Some(parent_id) = node.parent_id.as_deref() else {
				placements.insert(node.id.clone(), Placement::pinned(config.anchor));
				continue;
			};
			let group = siblings.get(parent_id).map(Vec::as_slice).unwrap_or(&[]);
			let count = group.len().max(1);
			let radius = config.radius_for(node.level.max(1), count);

			let angle = match store.get_node(parent_id) {
				Some(parent) if parent.is_root() => {
					let index = group.iter().position(|id| *id == node.id).unwrap_or(0);
					index as f64 / count as f64 * TAU
				}
				Some(_) => match placements.get(parent_id) {
					Some(parent) => parent.angle + rng.gen_range(-jitter..=jitter),
					None => rng.gen_range(0.0..TAU),
				},
				None => rng.gen_range(0.0..TAU),
			};
			placements.insert(
				node.id.clone(),
				Placement::polar(config.anchor, angle, radius),
			);
		}

		debug!("laid out {} nodes", placements.len());
		Self { placements }
	}

	/// Placement of one node.
	pub fn get(&self, node_id: &str) -> Option<&Placement> {
		self.placements.get(node_id)
	}

	/// Every placement, in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Placement)> {
		self.placements.iter().map(|(id, p)| (id.as_str(), p))
	}

	/// Number of placed nodes.
	pub fn len(&self) -> usize {
		self.placements.len()
	}

	/// True when nothing was placed.
	pub fn is_empty(&self) -> bool {
		self.placements.is_empty()
	}
}
