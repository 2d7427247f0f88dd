//! Frame-stepped glide of a freshly added node.

/// Cubic ease-out: fast start, gentle landing. Input is clamped to `0..=1`.
pub fn ease_out_cubic(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	1.0 - (1.0 - t).powi(3)
}

/// Moves one node from `from` to `to` over a fixed number of frames.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementAnimation {
	node_id: String,
	from: (f64, f64),
	to: (f64, f64),
	frame: u32,
	frames: u32,
}

impl PlacementAnimation {
	/// Animation of `node_id` lasting `frames` frames, at least one.
	pub fn new(node_id: impl Into<String>, from: (f64, f64), to: (f64, f64), frames: u32) -> Self {
		Self {
			node_id: node_id.into(),
			from,
			to,
			frame: 0,
			frames: frames.max(1),
		}
	}

	/// The node being moved.
	pub fn node_id(&self) -> &str {
		&self.node_id
	}

	/// Final position.
	pub fn target(&self) -> (f64, f64) {
		self.to
	}

	/// Progress in `0..=1`.
	pub fn progress(&self) -> f64 {
		f64::from(self.frame) / f64::from(self.frames)
	}

	/// True once the last frame has been played.
	pub fn is_finished(&self) -> bool {
		self.frame >= self.frames
	}

	/// Eased position at progress `t`.
	pub fn position_at(&self, t: f64) -> (f64, f64) {
		let eased = ease_out_cubic(t);
		(
			self.from.0 + (self.to.0 - self.from.0) * eased,
			self.from.1 + (self.to.1 - self.from.1) * eased,
		)
	}

	/// Advance one frame and return the new position, or `None` once the
	/// last frame has been played.
	pub fn next_frame(&mut self) -> Option<(f64, f64)> {
		if self.is_finished() {
			return None;
		}
		self.frame += 1;
		if self.is_finished() {
			return Some(self.to);
		}
		Some(self.position_at(self.progress()))
	}
}
