//! Graph store behaviour knobs.

use serde::{Deserialize, Serialize};

/// Identifier of the distinguished root record in bulk documents.
pub const ROOT_ID: &str = "1";

/// Configuration for a [`GraphStore`](super::GraphStore).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Refresh `last_updated` on both endpoints when an edge is inserted.
	pub touch_endpoints_on_edge: bool,
	/// Longest parent chain accepted before a chain is treated as cyclic.
	pub max_depth: usize,
	/// Session stamped on nodes that do not name one.
	pub session_id: Option<String>,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			touch_endpoints_on_edge: true,
			max_depth: 10_000,
			session_id: None,
		}
	}
}
