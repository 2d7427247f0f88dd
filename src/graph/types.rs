//! Idea graph entities.
//!
//! Nodes and edges are passive records. Construction never fails; every
//! validation rule lives in [`GraphStore`](super::GraphStore).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of relation an edge expresses.
///
/// Only [`RelationType::ParentChild`] affects the hierarchy; the other kinds
/// are annotations drawn as dashed lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
	/// Source is the parent of target.
	#[default]
	ParentChild,
	/// Loose association between two ideas.
	Related,
	/// Source supports target.
	Supports,
	/// Source contradicts target.
	Contradicts,
}

impl RelationType {
	/// True when the relation defines hierarchy.
	pub fn is_hierarchical(self) -> bool {
		self == RelationType::ParentChild
	}

	/// Stable wire name.
	pub fn name(self) -> &'static str {
		match self {
			RelationType::ParentChild => "parent_child",
			RelationType::Related => "related",
			RelationType::Supports => "supports",
			RelationType::Contradicts => "contradicts",
		}
	}
}

/// Bookkeeping attached to every node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
	/// Creation instant.
	pub created: DateTime<Utc>,
	/// Refreshed by every mutation of the node.
	pub last_updated: DateTime<Utc>,
	/// Extraction confidence in `0.0..=1.0`, when the idea came from a model.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub confidence: Option<f64>,
	/// How often the idea was mentioned.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub frequency: Option<u32>,
}

impl NodeMetadata {
	pub(crate) fn fresh(now: DateTime<Utc>) -> Self {
		Self {
			created: now,
			last_updated: now,
			confidence: None,
			frequency: None,
		}
	}
}

/// An idea in the brainstorm graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	/// Unique within the store.
	pub id: String,
	/// Short title, never blank.
	pub label: String,
	/// Free-form explanation, may be empty.
	pub description: String,
	/// Opaque grouping key of the owning session.
	pub session_id: Option<String>,
	/// `None` means the node is a root.
	pub parent_id: Option<String>,
	/// Hop distance to the nearest root. Maintained by the store.
	pub level: usize,
	/// Visual weight, always at least 1.
	pub priority: u32,
	/// Explicit colour override; when unset the projection colours by level.
	pub colour: Option<String>,
	/// Chat messages this idea was extracted from.
	#[serde(default)]
	pub message_ids: Vec<String>,
	/// Cached ids of PARENT_CHILD targets.
	#[serde(default)]
	pub children: BTreeSet<String>,
	/// Timestamps and extraction scores.
	pub metadata: NodeMetadata,
}

impl Node {
	/// True when the node has no parent.
	pub fn is_root(&self) -> bool {
		self.parent_id.is_none()
	}

	pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
		self.metadata.last_updated = now;
	}
}

/// Timestamps attached to every edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMetadata {
	/// Creation instant.
	pub created: DateTime<Utc>,
	/// Last change to the edge.
	pub last_updated: DateTime<Utc>,
}

/// A typed, directed relation between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	/// Freshly generated; several edges may join the same pair.
	pub id: String,
	/// Session of the source node.
	pub session_id: Option<String>,
	/// Id of the node the edge starts at; the parent for PARENT_CHILD.
	pub source: String,
	/// Id of the node the edge points to.
	pub target: String,
	/// Relation kind, `type` on the wire.
	#[serde(rename = "type")]
	pub relation: RelationType,
	/// Positive weight, drives the rendered line width.
	pub strength: f64,
	/// Timestamps.
	pub metadata: EdgeMetadata,
}

impl Edge {
	/// True when this edge touches `node_id` at either end.
	pub fn touches(&self, node_id: &str) -> bool {
		self.source == node_id || self.target == node_id
	}
}

/// Fields accepted by [`GraphStore::add_node`](super::GraphStore::add_node).
///
/// Only `label` is required. Build with [`NewNode::new`] and the `with_*`
/// helpers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewNode {
	/// Caller-chosen id; a fresh one is generated when `None`.
	pub id: Option<String>,
	/// Required, must not be blank.
	pub label: String,
	/// Optional explanation.
	pub description: String,
	/// Falls back to the store's configured session.
	pub session_id: Option<String>,
	/// Existing node to attach under with a PARENT_CHILD edge.
	pub parent_id: Option<String>,
	/// Defaults to 1.
	pub priority: Option<u32>,
	/// Explicit colour override.
	pub colour: Option<String>,
	/// Source chat messages.
	pub message_ids: Vec<String>,
	/// Extraction confidence in `0.0..=1.0`.
	pub confidence: Option<f64>,
	/// Mention count.
	pub frequency: Option<u32>,
}

impl NewNode {
	/// Start a node with the given label.
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			..Self::default()
		}
	}

	/// Use a caller-chosen id.
	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	/// Set the description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	/// Stamp an explicit session.
	pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
		self.session_id = Some(session_id.into());
		self
	}

	/// Attach under an existing node.
	pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
		self.parent_id = Some(parent_id.into());
		self
	}

	/// Set the visual weight.
	pub fn with_priority(mut self, priority: u32) -> Self {
		self.priority = Some(priority);
		self
	}

	/// Override the level colour.
	pub fn with_colour(mut self, colour: impl Into<String>) -> Self {
		self.colour = Some(colour.into());
		self
	}

	/// Record a source chat message.
	pub fn with_message(mut self, message_id: impl Into<String>) -> Self {
		self.message_ids.push(message_id.into());
		self
	}

	/// Record the extraction confidence.
	pub fn with_confidence(mut self, confidence: f64) -> Self {
		self.confidence = Some(confidence);
		self
	}
}

/// In-place changes accepted by
/// [`GraphStore::update_node`](super::GraphStore::update_node).
///
/// Structural fields (parent, level, children) cannot be changed this way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeUpdate {
	/// New label, must not be blank.
	pub label: Option<String>,
	/// New description.
	pub description: Option<String>,
	/// New priority, at least 1.
	pub priority: Option<u32>,
	/// `Some(None)` clears an explicit colour.
	pub colour: Option<Option<String>>,
	/// New confidence in `0.0..=1.0`.
	pub confidence: Option<f64>,
	/// New mention count.
	pub frequency: Option<u32>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn relation_type_wire_names() {
		let json = serde_json::to_string(&RelationType::ParentChild).unwrap();
		assert_eq!(json, "\"parent_child\"");
		let parsed: RelationType = serde_json::from_str("\"contradicts\"").unwrap();
		assert_eq!(parsed, RelationType::Contradicts);
		assert_eq!(RelationType::Supports.name(), "supports");
	}

	#[test]
	fn only_parent_child_is_hierarchical() {
		assert!(RelationType::ParentChild.is_hierarchical());
		assert!(!RelationType::Related.is_hierarchical());
		assert!(!RelationType::Supports.is_hierarchical());
		assert!(!RelationType::Contradicts.is_hierarchical());
	}

	#[test]
	fn new_node_builder() {
		let fields = NewNode::new("Idea")
			.with_description("text")
			.with_parent("p")
			.with_priority(3)
			.with_message("m1");
		assert_eq!(fields.label, "Idea");
		assert_eq!(fields.description, "text");
		assert_eq!(fields.parent_id.as_deref(), Some("p"));
		assert_eq!(fields.priority, Some(3));
		assert_eq!(fields.message_ids, vec!["m1".to_string()]);
		assert!(fields.id.is_none());
	}
}
