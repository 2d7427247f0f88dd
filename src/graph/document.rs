//! Bulk graph documents.
//!
//! The upstream idea producer emits `{ nodes: [...], edges: [...] }` with
//! numeric or string ids and `destination` instead of `target` on edges.
//! Construction replaces the whole store and is atomic: the new graph is
//! built on the side and swapped in only when every record applied.

use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::config::ROOT_ID;
use super::error::{GraphError, Result};
use super::store::GraphStore;
use super::types::{NewNode, RelationType};

/// A complete bulk document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
	/// Inserted first, in order.
	pub nodes: Vec<DocumentNode>,
	/// Inserted after every node, in order.
	pub edges: Vec<DocumentEdge>,
}

/// Node record of a bulk document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
	/// Numeric or string id.
	#[serde(deserialize_with = "de_id")]
	pub id: String,
	/// Node label.
	#[serde(default)]
	pub label: String,
	/// Node description.
	#[serde(default)]
	pub description: String,
	/// Parent hint, applied only when no edge parents the node.
	#[serde(
		default,
		deserialize_with = "de_opt_id",
		skip_serializing_if = "Option::is_none"
	)]
	pub parent_id: Option<String>,
	/// Defaults to 1.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub priority: Option<u32>,
}

/// Edge record of a bulk document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentEdge {
	/// Parent side for PARENT_CHILD edges.
	#[serde(deserialize_with = "de_id")]
	pub source: String,
	/// Target node id.
	#[serde(deserialize_with = "de_id")]
	pub destination: String,
	/// Defaults to PARENT_CHILD.
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub relation: Option<RelationType>,
	/// Defaults to 1.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub strength: Option<f64>,
}

impl DocumentEdge {
	/// A PARENT_CHILD edge with default strength.
	pub fn parent_child(source: impl Into<String>, destination: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			destination: destination.into(),
			relation: None,
			strength: None,
		}
	}
}

/// Ids arrive as JSON numbers from some producers and strings from others.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Text(String),
	Number(serde_json::Number),
}

impl From<RawId> for String {
	fn from(raw: RawId) -> Self {
		match raw {
			RawId::Text(text) => text,
			RawId::Number(number) => number.to_string(),
		}
	}
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
	RawId::deserialize(deserializer).map(String::from)
}

fn de_opt_id<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
	Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

impl GraphStore {
	/// Replace the graph with the contents of a JSON document.
	pub fn construct_from_json(&mut self, json: &str) -> Result<()> {
		let value: Value = serde_json::from_str(json)
			.map_err(|e| GraphError::validation(format!("bulk document is not valid JSON: {e}")))?;
		self.construct_from_value(value)
	}

	/// Replace the graph with the contents of an already parsed document.
	pub fn construct_from_value(&mut self, data: Value) -> Result<()> {
		let shaped = data.get("nodes").is_some_and(Value::is_array)
			&& data.get("edges").is_some_and(Value::is_array);
		if !shaped {
			return Err(GraphError::validation(
				"bulk document needs `nodes` and `edges` arrays",
			));
		}
		let document: GraphDocument = serde_json::from_value(data)
			.map_err(|e| GraphError::validation(format!("malformed bulk document: {e}")))?;
		self.construct_from_document(document)
	}

	/// Replace the graph with `document`.
	///
	/// Nodes are inserted first, then edges, both in the given order; an edge
	/// naming an unknown node fails with `NotFound`. The record with id `1`
	/// is required and is always kept parentless at level 0. On any error the
	/// current graph is left untouched.
	pub fn construct_from_document(&mut self, document: GraphDocument) -> Result<()> {
		if !document.nodes.iter().any(|n| n.id == ROOT_ID) {
			return Err(GraphError::validation(format!(
				"root node (id {ROOT_ID}) is required"
			)));
		}

		let mut scratch = GraphStore::with_config(self.config().clone());
		let mut parent_hints = Vec::new();
		for node in document.nodes {
			if node.label.trim().is_empty() {
				return Err(GraphError::validation(format!(
					"node {} is missing a label",
					node.id
				)));
			}
			if node.id != ROOT_ID {
				if let Some(parent) = node.parent_id {
					parent_hints.push((node.id.clone(), parent));
				}
			}
			let mut fields = NewNode::new(node.label)
				.with_id(node.id)
				.with_description(node.description);
			fields.priority = node.priority;
			scratch.add_node(fields)?;
		}

		for edge in document.edges {
			let relation = edge.relation.unwrap_or_default();
			if relation.is_hierarchical() && edge.destination == ROOT_ID {
				if !scratch.contains_node(&edge.source) {
					return Err(GraphError::node_not_found(edge.source));
				}
				warn!(
					"ignoring parent edge {} -> {ROOT_ID}: the root stays parentless",
					edge.source
				);
				continue;
			}
			scratch.add_edge(
				&edge.source,
				&edge.destination,
				relation,
				edge.strength.unwrap_or(1.0),
			)?;
		}

		for (child, parent) in parent_hints {
			if scratch
				.get_node(&child)
				.is_some_and(|n| n.parent_id.is_some())
			{
				continue;
			}
			if !scratch.contains_node(&parent) {
				warn!("ignoring dangling parent {parent} of node {child}");
				continue;
			}
			scratch.add_edge(&parent, &child, RelationType::ParentChild, 1.0)?;
		}

		scratch.refresh_levels_from(ROOT_ID)?;
		let other_roots: Vec<String> = scratch
			.root_nodes()
			.iter()
			.filter(|n| n.id != ROOT_ID)
			.map(|n| n.id.clone())
			.collect();
		for id in &other_roots {
			scratch.refresh_levels_from(id)?;
		}

		info!(
			"constructed graph with {} nodes and {} edges",
			scratch.node_count(),
			scratch.edge_count()
		);
		*self = scratch;
		Ok(())
	}
}
