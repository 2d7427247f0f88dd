//! Parsing of idea-extraction replies.
//!
//! A language model is asked to answer with a fenced ```json block holding
//! either a flat list of ideas (`label`, `description`, `connections`) or a
//! complete `{ nodes, edges }` document. This module pulls that payload out
//! of the reply text and turns it into a [`GraphDocument`] ready for
//! [`GraphStore::construct_from_document`](crate::graph::GraphStore::construct_from_document).

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{
	DocumentEdge, DocumentNode, GraphDocument, GraphError, GraphStore, ROOT_ID, RelationType,
};

// =============================================================================
// ERRORS
// =============================================================================

/// Failure to turn a model reply into graph input.
#[derive(Debug, Error)]
pub enum ExtractionError {
	/// Neither a fenced block nor a bare JSON value was found.
	#[error("extraction failed: reply holds no JSON payload")]
	MissingPayload,

	/// The payload is not a list of ideas nor a graph document.
	#[error("extraction failed: {0}")]
	Malformed(#[from] serde_json::Error),

	/// The payload parsed but the graph rejected it.
	#[error("extraction failed: {0}")]
	Graph(#[from] GraphError),
}

/// Result type for extraction.
pub type Result<T> = std::result::Result<T, ExtractionError>;

// =============================================================================
// PAYLOADS
// =============================================================================

/// One idea of the flat extraction format.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedIdea {
	/// Idea title; blank labels are skipped.
	pub label: String,
	/// Longer explanation.
	#[serde(default)]
	pub description: String,
	/// Labels of related ideas.
	#[serde(default)]
	pub connections: Vec<String>,
}

/// Parsed reply payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extraction {
	/// Flat list of ideas.
	Ideas(Vec<ExtractedIdea>),
	/// Complete bulk document.
	Structured(GraphDocument),
}

/// First fenced json block; the capture excludes surrounding whitespace.
static FENCED_JSON: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("fenced json pattern"));

/// Locate the JSON payload of a reply: the first fenced ```json block, or
/// the whole reply when it is bare JSON.
pub fn find_payload(reply: &str) -> Option<&str> {
	if let Some(block) = FENCED_JSON.captures(reply).and_then(|c| c.get(1)) {
		return Some(block.as_str());
	}
	let trimmed = reply.trim();
	let bare = trimmed.starts_with('[') || trimmed.starts_with('{');
	bare.then_some(trimmed)
}

/// Parse a raw model reply.
pub fn parse_reply(reply: &str) -> Result<Extraction> {
	let payload = find_payload(reply).ok_or(ExtractionError::MissingPayload)?;
	let extraction: Extraction = serde_json::from_str(payload)?;
	if let Extraction::Ideas(ideas) = &extraction {
		debug!("extracted {} ideas", ideas.len());
	}
	Ok(extraction)
}

/// Parse a reply straight into a bulk document rooted at `root_label`.
pub fn document_from_reply(reply: &str, root_label: &str) -> Result<GraphDocument> {
	Ok(parse_reply(reply)?.into_document(root_label))
}

/// Parse a reply and replace the contents of `store` with it.
///
/// The store is left untouched when either step fails.
pub fn load_reply(store: &mut GraphStore, reply: &str, root_label: &str) -> Result<()> {
	let document = document_from_reply(reply, root_label)?;
	store.construct_from_document(document)?;
	Ok(())
}

impl Extraction {
	/// Convert into a bulk document.
	///
	/// A structured payload passes through unchanged. A flat list becomes a
	/// star under a new root (id `1`, labelled `root_label`): every idea is a
	/// child of the root, and each connection naming another idea becomes a
	/// RELATED edge. Unknown labels and self references are skipped, and a
	/// pair of ideas is connected at most once.
	pub fn into_document(self, root_label: &str) -> GraphDocument {
		match self {
			Extraction::Structured(document) => document,
			Extraction::Ideas(ideas) => ideas_to_document(&ideas, root_label),
		}
	}
}

fn label_key(label: &str) -> String {
	label.trim().to_lowercase()
}

fn ideas_to_document(ideas: &[ExtractedIdea], root_label: &str) -> GraphDocument {
	let mut document = GraphDocument {
		nodes: vec![DocumentNode {
			id: ROOT_ID.to_string(),
			label: root_label.to_string(),
			..DocumentNode::default()
		}],
		edges: Vec::new(),
	};

	let mut ids_by_label: HashMap<String, String> = HashMap::new();
	let mut next_id = 2usize;
	for idea in ideas {
		if idea.label.trim().is_empty() {
			warn!("skipping extracted idea without a label");
			continue;
		}
		let id = next_id.to_string();
		next_id += 1;
		ids_by_label
			.entry(label_key(&idea.label))
			.or_insert_with(|| id.clone());
		document.nodes.push(DocumentNode {
			id: id.clone(),
			label: idea.label.trim().to_string(),
			description: idea.description.clone(),
			..DocumentNode::default()
		});
		document.edges.push(DocumentEdge::parent_child(ROOT_ID, id));
	}

	let mut linked: HashSet<(String, String)> = HashSet::new();
	for (idea, node) in ideas
		.iter()
		.filter(|i| !i.label.trim().is_empty())
		.zip(document.nodes.iter().skip(1))
	{
		for connection in &idea.connections {
			let Some(other) = ids_by_label.get(&label_key(connection)) else {
				debug!(
					"connection {connection:?} of {:?} names no idea",
					idea.label
				);
				continue;
			};
			if *other == node.id {
				continue;
			}
			let pair = if node.id < *other {
				(node.id.clone(), other.clone())
			} else {
				(other.clone(), node.id.clone())
			};
			if linked.insert(pair) {
				document.edges.push(DocumentEdge {
					source: node.id.clone(),
					destination: other.clone(),
					relation: Some(RelationType::Related),
					strength: None,
				});
			}
		}
	}
	document
}
