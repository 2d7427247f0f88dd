//! Error types for graph store operations.

use std::fmt;

use thiserror::Error;

/// The kind of entity an operation referenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
	/// An idea node.
	Node,
	/// A relation between two nodes.
	Edge,
}

impl fmt::Display for EntityKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntityKind::Node => f.write_str("node"),
			EntityKind::Edge => f.write_str("edge"),
		}
	}
}

/// Errors raised by the graph store.
///
/// Every failing operation leaves the store as it was before the call.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum GraphError {
	/// Missing required field, malformed bulk input, or a structural edit
	/// that would break the hierarchy (parent cycles).
	#[error("validation error: {0}")]
	Validation(String),

	/// An operation referenced a node or edge id that does not exist.
	#[error("{kind} not found: {id}")]
	NotFound {
		/// What was looked up.
		kind: EntityKind,
		/// The id that failed to resolve.
		id: String,
	},
}

impl GraphError {
	/// Create a validation error.
	pub fn validation(msg: impl Into<String>) -> Self {
		Self::Validation(msg.into())
	}

	/// Create a not-found error for a node id.
	pub fn node_not_found(id: impl Into<String>) -> Self {
		Self::NotFound {
			kind: EntityKind::Node,
			id: id.into(),
		}
	}

	/// Create a not-found error for an edge id.
	pub fn edge_not_found(id: impl Into<String>) -> Self {
		Self::NotFound {
			kind: EntityKind::Edge,
			id: id.into(),
		}
	}

	/// True for [`GraphError::NotFound`].
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}

	/// True for [`GraphError::Validation`].
	pub fn is_validation(&self) -> bool {
		matches!(self, Self::Validation(_))
	}
}

/// Result alias for graph store operations.
pub type Result<T> = std::result::Result<T, GraphError>;
