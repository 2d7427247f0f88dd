//! The graph store.
//!
//! Owns every node and edge plus the root set, enforces referential
//! integrity, and keeps hierarchy levels consistent after each structural
//! edit. Levels are only ever written by node creation and by
//! [`GraphStore::update_subtree_levels`].

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use chrono::Utc;
use log::{debug, warn};
use uuid::Uuid;

use super::config::GraphConfig;
use super::error::{GraphError, Result};
use super::types::{Edge, EdgeMetadata, NewNode, Node, NodeMetadata, NodeUpdate, RelationType};

/// In-memory idea graph for a single session.
///
/// Not synchronised: callers sharing a store across requests must serialise
/// access themselves.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	config: GraphConfig,
	nodes: HashMap<String, Node>,
	edges: HashMap<String, Edge>,
	/// Insertion order, used for deterministic iteration.
	node_order: Vec<String>,
	/// May hold ids of removed edges until the next compaction.
	edge_order: Vec<String>,
	root_nodes: HashSet<String>,
	/// PARENT_CHILD edge id keyed by child id.
	parent_edges: HashMap<String, String>,
	/// Ids of the edges touching each node.
	incident: HashMap<String, HashSet<String>>,
}

impl GraphStore {
	/// Create an empty store with the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create an empty store with an explicit configuration.
	pub fn with_config(config: GraphConfig) -> Self {
		Self {
			config,
			..Self::default()
		}
	}

	/// The configuration this store was built with.
	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	// ------------------------------------------------------------------
	// Mutation
	// ------------------------------------------------------------------

	/// Insert a node and return a snapshot of it.
	///
	/// A fresh id is generated unless `fields.id` is set. When a parent is
	/// named it must already exist; the link is recorded as a PARENT_CHILD
	/// edge of strength 1 so the node lands at `level(parent) + 1`.
	pub fn add_node(&mut self, fields: NewNode) -> Result<Node> {
		if fields.label.trim().is_empty() {
			return Err(GraphError::validation("node label is required"));
		}
		let priority = fields.priority.unwrap_or(1);
		if priority == 0 {
			return Err(GraphError::validation("node priority must be at least 1"));
		}
		if let Some(confidence) = fields.confidence {
			if !(0.0..=1.0).contains(&confidence) {
				return Err(GraphError::validation(format!(
					"confidence {confidence} is outside 0..=1"
				)));
			}
		}
		let id = match fields.id {
			Some(id) if id.trim().is_empty() => {
				return Err(GraphError::validation("node id must not be empty"));
			}
			Some(id) if self.nodes.contains_key(&id) => {
				return Err(GraphError::validation(format!("duplicate node id {id}")));
			}
			Some(id) => id,
			None => Uuid::new_v4().to_string(),
		};
		if let Some(parent_id) = &fields.parent_id {
			self.node(parent_id)?;
		}

		let now = Utc::now();
		let mut metadata = NodeMetadata::fresh(now);
		metadata.confidence = fields.confidence;
		metadata.frequency = fields.frequency;

		let node = Node {
			id: id.clone(),
			label: fields.label,
			description: fields.description,
			session_id: fields.session_id.or_else(|| self.config.session_id.clone()),
			parent_id: None,
			level: 0,
			priority,
			colour: fields.colour,
			message_ids: fields.message_ids,
			children: BTreeSet::new(),
			metadata,
		};
		self.nodes.insert(id.clone(), node);
		self.node_order.push(id.clone());
		self.root_nodes.insert(id.clone());
		debug!("added node {id}");

		if let Some(parent_id) = fields.parent_id {
			if let Err(err) = self.add_edge(&parent_id, &id, RelationType::ParentChild, 1.0) {
				self.discard_unlinked(&id);
				return Err(err);
			}
		}
		self.node(&id).cloned()
	}

	/// Apply label/description/priority/colour changes to a node.
	///
	/// Always refreshes `last_updated`.
	pub fn update_node(&mut self, node_id: &str, update: NodeUpdate) -> Result<Node> {
		self.node(node_id)?;
		if let Some(label) = &update.label {
			if label.trim().is_empty() {
				return Err(GraphError::validation("node label is required"));
			}
		}
		if update.priority == Some(0) {
			return Err(GraphError::validation("node priority must be at least 1"));
		}
		if let Some(confidence) = update.confidence {
			if !(0.0..=1.0).contains(&confidence) {
				return Err(GraphError::validation(format!(
					"confidence {confidence} is outside 0..=1"
				)));
			}
		}

		let node = self
			.nodes
			.get_mut(node_id)
			.ok_or_else(|| GraphError::node_not_found(node_id))?;
		if let Some(label) = update.label {
			node.label = label;
		}
		if let Some(description) = update.description {
			node.description = description;
		}
		if let Some(priority) = update.priority {
			node.priority = priority;
		}
		if let Some(colour) = update.colour {
			node.colour = colour;
		}
		if let Some(confidence) = update.confidence {
			node.metadata.confidence = Some(confidence);
		}
		if let Some(frequency) = update.frequency {
			node.metadata.frequency = Some(frequency);
		}
		node.touch(Utc::now());
		Ok(node.clone())
	}

	/// Insert a typed edge between two existing nodes.
	///
	/// A PARENT_CHILD edge makes `source` the parent of `target`, replacing
	/// any previous parent link of `target`, and re-levels the subtree under
	/// `target`. Edges that would make a node its own ancestor are rejected
	/// before anything changes.
	pub fn add_edge(
		&mut self,
		source: &str,
		target: &str,
		relation: RelationType,
		strength: f64,
	) -> Result<Edge> {
		let session_id = self.node(source)?.session_id.clone();
		self.node(target)?;
		if !(strength.is_finite() && strength > 0.0) {
			return Err(GraphError::validation(format!(
				"edge strength must be positive, got {strength}"
			)));
		}
		if relation.is_hierarchical() {
			if self.is_ancestor_or_self(target, source)? {
				return Err(GraphError::validation(format!(
					"making {target} a child of {source} would create a parent cycle"
				)));
			}
			let deepest = self.calculate_level(source)? + 1 + self.subtree_height(target);
			if deepest > self.config.max_depth {
				return Err(GraphError::validation(format!(
					"attaching {target} under {source} exceeds the maximum depth of {}",
					self.config.max_depth
				)));
			}
		}

		let now = Utc::now();
		let edge = Edge {
			id: Uuid::new_v4().to_string(),
			session_id,
			source: source.to_string(),
			target: target.to_string(),
			relation,
			strength,
			metadata: EdgeMetadata {
				created: now,
				last_updated: now,
			},
		};

		if relation.is_hierarchical() {
			if let Some(previous) = self.detach_from_parent(target) {
				debug!("re-parenting {target} from {previous} to {source}");
			}
		}

		self.index_edge(&edge);
		self.edges.insert(edge.id.clone(), edge.clone());
		self.edge_order.push(edge.id.clone());

		if relation.is_hierarchical() {
			if let Some(child) = self.nodes.get_mut(target) {
				child.parent_id = Some(source.to_string());
			}
			if let Some(parent) = self.nodes.get_mut(source) {
				parent.children.insert(target.to_string());
			}
			self.root_nodes.remove(target);
		}
		if self.config.touch_endpoints_on_edge {
			for id in [source, target] {
				if let Some(node) = self.nodes.get_mut(id) {
					node.touch(now);
				}
			}
		}
		debug!(
			"added {} edge {} -> {}",
			relation.name(),
			edge.source,
			edge.target
		);

		if relation.is_hierarchical() {
			self.update_subtree_levels(target)?;
		}
		Ok(edge)
	}

	/// Remove a node and every edge touching it.
	///
	/// Former children are promoted to roots rather than deleted; their
	/// subtrees are re-levelled.
	pub fn remove_node(&mut self, node_id: &str) -> Result<Node> {
		self.node(node_id)?;

		let touching = self.incident.remove(node_id).unwrap_or_default();

		let now = Utc::now();
		let mut promoted = Vec::new();
		for edge_id in &touching {
			let Some(edge) = self.unlink_edge(edge_id) else {
				continue;
			};
			if !edge.relation.is_hierarchical() {
				continue;
			}
			if edge.source == node_id {
				if let Some(child) = self.nodes.get_mut(&edge.target) {
					child.parent_id = None;
					child.touch(now);
					self.root_nodes.insert(edge.target.clone());
					promoted.push(edge.target);
				}
			} else if let Some(parent) = self.nodes.get_mut(&edge.source) {
				parent.children.remove(node_id);
			}
		}
		self.compact_edge_order();
		self.node_order.retain(|id| id != node_id);
		self.root_nodes.remove(node_id);
		let removed = self
			.nodes
			.remove(node_id)
			.ok_or_else(|| GraphError::node_not_found(node_id))?;

		for child in &promoted {
			self.update_subtree_levels(child)?;
		}
		debug!(
			"removed node {node_id} ({} edges, {} children promoted)",
			touching.len(),
			promoted.len()
		);
		Ok(removed)
	}

	/// Remove a single edge.
	///
	/// Removing a PARENT_CHILD edge returns its target to the root set.
	pub fn remove_edge(&mut self, edge_id: &str) -> Result<Edge> {
		let edge = self
			.unlink_edge(edge_id)
			.ok_or_else(|| GraphError::edge_not_found(edge_id))?;
		self.compact_edge_order();

		if edge.relation.is_hierarchical() {
			let now = Utc::now();
			if let Some(child) = self.nodes.get_mut(&edge.target) {
				if child.parent_id.as_deref() == Some(edge.source.as_str()) {
					child.parent_id = None;
					child.touch(now);
					self.root_nodes.insert(edge.target.clone());
				}
			}
			if let Some(parent) = self.nodes.get_mut(&edge.source) {
				parent.children.remove(&edge.target);
			}
			self.update_subtree_levels(&edge.target)?;
		}
		debug!("removed edge {edge_id}");
		Ok(edge)
	}

	/// Drop every node and edge.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.edges.clear();
		self.node_order.clear();
		self.edge_order.clear();
		self.root_nodes.clear();
		self.parent_edges.clear();
		self.incident.clear();
	}

	// ------------------------------------------------------------------
	// Levels
	// ------------------------------------------------------------------

	/// Count parent hops from `node_id` up to a root.
	///
	/// Unknown nodes and roots are level 0. A dangling parent reference ends
	/// the walk at the last resolvable ancestor. A chain that revisits a node
	/// or exceeds `max_depth` is reported as a validation error.
	pub fn calculate_level(&self, node_id: &str) -> Result<usize> {
		let Some(node) = self.nodes.get(node_id) else {
			return Ok(0);
		};
		let mut level = 0;
		let mut visited = HashSet::from([node_id]);
		let mut current = node.parent_id.as_deref();
		while let Some(parent_id) = current {
			let Some(parent) = self.nodes.get(parent_id) else {
				warn!("node {node_id} has a dangling ancestor {parent_id}");
				break;
			};
			if !visited.insert(parent_id) || level >= self.config.max_depth {
				return Err(cyclic_chain(node_id));
			}
			level += 1;
			current = parent.parent_id.as_deref();
		}
		Ok(level)
	}

	/// Recompute the level of `node_id` and, if it changed, of every
	/// PARENT_CHILD descendant.
	pub fn update_subtree_levels(&mut self, node_id: &str) -> Result<()> {
		self.propagate_levels(node_id, false)
	}

	/// Like [`update_subtree_levels`](Self::update_subtree_levels) but walks
	/// the whole subtree even where levels are already correct.
	pub(crate) fn refresh_levels_from(&mut self, node_id: &str) -> Result<()> {
		self.propagate_levels(node_id, true)
	}

	fn propagate_levels(&mut self, start: &str, force: bool) -> Result<()> {
		let mut pending = vec![start.to_string()];
		let mut visited = HashSet::new();
		while let Some(current) = pending.pop() {
			if !visited.insert(current.clone()) {
				return Err(cyclic_chain(&current));
			}
			let level = self.calculate_level(&current)?;
			let Some(node) = self.nodes.get_mut(&current) else {
				continue;
			};
			let changed = node.level != level;
			node.level = level;
			if changed || force {
				pending.extend(node.children.iter().cloned());
			}
		}
		Ok(())
	}

	/// True when `candidate` is `start` or one of its ancestors.
	fn is_ancestor_or_self(&self, candidate: &str, start: &str) -> Result<bool> {
		let mut visited = HashSet::new();
		let mut current = Some(start);
		while let Some(id) = current {
			if id == candidate {
				return Ok(true);
			}
			if !visited.insert(id) {
				return Err(cyclic_chain(start));
			}
			current = self.nodes.get(id).and_then(|n| n.parent_id.as_deref());
		}
		Ok(false)
	}

	/// Longest PARENT_CHILD chain below `node_id`, in hops.
	fn subtree_height(&self, node_id: &str) -> usize {
		let mut height = 0;
		let mut visited = HashSet::new();
		let mut pending = vec![(node_id, 0usize)];
		while let Some((id, depth)) = pending.pop() {
			if !visited.insert(id) {
				continue;
			}
			height = height.max(depth);
			if let Some(node) = self.nodes.get(id) {
				pending.extend(node.children.iter().map(|c| (c.as_str(), depth + 1)));
			}
		}
		height
	}

	/// Undo the insertion of a node that has no edges yet.
	fn discard_unlinked(&mut self, node_id: &str) {
		self.nodes.remove(node_id);
		self.node_order.retain(|id| id != node_id);
		self.root_nodes.remove(node_id);
	}

	/// Drop the PARENT_CHILD edge into `child_id` and unlink it from its
	/// parent.
	///
	/// Returns the previous parent id.
	fn detach_from_parent(&mut self, child_id: &str) -> Option<String> {
		if let Some(edge_id) = self.parent_edges.get(child_id).cloned() {
			self.unlink_edge(&edge_id);
			self.compact_edge_order();
		}

		let parent_id = self.nodes.get_mut(child_id)?.parent_id.take()?;
		if let Some(parent) = self.nodes.get_mut(&parent_id) {
			parent.children.remove(child_id);
		}
		self.root_nodes.insert(child_id.to_string());
		Some(parent_id)
	}

	fn index_edge(&mut self, edge: &Edge) {
		for id in [&edge.source, &edge.target] {
			self.incident
				.entry(id.clone())
				.or_default()
				.insert(edge.id.clone());
		}
		if edge.relation.is_hierarchical() {
			self.parent_edges
				.insert(edge.target.clone(), edge.id.clone());
		}
	}

	/// Remove an edge from the edge map and the indexes, leaving
	/// `edge_order` to [`compact_edge_order`](Self::compact_edge_order).
	fn unlink_edge(&mut self, edge_id: &str) -> Option<Edge> {
		let edge = self.edges.remove(edge_id)?;
		for id in [&edge.source, &edge.target] {
			if let Some(ids) = self.incident.get_mut(id) {
				ids.remove(edge_id);
			}
		}
		if self.parent_edges.get(&edge.target).map(String::as_str) == Some(edge_id) {
			self.parent_edges.remove(&edge.target);
		}
		Some(edge)
	}

	/// Drop removed ids from `edge_order` once they outnumber live edges.
	fn compact_edge_order(&mut self) {
		if self.edge_order.len() > 2 * self.edges.len() + COMPACTION_SLACK {
			self.edge_order.retain(|id| self.edges.contains_key(id));
		}
	}

	// ------------------------------------------------------------------
	// Queries
	// ------------------------------------------------------------------

	/// Look up a node by id.
	pub fn get_node(&self, node_id: &str) -> Option<&Node> {
		self.nodes.get(node_id)
	}

	/// Look up an edge by id.
	pub fn get_edge(&self, edge_id: &str) -> Option<&Edge> {
		self.edges.get(edge_id)
	}

	/// True when a node with this id exists.
	pub fn contains_node(&self, node_id: &str) -> bool {
		self.nodes.contains_key(node_id)
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.node_order.iter().filter_map(|id| self.nodes.get(id))
	}

	/// Edges in insertion order.
	pub fn edges(&self) -> impl Iterator<Item = &Edge> {
		self.edge_order.iter().filter_map(|id| self.edges.get(id))
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// True when the store holds no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// True when `node_id` is in the root set.
	pub fn is_root(&self, node_id: &str) -> bool {
		self.root_nodes.contains(node_id)
	}

	/// Parentless nodes in insertion order.
	pub fn root_nodes(&self) -> Vec<&Node> {
		self.nodes()
			.filter(|n| self.root_nodes.contains(&n.id))
			.collect()
	}

	/// Direct children of `node_id` in insertion order.
	pub fn children_of(&self, node_id: &str) -> Vec<&Node> {
		self.nodes()
			.filter(|n| n.parent_id.as_deref() == Some(node_id))
			.collect()
	}

	/// `root_id` and all of its PARENT_CHILD descendants, pre-order.
	pub fn get_subtree(&self, root_id: &str) -> Vec<&Node> {
		let mut hierarchy: HashMap<&str, Vec<&str>> = HashMap::new();
		for edge in self.edges().filter(|e| e.relation.is_hierarchical()) {
			hierarchy
				.entry(edge.source.as_str())
				.or_default()
				.push(edge.target.as_str());
		}

		let mut result = Vec::new();
		let mut visited = HashSet::new();
		let mut stack = vec![root_id];
		while let Some(id) = stack.pop() {
			if !visited.insert(id) {
				continue;
			}
			let Some(node) = self.nodes.get(id) else {
				continue;
			};
			result.push(node);
			if let Some(children) = hierarchy.get(id) {
				stack.extend(children.iter().rev());
			}
		}
		result
	}

	/// Breadth-first path from `start_id` to `end_id` over directed edges of
	/// any type.
	///
	/// Returns the node sequence including both ends, or an empty vector when
	/// `end_id` is unreachable. Shortest in hop count; edge strength is
	/// ignored.
	pub fn find_path(&self, start_id: &str, end_id: &str) -> Vec<&Node> {
		if !self.nodes.contains_key(start_id) || !self.nodes.contains_key(end_id) {
			return Vec::new();
		}

		let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
		for edge in self.edges() {
			outgoing
				.entry(edge.source.as_str())
				.or_default()
				.push(edge.target.as_str());
		}

		let mut visited = HashSet::from([start_id]);
		let mut came_from: HashMap<&str, &str> = HashMap::new();
		let mut queue = VecDeque::from([start_id]);
		let mut found = false;
		while let Some(current) = queue.pop_front() {
			if current == end_id {
				found = true;
				break;
			}
			for &next in outgoing.get(current).into_iter().flatten() {
				if visited.insert(next) {
					came_from.insert(next, current);
					queue.push_back(next);
				}
			}
		}
		if !found {
			return Vec::new();
		}

		let mut path = vec![end_id];
		let mut current = end_id;
		while current != start_id {
			let Some(&previous) = came_from.get(current) else {
				return Vec::new();
			};
			path.push(previous);
			current = previous;
		}
		path.reverse();
		path.into_iter()
			.filter_map(|id| self.nodes.get(id))
			.collect()
	}

	fn node(&self, node_id: &str) -> Result<&Node> {
		self.nodes
			.get(node_id)
			.ok_or_else(|| GraphError::node_not_found(node_id))
	}
}

/// Stale `edge_order` entries tolerated before compaction.
const COMPACTION_SLACK: usize = 32;

fn cyclic_chain(node_id: &str) -> GraphError {
	GraphError::validation(format!("parent chain of {node_id} is cyclic"))
}

#[cfg(test)]
mod tests {
	use chrono::DateTime;

	use super::*;

	fn ids(nodes: &[&Node]) -> Vec<String> {
		nodes.iter().map(|n| n.id.clone()).collect()
	}

	/// root -> a -> b, plus root -> c
	fn small_tree() -> (GraphStore, String, String, String, String) {
		let mut store = GraphStore::new();
		let root = store.add_node(NewNode::new("root")).unwrap().id;
		let a = store
			.add_node(NewNode::new("a").with_parent(&root))
			.unwrap()
			.id;
		let b = store
			.add_node(NewNode::new("b").with_parent(&a))
			.unwrap()
			.id;
		let c = store
			.add_node(NewNode::new("c").with_parent(&root))
			.unwrap()
			.id;
		(store, root, a, b, c)
	}

	fn backdate(store: &mut GraphStore, id: &str) {
		store.nodes.get_mut(id).unwrap().metadata.last_updated = DateTime::<Utc>::MIN_UTC;
	}

	fn last_updated(store: &GraphStore, id: &str) -> DateTime<Utc> {
		store.get_node(id).unwrap().metadata.last_updated
	}

	/// The indexes agree with the edge map.
	fn assert_indexes_consistent(store: &GraphStore) {
		for edge in store.edges.values() {
			assert!(store.incident[&edge.source].contains(&edge.id));
			assert!(store.incident[&edge.target].contains(&edge.id));
			if edge.relation.is_hierarchical() {
				assert_eq!(store.parent_edges.get(&edge.target), Some(&edge.id));
			}
		}
		for (node_id, edge_ids) in &store.incident {
			assert!(store.nodes.contains_key(node_id));
			for edge_id in edge_ids {
				assert!(store.edges[edge_id].touches(node_id));
			}
		}
		for (child, edge_id) in &store.parent_edges {
			let edge = &store.edges[edge_id];
			assert_eq!(&edge.target, child);
			assert!(edge.relation.is_hierarchical());
		}
	}

	#[test]
	fn add_node_requires_label() {
		let mut store = GraphStore::new();
		let err = store.add_node(NewNode::new("   ")).unwrap_err();
		assert!(err.is_validation());
		assert!(store.is_empty());
	}

	#[test]
	fn add_node_rejects_zero_priority_and_duplicate_ids() {
		let mut store = GraphStore::new();
		assert!(
			store
				.add_node(NewNode::new("x").with_priority(0))
				.unwrap_err()
				.is_validation()
		);
		store.add_node(NewNode::new("x").with_id("n1")).unwrap();
		assert!(
			store
				.add_node(NewNode::new("y").with_id("n1"))
				.unwrap_err()
				.is_validation()
		);
		assert_eq!(store.node_count(), 1);
	}

	#[test]
	fn add_node_with_missing_parent_fails_without_inserting() {
		let mut store = GraphStore::new();
		let err = store
			.add_node(NewNode::new("orphan").with_parent("nope"))
			.unwrap_err();
		assert_eq!(err, GraphError::node_not_found("nope"));
		assert!(store.is_empty());
	}

	#[test]
	fn new_root_node_defaults() {
		let mut store = GraphStore::new();
		let node = store.add_node(NewNode::new("root")).unwrap();
		assert_eq!(node.level, 0);
		assert_eq!(node.priority, 1);
		assert!(node.is_root());
		assert!(store.is_root(&node.id));
		assert_eq!(node.metadata.created, node.metadata.last_updated);
	}

	#[test]
	fn session_defaults_to_store_session() {
		let mut store = GraphStore::with_config(GraphConfig {
			session_id: Some("s1".into()),
			..GraphConfig::default()
		});
		let a = store.add_node(NewNode::new("a")).unwrap();
		let b = store
			.add_node(NewNode::new("b").with_session("s2"))
			.unwrap();
		assert_eq!(a.session_id.as_deref(), Some("s1"));
		assert_eq!(b.session_id.as_deref(), Some("s2"));
		let edge = store
			.add_edge(&b.id, &a.id, RelationType::Related, 1.0)
			.unwrap();
		assert_eq!(edge.session_id.as_deref(), Some("s2"));
	}

	#[test]
	fn parent_child_edges_set_levels_and_children() {
		let (store, root, a, b, c) = small_tree();
		assert_eq!(store.get_node(&root).unwrap().level, 0);
		assert_eq!(store.get_node(&a).unwrap().level, 1);
		assert_eq!(store.get_node(&b).unwrap().level, 2);
		assert_eq!(store.get_node(&c).unwrap().level, 1);

		let root_node = store.get_node(&root).unwrap();
		assert!(root_node.children.contains(&a));
		assert!(root_node.children.contains(&c));
		assert_eq!(ids(&store.root_nodes()), vec![root.clone()]);
		assert_eq!(store.edge_count(), 3);
	}

	#[test]
	fn add_edge_requires_both_endpoints() {
		let mut store = GraphStore::new();
		let a = store.add_node(NewNode::new("a")).unwrap().id;
		let err = store
			.add_edge(&a, "ghost", RelationType::Related, 1.0)
			.unwrap_err();
		assert_eq!(err, GraphError::node_not_found("ghost"));
		let err = store
			.add_edge("ghost", &a, RelationType::Related, 1.0)
			.unwrap_err();
		assert!(err.is_not_found());
		assert_eq!(store.edge_count(), 0);
	}

	#[test]
	fn add_edge_rejects_non_positive_strength() {
		let mut store = GraphStore::new();
		let a = store.add_node(NewNode::new("a")).unwrap().id;
		let b = store.add_node(NewNode::new("b")).unwrap().id;
		for strength in [0.0, -1.0, f64::NAN] {
			assert!(
				store
					.add_edge(&a, &b, RelationType::Supports, strength)
					.unwrap_err()
					.is_validation()
			);
		}
	}

	#[test]
	fn non_hierarchical_edges_leave_levels_alone() {
		let mut store = GraphStore::new();
		let a = store.add_node(NewNode::new("a")).unwrap().id;
		let b = store.add_node(NewNode::new("b")).unwrap().id;
		store
			.add_edge(&a, &b, RelationType::Contradicts, 2.0)
			.unwrap();
		let node = store.get_node(&b).unwrap();
		assert_eq!(node.level, 0);
		assert!(node.parent_id.is_none());
		assert!(store.is_root(&b));
	}

	#[test]
	fn multiple_typed_edges_between_same_pair() {
		let mut store = GraphStore::new();
		let a = store.add_node(NewNode::new("a")).unwrap().id;
		let b = store.add_node(NewNode::new("b")).unwrap().id;
		let e1 = store.add_edge(&a, &b, RelationType::Related, 1.0).unwrap();
		let e2 = store.add_edge(&a, &b, RelationType::Supports, 1.0).unwrap();
		assert_ne!(e1.id, e2.id);
		assert_eq!(store.edge_count(), 2);
	}

	#[test]
	fn cycle_forming_edge_is_rejected() {
		let (mut store, root, a, b, _) = small_tree();
		let before = store.edge_count();
		let err = store
			.add_edge(&b, &root, RelationType::ParentChild, 1.0)
			.unwrap_err();
		assert!(err.is_validation());
		assert!(
			store
				.add_edge(&a, &a, RelationType::ParentChild, 1.0)
				.unwrap_err()
				.is_validation()
		);
		assert_eq!(store.edge_count(), before);
		assert!(store.is_root(&root));
		assert_eq!(store.get_node(&b).unwrap().level, 2);
	}

	#[test]
	fn self_loop_of_other_types_is_allowed() {
		let mut store = GraphStore::new();
		let a = store.add_node(NewNode::new("a")).unwrap().id;
		store.add_edge(&a, &a, RelationType::Related, 1.0).unwrap();
		assert_eq!(store.get_node(&a).unwrap().level, 0);
	}

	#[test]
	fn reparenting_replaces_previous_parent_edge() {
		let (mut store, root, a, b, c) = small_tree();
		store
			.add_edge(&c, &b, RelationType::ParentChild, 1.0)
			.unwrap();

		let b_node = store.get_node(&b).unwrap();
		assert_eq!(b_node.parent_id.as_deref(), Some(c.as_str()));
		assert_eq!(b_node.level, 2);
		assert!(!store.get_node(&a).unwrap().children.contains(&b));
		assert!(store.get_node(&c).unwrap().children.contains(&b));

		let parents_of_b: Vec<&Edge> = store
			.edges()
			.filter(|e| e.relation.is_hierarchical() && e.target == b)
			.collect();
		assert_eq!(parents_of_b.len(), 1);
		assert_eq!(parents_of_b[0].source, c);
		assert!(!store.is_root(&b));
		assert_eq!(store.get_node(&root).unwrap().level, 0);
	}

	#[test]
	fn attaching_a_subtree_relevels_descendants() {
		let mut store = GraphStore::new();
		let top = store.add_node(NewNode::new("top")).unwrap().id;
		let mid = store.add_node(NewNode::new("mid")).unwrap().id;
		let leaf = store
			.add_node(NewNode::new("leaf").with_parent(&mid))
			.unwrap()
			.id;
		assert_eq!(store.get_node(&leaf).unwrap().level, 1);

		store
			.add_edge(&top, &mid, RelationType::ParentChild, 1.0)
			.unwrap();
		assert_eq!(store.get_node(&mid).unwrap().level, 1);
		assert_eq!(store.get_node(&leaf).unwrap().level, 2);
		assert_eq!(ids(&store.root_nodes()), vec![top]);
	}

	#[test]
	fn remove_node_promotes_children() {
		let (mut store, root, a, b, c) = small_tree();
		let removed = store.remove_node(&a).unwrap();
		assert_eq!(removed.id, a);

		assert!(store.get_node(&a).is_none());
		let b_node = store.get_node(&b).unwrap();
		assert!(b_node.parent_id.is_none());
		assert_eq!(b_node.level, 0);
		assert!(store.is_root(&b));
		assert!(store.edges().all(|e| !e.touches(&a)));
		assert!(!store.get_node(&root).unwrap().children.contains(&a));
		assert_eq!(store.get_node(&c).unwrap().level, 1);
		assert_eq!(ids(&store.root_nodes()), vec![root, b]);
	}

	#[test]
	fn remove_node_relevels_promoted_subtrees() {
		let (mut store, root, a, b, _) = small_tree();
		let d = store
			.add_node(NewNode::new("d").with_parent(&b))
			.unwrap()
			.id;
		assert_eq!(store.get_node(&d).unwrap().level, 3);

		store.remove_node(&root).unwrap();
		assert_eq!(store.get_node(&a).unwrap().level, 0);
		assert_eq!(store.get_node(&b).unwrap().level, 1);
		assert_eq!(store.get_node(&d).unwrap().level, 2);
	}

	#[test]
	fn remove_missing_node_fails() {
		let mut store = GraphStore::new();
		assert_eq!(
			store.remove_node("x").unwrap_err(),
			GraphError::node_not_found("x")
		);
	}

	#[test]
	fn remove_parent_edge_returns_child_to_roots() {
		let (mut store, root, a, b, _) = small_tree();
		let edge_id = store
			.edges()
			.find(|e| e.source == root && e.target == a)
			.map(|e| e.id.clone())
			.unwrap();
		store.remove_edge(&edge_id).unwrap();

		assert!(store.is_root(&a));
		assert_eq!(store.get_node(&a).unwrap().level, 0);
		assert_eq!(store.get_node(&b).unwrap().level, 1);
		assert!(!store.get_node(&root).unwrap().children.contains(&a));
		assert!(store.remove_edge(&edge_id).unwrap_err().is_not_found());
	}

	#[test]
	fn update_node_refreshes_timestamp() {
		let mut store = GraphStore::new();
		let node = store.add_node(NewNode::new("a")).unwrap();
		let updated = store
			.update_node(
				&node.id,
				NodeUpdate {
					label: Some("renamed".into()),
					priority: Some(4),
					colour: Some(Some("#123456".into())),
					..NodeUpdate::default()
				},
			)
			.unwrap();
		assert_eq!(updated.label, "renamed");
		assert_eq!(updated.priority, 4);
		assert_eq!(updated.colour.as_deref(), Some("#123456"));
		assert!(updated.metadata.last_updated >= node.metadata.last_updated);

		backdate(&mut store, &node.id);
		let updated = store.update_node(&node.id, NodeUpdate::default()).unwrap();
		assert!(updated.metadata.last_updated > DateTime::<Utc>::MIN_UTC);
		assert_eq!(
			updated.metadata.last_updated,
			last_updated(&store, &node.id)
		);
		assert_eq!(updated.metadata.created, node.metadata.created);
		assert_eq!(updated.level, node.level);
	}

	#[test]
	fn update_node_validates() {
		let mut store = GraphStore::new();
		let id = store.add_node(NewNode::new("a")).unwrap().id;
		let blank = NodeUpdate {
			label: Some(String::new()),
			..NodeUpdate::default()
		};
		assert!(store.update_node(&id, blank).unwrap_err().is_validation());
		assert!(
			store
				.update_node("nope", NodeUpdate::default())
				.unwrap_err()
				.is_not_found()
		);
		assert_eq!(store.get_node(&id).unwrap().label, "a");
	}

	#[test]
	fn endpoint_timestamps_follow_config() {
		let mut store = GraphStore::with_config(GraphConfig {
			touch_endpoints_on_edge: false,
			..GraphConfig::default()
		});
		let a = store.add_node(NewNode::new("a")).unwrap().id;
		let b = store.add_node(NewNode::new("b")).unwrap().id;
		backdate(&mut store, &a);
		backdate(&mut store, &b);
		store.add_edge(&a, &b, RelationType::Related, 1.0).unwrap();
		assert_eq!(last_updated(&store, &a), DateTime::<Utc>::MIN_UTC);
		assert_eq!(last_updated(&store, &b), DateTime::<Utc>::MIN_UTC);

		let mut store = GraphStore::new();
		let a = store.add_node(NewNode::new("a")).unwrap().id;
		let b = store.add_node(NewNode::new("b")).unwrap().id;
		backdate(&mut store, &a);
		backdate(&mut store, &b);
		store.add_edge(&a, &b, RelationType::Related, 1.0).unwrap();
		assert!(last_updated(&store, &a) > DateTime::<Utc>::MIN_UTC);
		assert!(last_updated(&store, &b) > DateTime::<Utc>::MIN_UTC);
	}

	#[test]
	fn promoted_and_detached_children_are_touched() {
		let (mut store, root, a, b, c) = small_tree();
		backdate(&mut store, &b);
		store.remove_node(&a).unwrap();
		assert!(last_updated(&store, &b) > DateTime::<Utc>::MIN_UTC);

		let edge_id = store.parent_edges[&c].clone();
		backdate(&mut store, &c);
		store.remove_edge(&edge_id).unwrap();
		assert!(last_updated(&store, &c) > DateTime::<Utc>::MIN_UTC);
		assert!(store.is_root(&c));
		assert!(store.get_node(&root).unwrap().children.is_empty());
	}

	#[test]
	fn reparenting_drops_only_the_old_parent_edge() {
		let (mut store, _, a, b, c) = small_tree();
		let old = store.parent_edges[&b].clone();
		let related = store.add_edge(&a, &b, RelationType::Related, 1.0).unwrap();
		let before = store.edge_count();

		let new = store
			.add_edge(&c, &b, RelationType::ParentChild, 1.0)
			.unwrap();
		assert!(store.get_edge(&old).is_none());
		assert!(store.get_edge(&related.id).is_some());
		assert_eq!(store.parent_edges.get(&b), Some(&new.id));
		assert_eq!(store.edge_count(), before);
		assert!(!store.incident[&a].contains(&old));
		assert_indexes_consistent(&store);
	}

	#[test]
	fn indexes_follow_removals() {
		let (mut store, root, a, b, c) = small_tree();
		store.add_edge(&b, &c, RelationType::Supports, 1.0).unwrap();
		assert_indexes_consistent(&store);

		let edge_id = store.parent_edges[&a].clone();
		store.remove_edge(&edge_id).unwrap();
		assert!(!store.parent_edges.contains_key(&a));
		assert_indexes_consistent(&store);

		store.remove_node(&b).unwrap();
		assert!(!store.incident.contains_key(&b));
		assert!(!store.parent_edges.contains_key(&b));
		assert_eq!(store.incident[&c].len(), 1);
		assert_indexes_consistent(&store);

		store.remove_node(&root).unwrap();
		assert!(store.parent_edges.is_empty());
		assert_indexes_consistent(&store);

		store.clear();
		assert!(store.incident.is_empty());
	}

	#[test]
	fn edge_order_is_compacted() {
		let mut store = GraphStore::new();
		let a = store.add_node(NewNode::new("a")).unwrap().id;
		let b = store.add_node(NewNode::new("b")).unwrap().id;
		let kept = store.add_edge(&a, &b, RelationType::Related, 1.0).unwrap();
		for _ in 0..200 {
			let edge = store.add_edge(&b, &a, RelationType::Supports, 1.0).unwrap();
			store.remove_edge(&edge.id).unwrap();
		}
		let bound = 2 * store.edge_count() + COMPACTION_SLACK + 1;
		assert!(store.edge_order.len() <= bound);
		let remaining: Vec<&str> = store.edges().map(|e| e.id.as_str()).collect();
		assert_eq!(remaining, vec![kept.id.as_str()]);
	}

	#[test]
	fn calculate_level_stops_at_dangling_parent() {
		let (mut store, _, a, b, _) = small_tree();
		assert_eq!(store.calculate_level("unknown").unwrap(), 0);

		store.nodes.get_mut(&a).unwrap().parent_id = Some("vanished".into());
		assert_eq!(store.calculate_level(&a).unwrap(), 0);
		assert_eq!(store.calculate_level(&b).unwrap(), 1);
	}

	#[test]
	fn calculate_level_detects_cycles() {
		let (mut store, root, _, b, _) = small_tree();
		store.nodes.get_mut(&root).unwrap().parent_id = Some(b.clone());
		assert!(store.calculate_level(&b).unwrap_err().is_validation());
		assert!(
			store
				.update_subtree_levels(&root)
				.unwrap_err()
				.is_validation()
		);
	}

	#[test]
	fn max_depth_bounds_the_walk() {
		let mut store = GraphStore::with_config(GraphConfig {
			max_depth: 2,
			..GraphConfig::default()
		});
		let a = store.add_node(NewNode::new("a")).unwrap().id;
		let b = store
			.add_node(NewNode::new("b").with_parent(&a))
			.unwrap()
			.id;
		let c = store
			.add_node(NewNode::new("c").with_parent(&b))
			.unwrap()
			.id;
		assert_eq!(store.get_node(&c).unwrap().level, 2);
		let err = store
			.add_node(NewNode::new("d").with_parent(&c))
			.unwrap_err();
		assert!(err.is_validation());
		assert_eq!(store.node_count(), 3);
		assert_eq!(store.edge_count(), 2);

		let e = store.add_node(NewNode::new("e")).unwrap().id;
		let f = store
			.add_node(NewNode::new("f").with_parent(&e))
			.unwrap()
			.id;
		assert!(
			store
				.add_edge(&b, &e, RelationType::ParentChild, 1.0)
				.unwrap_err()
				.is_validation()
		);
		assert_eq!(store.get_node(&f).unwrap().level, 1);
	}

	#[test]
	fn subtree_is_preorder() {
		let (store, root, a, b, c) = small_tree();
		assert_eq!(
			ids(&store.get_subtree(&root)),
			vec![root, a.clone(), b.clone(), c]
		);
		assert_eq!(ids(&store.get_subtree(&a)), vec![a, b]);
		assert!(store.get_subtree("missing").is_empty());
	}

	#[test]
	fn children_of_keeps_insertion_order() {
		let (store, root, a, _, c) = small_tree();
		assert_eq!(ids(&store.children_of(&root)), vec![a, c]);
	}

	#[test]
	fn find_path_follows_directed_edges() {
		let (mut store, root, a, b, c) = small_tree();
		assert_eq!(
			ids(&store.find_path(&root, &b)),
			vec![root.clone(), a.clone(), b.clone()]
		);
		assert!(store.find_path(&b, &root).is_empty());
		assert!(store.find_path(&c, &b).is_empty());

		store.add_edge(&c, &b, RelationType::Related, 1.0).unwrap();
		assert_eq!(ids(&store.find_path(&c, &b)), vec![c.clone(), b.clone()]);
		assert_eq!(ids(&store.find_path(&a, &a)), vec![a]);
		assert!(store.find_path(&root, "missing").is_empty());
	}

	#[test]
	fn find_path_is_shortest_in_hops() {
		let mut store = GraphStore::new();
		let n: Vec<String> = (0..4)
			.map(|i| format!("n{i}"))
			.map(|label| store.add_node(NewNode::new(label)).unwrap().id)
			.collect();
		store
			.add_edge(&n[0], &n[1], RelationType::Related, 5.0)
			.unwrap();
		store
			.add_edge(&n[1], &n[2], RelationType::Related, 5.0)
			.unwrap();
		store
			.add_edge(&n[2], &n[3], RelationType::Related, 5.0)
			.unwrap();
		store
			.add_edge(&n[0], &n[3], RelationType::Supports, 0.1)
			.unwrap();
		assert_eq!(
			ids(&store.find_path(&n[0], &n[3])),
			vec![n[0].clone(), n[3].clone()]
		);
	}

	#[test]
	fn clear_empties_everything() {
		let (mut store, ..) = small_tree();
		store.clear();
		assert!(store.is_empty());
		assert_eq!(store.edge_count(), 0);
		assert!(store.root_nodes().is_empty());
	}
}
