//! Force-directed visualization of the idea graph.
//!
//! Turns a [`GraphStore`](crate::graph::GraphStore) into something drawable:
//! - Projection records ([`GraphData`]) coloured by [`Theme`]
//! - Polar hierarchical [`Layout`] with sibling spreading and angle jitter
//! - Physics relaxation via the `force_graph` simulation, roots anchored
//! - Eased placement animation for newly added nodes
//!
//! # Example
//!
//! ```
//! use idea_graph::graph::{GraphStore, NewNode};
//! use idea_graph::visualization::{LayoutConfig, Theme, Visualization};
//!
//! let mut store = GraphStore::new();
//! let root = store.add_node(NewNode::new("Trip")).unwrap();
//! store.add_node(NewNode::new("Budget").with_parent(&root.id)).unwrap();
//!
//! let config = LayoutConfig::default();
//! let mut vis = Visualization::with_seed(800.0, 600.0, config, Theme::default(), 1);
//! vis.update_visualization(&store);
//! vis.tick(&store, 0.016);
//! assert_eq!(vis.positions().len(), 2);
//! ```

mod animation;
mod layout;
mod session;
mod state;
pub mod theme;
mod types;

pub use animation::{PlacementAnimation, ease_out_cubic};
pub use layout::{Layout, LayoutConfig, Placement, degree_multiplier};
pub use session::{NodeDetails, Visualization};
pub use state::{NodeInfo, NodePosition, PhysicsConfig, SceneState, ViewTransform};
pub use theme::{Color, Theme};
pub use types::{GraphData, GraphLink, GraphNode};
