//! File-backed settings.
//!
//! Every section falls back to its defaults, so a settings file only needs
//! the values it changes:
//!
//! ```json
//! { "graph": { "touch_endpoints_on_edge": false }, "theme": "midnight" }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::graph::GraphConfig;
use crate::visualization::{LayoutConfig, Theme};

/// Everything the command line front end can be configured with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Graph store behaviour.
	pub graph: GraphConfig,
	/// Placement, animation and physics.
	pub layout: LayoutConfig,
	/// Built-in theme name; see [`Theme::by_name`].
	pub theme: Option<String>,
	/// Viewport `(width, height)` the view is fitted into.
	pub viewport: (f64, f64),
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			graph: GraphConfig::default(),
			layout: LayoutConfig::default(),
			theme: None,
			viewport: (800.0, 600.0),
		}
	}
}

impl Settings {
	/// Parse settings from JSON text.
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).context("invalid settings")
	}

	/// Read settings from a JSON file.
	pub fn load(path: &Path) -> Result<Self> {
		let text = fs::read_to_string(path)
			.with_context(|| format!("failed to read settings from {}", path.display()))?;
		Self::from_json(&text).with_context(|| format!("in {}", path.display()))
	}

	/// The configured theme; unknown names fall back to the default.
	pub fn theme(&self) -> Theme {
		match self.theme.as_deref() {
			None => Theme::default(),
			Some(name) => Theme::by_name(name).unwrap_or_else(|| {
				warn!("unknown theme {name:?}, using default");
				Theme::default()
			}),
		}
	}
}
