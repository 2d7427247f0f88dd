//! Command line front end.
//!
//! Reads a bulk document (or a raw model reply with `--extract`), builds the
//! graph and prints one of its JSON renditions.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use serde::Serialize;

use crate::extraction;
use crate::graph::{Edge, GraphStore, Node};
use crate::settings::Settings;
use crate::visualization::{NodePosition, ViewTransform, Visualization};

/// Seconds simulated per physics tick (one frame at 60 fps).
const TICK_SECONDS: f32 = 1.0 / 60.0;

/// Build, lay out and project a brainstorm idea graph.
#[derive(Debug, Parser)]
#[command(name = "idea-graph", version, about)]
pub struct Cli {
	/// Bulk `{ nodes, edges }` document, or a model reply with --extract.
	/// Use `-` for stdin.
	pub input: PathBuf,

	/// Treat the input as a raw model reply and extract its ideas.
	#[arg(long)]
	pub extract: bool,

	/// Root label used when an extracted reply is a flat idea list.
	#[arg(long, default_value = "Brainstorm")]
	pub root_label: String,

	/// JSON settings file.
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// What to print.
	#[arg(long, value_enum, default_value_t = Output::Projection)]
	pub output: Output,

	/// Physics ticks to run before printing the layout.
	#[arg(long, default_value_t = 0)]
	pub ticks: u32,

	/// Seed for the layout jitter.
	#[arg(long)]
	pub seed: Option<u64>,

	/// Built-in theme; overrides the settings file.
	#[arg(long)]
	pub theme: Option<String>,
}

/// Printed rendition of the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Output {
	/// Renderer nodes and edges.
	Projection,
	/// Node positions after layout and physics.
	Layout,
	/// Every node and edge with full metadata.
	Snapshot,
}

#[derive(Serialize)]
struct Snapshot<'a> {
	nodes: Vec<&'a Node>,
	edges: Vec<&'a Edge>,
}

#[derive(Serialize)]
struct LayoutReport {
	transform: ViewTransform,
	nodes: Vec<NodePosition>,
}

/// Run the command line front end.
pub fn run(cli: &Cli) -> Result<()> {
	let mut settings = match &cli.config {
		Some(path) => Settings::load(path)?,
		None => Settings::default(),
	};
	if let Some(theme) = &cli.theme {
		settings.theme = Some(theme.clone());
	}

	let input = read_input(&cli.input)?;
	let mut store = GraphStore::with_config(settings.graph.clone());
	if cli.extract {
		extraction::load_reply(&mut store, &input, &cli.root_label)?;
	} else {
		store.construct_from_json(&input)?;
	}
	info!(
		"loaded {} nodes and {} edges from {}",
		store.node_count(),
		store.edge_count(),
		cli.input.display()
	);

	let json = render(&store, &settings, cli.output, cli.ticks, cli.seed)?;
	let mut stdout = io::stdout().lock();
	writeln!(stdout, "{json}")?;
	Ok(())
}

/// Render `store` as pretty JSON.
pub fn render(
	store: &GraphStore,
	settings: &Settings,
	output: Output,
	ticks: u32,
	seed: Option<u64>,
) -> Result<String> {
	let json = match output {
		Output::Projection => {
			let data = store.vis_network_data_with(&settings.theme());
			serde_json::to_string_pretty(&data)?
		}
		Output::Snapshot => serde_json::to_string_pretty(&Snapshot {
			nodes: store.nodes().collect(),
			edges: store.edges().collect(),
		})?,
		Output::Layout => {
			let (width, height) = settings.viewport;
			let (config, theme) = (settings.layout.clone(), settings.theme());
			let mut vis = match seed {
				Some(seed) => Visualization::with_seed(width, height, config, theme, seed),
				None => Visualization::new(width, height, config, theme),
			};
			vis.update_visualization(store);
			for _ in 0..ticks {
				vis.tick(store, TICK_SECONDS);
			}
			vis.center();
			serde_json::to_string_pretty(&LayoutReport {
				transform: vis.scene().transform.clone(),
				nodes: vis.positions(),
			})?
		}
	};
	Ok(json)
}

fn read_input(path: &Path) -> Result<String> {
	if path.as_os_str() == "-" {
		let mut text = String::new();
		io::stdin()
			.read_to_string(&mut text)
			.context("failed to read stdin")?;
		return Ok(text);
	}
	fs::read_to_string(path)
		.with_context(|| format!("failed to read {}", path.display()))
}
