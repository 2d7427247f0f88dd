//! Command line entrypoint.

// Bin target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use clap::Parser;
use idea_graph::cli::{self, Cli};
use idea_graph::init_logging;

fn main() -> anyhow::Result<()> {
	init_logging();
	cli::run(&Cli::parse())
}
