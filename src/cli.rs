use crate::config::load_config;
use crate::diagram::{Diagram, build_sized_graph};
use crate::ir::SizedGraph;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "dlayout",
    version,
    about = "Lay out a diagram model and print its positioned geometry as JSON"
)]
pub struct Args {
    /// Input JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Treat the input as an already sized graph instead of a diagram model
    #[arg(long = "sized")]
    pub sized: bool,
}

pub fn run() -> Result<()> {
    run_with_args(Args::parse())
}

pub fn run_with_args(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;

    let graph: SizedGraph = if args.sized {
        serde_json::from_str(&input).context("input is not a valid sized graph")?
    } else {
        let diagram: Diagram =
            serde_json::from_str(&input).context("input is not a valid diagram model")?;
        build_sized_graph(&diagram, &config)
    };
    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        groups = graph.groups.len(),
        "laying out"
    );

    let layout = compute_layout(&graph, &config).context("layout failed")?;
    tracing::info!(
        width = layout.width,
        height = layout.height,
        "layout complete"
    );
    write_layout_dump(args.output.as_deref(), &layout)?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
