use crate::layout::PositionedGraph;
use crate::layout::routing::{path_bend_count, path_length};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Positioned graph plus a few aggregate numbers useful when comparing layouts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump<'a> {
    #[serde(flatten)]
    pub graph: &'a PositionedGraph,
    pub summary: LayoutSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub group_count: usize,
    pub total_bends: usize,
    pub total_edge_length: f64,
}

impl LayoutSummary {
    pub fn from_graph(graph: &PositionedGraph) -> Self {
        fn count_groups(groups: &[crate::layout::PositionedGroup]) -> usize {
            groups
                .iter()
                .map(|group| 1 + count_groups(&group.children))
                .sum()
        }
        Self {
            node_count: graph.nodes.len(),
            edge_count: graph.edges.len(),
            group_count: count_groups(&graph.groups),
            total_bends: graph
                .edges
                .iter()
                .map(|edge| path_bend_count(&edge.points))
                .sum(),
            total_edge_length: graph.edges.iter().map(|edge| path_length(&edge.points)).sum(),
        }
    }
}

impl<'a> LayoutDump<'a> {
    pub fn from_graph(graph: &'a PositionedGraph) -> Self {
        Self {
            graph,
            summary: LayoutSummary::from_graph(graph),
        }
    }
}

/// Pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_layout_dump(path: Option<&Path>, graph: &PositionedGraph) -> anyhow::Result<()> {
    let dump = LayoutDump::from_graph(graph);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
