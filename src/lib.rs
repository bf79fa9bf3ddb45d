#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagram;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod sizing;
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LayoutConfig, load_config};
pub use diagram::{Diagram, DiagramFamily, build_sized_graph};
pub use ir::{EdgeKind, Group, SizedEdge, SizedGraph, SizedNode};
pub use layout::{LayoutError, PositionedGraph, compute_layout};
