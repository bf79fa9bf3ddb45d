//! The layered engine seam.
//!
//! [`LayeredEngine`] turns a flat set of sized nodes and directed edges into node centres
//! and raw edge polylines. [`SugiyamaEngine`] is the bundled implementation: greedy
//! cycle removal, longest-path ranking, dummy-node insertion, median crossing reduction
//! and median-pull coordinate assignment, always flowing top to bottom.

use std::collections::BTreeMap;
use std::fmt::Display;

use super::acyclic::feedback_edges;
use super::error::EngineError;
use super::geometry::{Bounds, Point, Rect, sanitize_extent};
use super::order::{LayerAdjacency, initial_order, reduce_crossings};
use super::position::{PositionInput, assign_coordinates};
use super::ranking::{RankEdge, assign_ranks};
use super::routing::self_loop_path;
use crate::config::EngineConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineNode<Id> {
    pub id: Id,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineEdge<Id> {
    pub source: Id,
    pub target: Id,
    /// Size of the label box; a labelled edge spans at least two ranks.
    pub label_size: Option<(f64, f64)>,
    /// Ordering edges constrain ranks only and produce no path. They are never reversed
    /// to break a cycle unless they form one among themselves.
    pub ordering: bool,
}

impl<Id> EngineEdge<Id> {
    pub fn new(source: Id, target: Id) -> Self {
        Self {
            source,
            target,
            label_size: None,
            ordering: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineInput<Id> {
    pub nodes: Vec<EngineNode<Id>>,
    pub edges: Vec<EngineEdge<Id>>,
    pub node_spacing: f64,
    pub rank_spacing: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode<Id> {
    pub id: Id,
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub rank: usize,
}

impl<Id> PlacedNode<Id> {
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.width, self.height)
    }
}

/// Unprocessed polyline for one input edge, from source centre to target centre.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEdge {
    /// Index into [`EngineInput::edges`].
    pub edge_index: usize,
    pub points: Vec<Point>,
    pub label_center: Option<Point>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput<Id> {
    /// Placed nodes in input order; duplicate ids keep their first declaration.
    pub nodes: Vec<PlacedNode<Id>>,
    /// Raw paths for every non-ordering edge, in input order.
    pub edges: Vec<RawEdge>,
    /// Extent of nodes, paths and label boxes. `None` when nothing was placed.
    pub bounds: Option<Rect>,
}

pub trait LayeredEngine {
    fn assign_ranks_and_coordinates<Id>(
        &self,
        input: &EngineInput<Id>,
    ) -> Result<EngineOutput<Id>, EngineError>
    where
        Id: Ord + Clone + Display;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugiyamaEngine {
    pub order_passes: usize,
    pub position_passes: usize,
    pub self_loop_size: f64,
}

impl Default for SugiyamaEngine {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl SugiyamaEngine {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            order_passes: config.order_passes,
            position_passes: config.position_passes,
            self_loop_size: config.self_loop_size,
        }
    }
}

/// One edge of the proper layer graph, chained from an input edge.
struct Chain {
    edge_index: usize,
    nodes: Vec<usize>,
    reversed: bool,
    label_node: Option<usize>,
}

impl LayeredEngine for SugiyamaEngine {
    fn assign_ranks_and_coordinates<Id>(
        &self,
        input: &EngineInput<Id>,
    ) -> Result<EngineOutput<Id>, EngineError>
    where
        Id: Ord + Clone + Display,
    {
        let mut index: BTreeMap<&Id, usize> = BTreeMap::new();
        let mut nodes: Vec<&EngineNode<Id>> = Vec::new();
        for node in &input.nodes {
            if index.contains_key(&node.id) {
                continue;
            }
            index.insert(&node.id, nodes.len());
            nodes.push(node);
        }

        let lookup = |id: &Id| {
            index.get(id).copied().ok_or_else(|| EngineError::UnknownNode {
                id: id.to_string(),
            })
        };
        let mut resolved: Vec<(usize, usize)> = Vec::with_capacity(input.edges.len());
        for edge in &input.edges {
            resolved.push((lookup(&edge.source)?, lookup(&edge.target)?));
        }

        let real_count = nodes.len();
        if real_count == 0 {
            return Ok(EngineOutput {
                nodes: Vec::new(),
                edges: Vec::new(),
                bounds: None,
            });
        }

        let hard: Vec<bool> = input.edges.iter().map(|edge| edge.ordering).collect();
        let reversed = feedback_edges(real_count, &resolved, &hard);
        let rank_edges: Vec<RankEdge> = input
            .edges
            .iter()
            .zip(&resolved)
            .zip(&reversed)
            .filter(|((_, (s, t)), _)| s != t)
            .map(|((edge, &(s, t)), &rev)| {
                let (source, target) = if rev { (t, s) } else { (s, t) };
                let min_len = if !edge.ordering && edge.label_size.is_some() { 2 } else { 1 };
                RankEdge {
                    source,
                    target,
                    min_len,
                }
            })
            .collect();
        let mut ranks = assign_ranks(real_count, &rank_edges);

        // Self-loops widen their node inside the rank so the loop clears its neighbours.
        let mut loop_extent = vec![0.0f64; real_count];
        for (edge, &(s, t)) in input.edges.iter().zip(&resolved) {
            if s == t && !edge.ordering {
                let label_w = edge.label_size.map_or(0.0, |(w, _)| w);
                loop_extent[s] = loop_extent[s].max(self.self_loop_size + label_w);
            }
        }

        let mut widths: Vec<f64> = nodes
            .iter()
            .zip(&loop_extent)
            .map(|(node, extent)| sanitize_extent(node.width) + 2.0 * extent)
            .collect();
        let mut heights: Vec<f64> = nodes
            .iter()
            .map(|node| sanitize_extent(node.height))
            .collect();
        let mut dummy = vec![false; real_count];
        let mut lower: Vec<Vec<usize>> = vec![Vec::new(); real_count];
        let mut upper: Vec<Vec<usize>> = vec![Vec::new(); real_count];

        let mut chains: Vec<Chain> = Vec::new();
        for (edge_index, ((edge, &(s, t)), &rev)) in
            input.edges.iter().zip(&resolved).zip(&reversed).enumerate()
        {
            if edge.ordering || s == t {
                continue;
            }
            let (top, bottom) = if rev { (t, s) } else { (s, t) };
            let span = ranks[bottom].saturating_sub(ranks[top]);
            let label_rank = ranks[top] + span / 2;
            let mut chain = vec![top];
            let mut label_node = None;
            for rank in ranks[top] + 1..ranks[bottom] {
                let node = widths.len();
                let (w, h) = match edge.label_size {
                    Some((w, h)) if rank == label_rank && label_node.is_none() => {
                        label_node = Some(node);
                        (sanitize_extent(w), sanitize_extent(h))
                    }
                    _ => (0.0, 0.0),
                };
                widths.push(w);
                heights.push(h);
                dummy.push(true);
                ranks.push(rank);
                lower.push(Vec::new());
                upper.push(Vec::new());
                chain.push(node);
            }
            chain.push(bottom);
            for pair in chain.windows(2) {
                lower[pair[0]].push(pair[1]);
                upper[pair[1]].push(pair[0]);
            }
            chains.push(Chain {
                edge_index,
                nodes: chain,
                reversed: rev,
                label_node,
            });
        }

        let adjacency = LayerAdjacency {
            upper: &upper,
            lower: &lower,
        };
        let layers = initial_order(&ranks, &adjacency);
        let layers = reduce_crossings(layers, &adjacency, widths.len(), self.order_passes);

        let positions = assign_coordinates(&PositionInput {
            layers: &layers,
            adjacency: LayerAdjacency {
                upper: &upper,
                lower: &lower,
            },
            widths: &widths,
            heights: &heights,
            dummy: &dummy,
            node_spacing: input.node_spacing,
            rank_spacing: input.rank_spacing,
            passes: self.position_passes,
        });
        let center = |node: usize| Point::new(positions.x[node], positions.y[node]);

        let placed: Vec<PlacedNode<Id>> = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| PlacedNode {
                id: node.id.clone(),
                center: center(idx),
                width: sanitize_extent(node.width),
                height: sanitize_extent(node.height),
                rank: ranks[idx],
            })
            .collect();

        let mut chain_paths: BTreeMap<usize, RawEdge> = BTreeMap::new();
        for chain in &chains {
            let mut points = vec![center(chain.nodes[0])];
            for pair in chain.nodes.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let gap_bottom = positions.rank_bands[ranks[a]].1;
                let gap_top = positions.rank_bands[ranks[b]].0;
                let mid_y = (gap_bottom + gap_top) / 2.0;
                points.push(Point::new(positions.x[a], mid_y));
                points.push(Point::new(positions.x[b], mid_y));
                points.push(center(b));
            }
            if chain.reversed {
                points.reverse();
            }
            chain_paths.insert(
                chain.edge_index,
                RawEdge {
                    edge_index: chain.edge_index,
                    points,
                    label_center: chain.label_node.map(center),
                },
            );
        }

        let mut raw_edges = Vec::new();
        for (edge_index, (edge, &(s, _))) in input.edges.iter().zip(&resolved).enumerate() {
            if edge.ordering {
                continue;
            }
            if let Some(raw) = chain_paths.remove(&edge_index) {
                raw_edges.push(raw);
                continue;
            }
            let rect = placed[s].rect();
            let points = self_loop_path(&rect, self.self_loop_size);
            let label_center = edge.label_size.map(|(w, _)| {
                Point::new(
                    rect.right() + self.self_loop_size + sanitize_extent(w) / 2.0,
                    rect.center().y,
                )
            });
            raw_edges.push(RawEdge {
                edge_index,
                points,
                label_center,
            });
        }

        let mut bounds = Bounds::new();
        for node in &placed {
            bounds.include_rect(&node.rect());
        }
        for raw in &raw_edges {
            for point in &raw.points {
                bounds.include_point(*point);
            }
            if let (Some(center), Some((w, h))) =
                (raw.label_center, input.edges[raw.edge_index].label_size)
            {
                bounds.include_rect(&Rect::from_center(
                    center,
                    sanitize_extent(w),
                    sanitize_extent(h),
                ));
            }
        }

        Ok(EngineOutput {
            nodes: placed,
            edges: raw_edges,
            bounds: bounds.to_rect(),
        })
    }
}
