mod acyclic;
pub mod engine;
mod error;
pub mod geometry;
mod groups;
mod order;
mod position;
mod ranking;
pub mod routing;
pub(crate) mod types;

pub use engine::{
    EngineEdge, EngineInput, EngineNode, EngineOutput, LayeredEngine, PlacedNode, RawEdge,
    SugiyamaEngine,
};
pub use error::{EngineError, LayoutError};
pub use geometry::{Point, Rect, center_to_top_left, top_left_to_center};
pub use types::*;

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::ir::{Direction, EdgeKind, SizedEdge, SizedGraph, SizedNode};
use geometry::{Bounds, sanitize_extent};
use groups::{Container, GroupArena, Scope, ScopeItem, normalize_bands, size_container};
use routing::{
    Axis, ShapeBox, clip_to_shapes, compress_path, label_anchor_from_points, snap_orthogonal,
};

/// Lay out `graph` with the bundled Sugiyama engine.
///
/// Spacing and margins come from the graph; `config` supplies the engine passes and the
/// group box style.
pub fn compute_layout(
    graph: &SizedGraph,
    config: &LayoutConfig,
) -> Result<PositionedGraph, LayoutError> {
    compute_layout_with_engine(graph, config, &SugiyamaEngine::from_config(&config.engine))
}

struct ResolvedEdge<'a> {
    edge: &'a SizedEdge,
    source: usize,
    target: usize,
    scope: Scope,
    source_item: ScopeItem,
    target_item: ScopeItem,
}

/// Interior layout of one scope in its own coordinate frame.
struct ScopeLayout {
    centers: BTreeMap<ScopeItem, Point>,
    ranks: BTreeMap<ScopeItem, usize>,
    edges: BTreeMap<usize, RawEdge>,
}

/// Absolute boxes of every node and group once all scopes are placed.
struct Placement<'a> {
    arena: &'a GroupArena<'a>,
    layouts: &'a [Option<ScopeLayout>],
    node_rects: &'a [Rect],
    group_rects: &'a [Rect],
}

impl Placement<'_> {
    fn item_rect(&self, item: ScopeItem) -> Rect {
        match item {
            ScopeItem::Node(idx) => self.node_rects[idx],
            ScopeItem::Group(idx) => self.group_rects[idx],
        }
    }

    /// Route from `entry`, a point on the boundary of `group`, to the boundary of `node`
    /// nested somewhere inside it. `entry` itself is not repeated in the result.
    fn route_into(&self, group: usize, entry: Point, node: usize) -> Vec<Point> {
        let ancestry = self.arena.ancestry(node);
        let Some(start) = ancestry.iter().position(|&idx| idx == group) else {
            return Vec::new();
        };
        let mut points = Vec::new();
        let mut entry = entry;
        for (depth, &scope) in ancestry.iter().enumerate().skip(start) {
            let item = match ancestry.get(depth + 1) {
                Some(&child) => ScopeItem::Group(child),
                None => ScopeItem::Node(node),
            };
            let leg = self.route_within(scope, entry, item);
            if let Some(&landing) = leg.last() {
                entry = landing;
            }
            points.extend(leg);
        }
        points
    }

    /// One leg inside `group`, from its boundary to the facing side of `item`. Segments
    /// only use space outside the group's direct items: the band between the frame and
    /// the content, the side padding, and the gap between `item`'s rank and its neighbour.
    fn route_within(&self, group: usize, entry: Point, item: ScopeItem) -> Vec<Point> {
        let frame = self.group_rects[group];
        let target = self.item_rect(item);
        let center_x = target.center().x;
        let from_top = entry.y <= frame.center().y;
        let landing = Point::new(
            center_x,
            if from_top { target.y } else { target.bottom() },
        );
        let Some(layout) = self.layouts[group].as_ref() else {
            return vec![Point::new(entry.x, landing.y), landing];
        };

        let mut bands: BTreeMap<usize, (f64, f64)> = BTreeMap::new();
        let mut content = Bounds::new();
        for (&placed, &rank) in &layout.ranks {
            let rect = self.item_rect(placed);
            content.include_rect(&rect);
            bands
                .entry(rank)
                .and_modify(|(top, bottom)| {
                    *top = top.min(rect.y);
                    *bottom = bottom.max(rect.bottom());
                })
                .or_insert((rect.y, rect.bottom()));
        }
        let Some(&rank) = layout.ranks.get(&item) else {
            return vec![Point::new(entry.x, landing.y), landing];
        };
        let (band_top, band_bottom) = bands
            .get(&rank)
            .copied()
            .unwrap_or((target.y, target.bottom()));

        let (channel, gap) = if from_top {
            let gap = bands
                .range(..rank)
                .next_back()
                .map(|(_, &(_, above))| (above + band_top) / 2.0);
            ((frame.y + content.min_y) / 2.0, gap)
        } else {
            let gap = bands
                .range(rank + 1..)
                .next()
                .map(|(_, &(below, _))| (band_bottom + below) / 2.0);
            ((content.max_y + frame.bottom()) / 2.0, gap)
        };

        let mut points = vec![Point::new(entry.x, channel)];
        if let Some(gap) = gap {
            let corridor = if center_x <= frame.center().x {
                (frame.x + content.min_x) / 2.0
            } else {
                (content.max_x + frame.right()) / 2.0
            };
            points.push(Point::new(corridor, channel));
            points.push(Point::new(corridor, gap));
            points.push(Point::new(center_x, gap));
        } else {
            points.push(Point::new(center_x, channel));
        }
        points.push(landing);
        points
    }
}

pub fn compute_layout_with_engine<E: LayeredEngine>(
    graph: &SizedGraph,
    config: &LayoutConfig,
    engine: &E,
) -> Result<PositionedGraph, LayoutError> {
    if graph.direction != Direction::TopDown {
        return Err(LayoutError::UnsupportedDirection(
            graph.direction.as_token().to_string(),
        ));
    }
    if graph.is_empty() {
        return Ok(PositionedGraph::default());
    }

    let mut node_index: BTreeMap<&str, usize> = BTreeMap::new();
    let mut nodes: Vec<&SizedNode> = Vec::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if node_index.contains_key(node.id.as_str()) {
            continue;
        }
        node_index.insert(node.id.as_str(), nodes.len());
        nodes.push(node);
    }

    let arena = GroupArena::build(&graph.groups, &node_index, nodes.len())?;

    let mut edges: Vec<ResolvedEdge<'_>> = Vec::with_capacity(graph.edges.len());
    for edge in &graph.edges {
        let lookup = |id: &str| {
            node_index
                .get(id)
                .copied()
                .ok_or_else(|| LayoutError::unknown_edge_endpoint(&edge.source, &edge.target, id))
        };
        let source = lookup(&edge.source)?;
        let target = lookup(&edge.target)?;
        let (scope, source_item, target_item) = arena.common_scope(source, target);
        edges.push(ResolvedEdge {
            edge,
            source,
            target,
            scope,
            source_item,
            target_item,
        });
    }

    let style = &config.group;
    let mut containers: Vec<Option<Container>> = vec![None; arena.entries.len()];
    let mut group_layouts: Vec<Option<ScopeLayout>> = Vec::new();
    group_layouts.resize_with(arena.entries.len(), || None);

    for idx in arena.post_order() {
        let (layout, content) =
            layout_scope(Some(idx), graph, &nodes, &arena, &edges, &containers, engine)?;
        containers[idx] = Some(size_container(content, style));
        group_layouts[idx] = Some(layout);
    }
    let (root_layout, root_content) =
        layout_scope(None, graph, &nodes, &arena, &edges, &containers, engine)?;

    let container_of = |idx: usize| containers[idx].unwrap_or_else(|| size_container(None, style));

    // Local-to-absolute translation per scope, resolved top-down (arena is pre-order).
    let root_origin = match root_content {
        Some(content) => Point::new(graph.margin.x - content.x, graph.margin.y - content.y),
        None => Point::new(graph.margin.x, graph.margin.y),
    };
    let mut group_rects: Vec<Rect> = vec![Rect::default(); arena.entries.len()];
    let mut group_origins: Vec<Point> = vec![Point::default(); arena.entries.len()];
    for (idx, entry) in arena.entries.iter().enumerate() {
        let (parent_origin, parent_layout) = match entry.parent {
            Some(parent) => (group_origins[parent], group_layouts[parent].as_ref()),
            None => (root_origin, Some(&root_layout)),
        };
        let local = parent_layout
            .and_then(|layout| layout.centers.get(&ScopeItem::Group(idx)).copied())
            .unwrap_or_default();
        let container = container_of(idx);
        let center = local.translate(parent_origin.x, parent_origin.y);
        let rect = Rect::from_center(center, container.width, container.height);
        group_origins[idx] = Point::new(
            rect.x + container.content_offset.x,
            rect.y + container.content_offset.y,
        );
        group_rects[idx] = rect;
    }
    let scope_origin = |scope: Scope| match scope {
        Some(idx) => group_origins[idx],
        None => root_origin,
    };
    let scope_layout = |scope: Scope| match scope {
        Some(idx) => group_layouts[idx].as_ref(),
        None => Some(&root_layout),
    };

    let node_rects: Vec<Rect> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            let scope = arena.owner[idx];
            let origin = scope_origin(scope);
            let local = scope_layout(scope)
                .and_then(|layout| layout.centers.get(&ScopeItem::Node(idx)).copied())
                .unwrap_or_default();
            Rect::from_center(
                local.translate(origin.x, origin.y),
                sanitize_extent(node.width),
                sanitize_extent(node.height),
            )
        })
        .collect();

    if graph.uniform_bands {
        let mut bands: Vec<Rect> = arena.roots.iter().map(|&idx| group_rects[idx]).collect();
        normalize_bands(&mut bands);
        for (&idx, band) in arena.roots.iter().zip(bands) {
            group_rects[idx] = band;
        }
    }

    let placement = Placement {
        arena: &arena,
        layouts: &group_layouts,
        node_rects: &node_rects,
        group_rects: &group_rects,
    };
    let mut positioned_edges = Vec::new();
    let mut label_boxes: Vec<Rect> = Vec::new();
    for (edge_index, resolved) in edges.iter().enumerate() {
        if resolved.edge.kind == EdgeKind::Ordering {
            continue;
        }
        let Some(raw) = scope_layout(resolved.scope).and_then(|layout| layout.edges.get(&edge_index))
        else {
            continue;
        };
        let origin = scope_origin(resolved.scope);
        let points: Vec<Point> = raw
            .points
            .iter()
            .map(|point| point.translate(origin.x, origin.y))
            .collect();

        // Clip against the boxes standing in for the endpoints in this scope, then
        // continue inside any group box down to the real node.
        let snapped = snap_orthogonal(&points, Axis::Vertical);
        let clipped = clip_to_shapes(
            &snapped,
            Some(&ShapeBox::from_rect(&placement.item_rect(resolved.source_item))),
            Some(&ShapeBox::from_rect(&placement.item_rect(resolved.target_item))),
        );
        let mut routed: Vec<Point> = Vec::with_capacity(clipped.len());
        if let ScopeItem::Group(group) = resolved.source_item
            && let Some(&exit) = clipped.first()
        {
            let mut inner = placement.route_into(group, exit, resolved.source);
            inner.reverse();
            routed.extend(inner);
        }
        routed.extend_from_slice(&clipped);
        if let ScopeItem::Group(group) = resolved.target_item
            && let Some(&entry) = clipped.last()
        {
            routed.extend(placement.route_into(group, entry, resolved.target));
        }
        let points = compress_path(&routed);

        let label_anchor = match &resolved.edge.label {
            Some(_) => raw
                .label_center
                .map(|center| center.translate(origin.x, origin.y))
                .or_else(|| label_anchor_from_points(&points)),
            None => None,
        };
        if let (Some(anchor), Some((w, h))) = (label_anchor, resolved.edge.label_size()) {
            label_boxes.push(Rect::from_center(anchor, w, h));
        }
        positioned_edges.push(PositionedEdge {
            source: nodes[resolved.source].id.clone(),
            target: nodes[resolved.target].id.clone(),
            label: resolved.edge.label.clone(),
            points,
            label_anchor,
        });
    }

    let positioned_nodes: Vec<PositionedNode> = nodes
        .iter()
        .zip(&node_rects)
        .map(|(node, rect)| PositionedNode {
            id: node.id.clone(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            label: node.label.clone(),
            kind: node.kind.clone(),
        })
        .collect();

    fn build_group(arena: &GroupArena<'_>, rects: &[Rect], idx: usize) -> PositionedGroup {
        let entry = &arena.entries[idx];
        let rect = rects[idx];
        PositionedGroup {
            id: entry.group.id.clone(),
            label: entry.group.label.clone(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            children: entry
                .children
                .iter()
                .map(|&child| build_group(arena, rects, child))
                .collect(),
        }
    }
    let positioned_groups: Vec<PositionedGroup> = arena
        .roots
        .iter()
        .map(|&root| build_group(&arena, &group_rects, root))
        .collect();

    let mut extent = Bounds::new();
    for rect in node_rects.iter().chain(&group_rects).chain(&label_boxes) {
        extent.include_rect(rect);
    }
    for edge in &positioned_edges {
        for point in &edge.points {
            extent.include_point(*point);
        }
    }
    let (width, height) = if extent.is_empty() {
        (0.0, 0.0)
    } else {
        (extent.max_x + graph.margin.x, extent.max_y + graph.margin.y)
    };

    Ok(PositionedGraph {
        width,
        height,
        nodes: positioned_nodes,
        edges: positioned_edges,
        groups: positioned_groups,
    })
}

/// Runs the engine over one scope's direct items and the edges that belong to it.
fn layout_scope<E: LayeredEngine>(
    scope: Scope,
    graph: &SizedGraph,
    nodes: &[&SizedNode],
    arena: &GroupArena<'_>,
    edges: &[ResolvedEdge<'_>],
    containers: &[Option<Container>],
    engine: &E,
) -> Result<(ScopeLayout, Option<Rect>), LayoutError> {
    let items = arena.scope_items(scope);
    let engine_nodes: Vec<EngineNode<ScopeItem>> = items
        .iter()
        .map(|&item| {
            let (width, height) = match item {
                ScopeItem::Node(idx) => (nodes[idx].width, nodes[idx].height),
                ScopeItem::Group(idx) => containers[idx]
                    .map(|c| (c.width, c.height))
                    .unwrap_or((0.0, 0.0)),
            };
            EngineNode {
                id: item,
                width,
                height,
            }
        })
        .collect();

    let mut edge_indices = Vec::new();
    let mut engine_edges: Vec<EngineEdge<ScopeItem>> = Vec::new();
    for (idx, resolved) in edges.iter().enumerate() {
        if resolved.scope != scope {
            continue;
        }
        let ordering = resolved.edge.kind == EdgeKind::Ordering;
        engine_edges.push(EngineEdge {
            source: resolved.source_item,
            target: resolved.target_item,
            label_size: if ordering {
                None
            } else {
                resolved.edge.label_size()
            },
            ordering,
        });
        edge_indices.push(idx);
    }
    if scope.is_none() && graph.uniform_bands {
        let bands: Vec<ScopeItem> = arena
            .roots
            .iter()
            .map(|&idx| ScopeItem::Group(idx))
            .chain(items.iter().copied().filter(|item| matches!(item, ScopeItem::Node(_))))
            .collect();
        for pair in bands.windows(2) {
            let mut edge = EngineEdge::new(pair[0], pair[1]);
            edge.ordering = true;
            engine_edges.push(edge);
        }
    }

    let output = engine
        .assign_ranks_and_coordinates(&EngineInput {
            nodes: engine_nodes,
            edges: engine_edges,
            node_spacing: graph.spacing.node,
            rank_spacing: graph.spacing.rank,
        })
        .map_err(|source| LayoutError::Structural {
            context: match scope {
                Some(idx) => format!("laying out group `{}`", arena.entries[idx].group.id),
                None => "laying out top-level scope".to_string(),
            },
            source,
        })?;

    let centers = output
        .nodes
        .iter()
        .map(|placed| (placed.id, placed.center))
        .collect();
    let ranks = output
        .nodes
        .iter()
        .map(|placed| (placed.id, placed.rank))
        .collect();
    let raw_edges = output
        .edges
        .into_iter()
        .filter_map(|mut raw| {
            let idx = *edge_indices.get(raw.edge_index)?;
            raw.edge_index = idx;
            Some((idx, raw))
        })
        .collect();
    Ok((
        ScopeLayout {
            centers,
            ranks,
            edges: raw_edges,
        },
        output.bounds,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Group;
    use std::error::Error as _;

    fn two_node_graph() -> SizedGraph {
        let mut graph = SizedGraph::new();
        graph.add_node("A", 120.0, 40.0);
        graph.add_node("B", 120.0, 40.0);
        graph.add_edge("A", "B");
        graph
    }

    #[test]
    fn single_edge_flows_down_into_top_edge() {
        let layout = compute_layout(&two_node_graph(), &LayoutConfig::default()).unwrap();
        let a = layout.node("A").unwrap().rect();
        let b = layout.node("B").unwrap().rect();
        assert!(a.center().y < b.center().y);
        assert!(a.bottom() <= b.y);

        let edge = &layout.edges[0];
        assert!(edge.points.len() >= 2);
        let last = *edge.points.last().unwrap();
        assert!((last.y - b.y).abs() < 1e-6);
        assert!(last.x >= b.x - 1e-6 && last.x <= b.right() + 1e-6);
        let first = edge.points[0];
        assert!((first.y - a.bottom()).abs() < 1e-6);
    }

    #[test]
    fn empty_graph_is_empty() {
        let layout = compute_layout(&SizedGraph::new(), &LayoutConfig::default()).unwrap();
        assert_eq!(layout, PositionedGraph::default());
        assert_eq!((layout.width, layout.height), (0.0, 0.0));
    }

    #[test]
    fn unknown_endpoint_is_structural() {
        let mut graph = SizedGraph::new();
        graph.add_node("A", 10.0, 10.0);
        graph.add_edge("A", "ghost");
        let err = compute_layout(&graph, &LayoutConfig::default()).unwrap_err();
        let LayoutError::Structural { ref source, .. } = err else {
            panic!("expected structural error, got {err:?}");
        };
        assert_eq!(
            source,
            &EngineError::UnknownNode {
                id: "ghost".to_string()
            }
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn edges_without_nodes_are_structural() {
        let mut graph = SizedGraph::new();
        graph.add_edge("A", "B");
        let err = compute_layout(&graph, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, LayoutError::Structural { .. }));
        assert!(err.to_string().contains('A'));
    }

    #[test]
    fn left_right_is_rejected() {
        let mut graph = two_node_graph();
        graph.direction = Direction::LeftRight;
        assert!(matches!(
            compute_layout(&graph, &LayoutConfig::default()),
            Err(LayoutError::UnsupportedDirection(token)) if token == "LR"
        ));
    }

    #[test]
    fn group_with_two_side_by_side_nodes() {
        let mut graph = SizedGraph::new();
        graph.add_node("A", 100.0, 40.0);
        graph.add_node("B", 140.0, 60.0);
        graph.groups.push(Group::new("G").with_members(["A", "B"]));
        let config = LayoutConfig::default();
        let layout = compute_layout(&graph, &config).unwrap();
        let group = layout.group("G").unwrap().rect();
        let style = &config.group;
        assert!(group.width >= 100.0 + 140.0 + graph.spacing.node + 2.0 * style.padding - 1e-6);
        assert!(group.height >= 60.0 + 2.0 * style.padding + style.header_height - 1e-6);
        for id in ["A", "B"] {
            assert!(group.contains_rect(&layout.node(id).unwrap().rect()));
        }
        assert!(!layout.node("A").unwrap().rect().intersects(&layout.node("B").unwrap().rect()));
    }

    #[test]
    fn margin_offsets_everything() {
        let layout = compute_layout(&two_node_graph(), &LayoutConfig::default()).unwrap();
        let min_x = layout.nodes.iter().map(|n| n.x).fold(f64::INFINITY, f64::min);
        let min_y = layout.nodes.iter().map(|n| n.y).fold(f64::INFINITY, f64::min);
        assert_eq!((min_x, min_y), (20.0, 20.0));
        let max_right = layout.nodes.iter().map(|n| n.x + n.width).fold(0.0, f64::max);
        assert_eq!(layout.width, max_right + 20.0);
    }

    #[test]
    fn nested_edge_leaves_the_inner_node() {
        let mut graph = SizedGraph::new();
        graph.add_node("inside", 80.0, 40.0);
        graph.add_node("outside", 80.0, 40.0);
        graph.add_edge("inside", "outside");
        graph.groups.push(Group::new("G").with_members(["inside"]));
        let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
        let inside = layout.node("inside").unwrap().rect();
        let outside = layout.node("outside").unwrap().rect();
        let group = layout.group("G").unwrap().rect();
        assert!(group.contains_rect(&inside));
        assert!(!group.intersects(&outside));
        let edge = &layout.edges[0];
        assert!(ShapeBox::from_rect(&inside).on_boundary(edge.points[0]));
        assert!(ShapeBox::from_rect(&outside).on_boundary(*edge.points.last().unwrap()));
        assert!(routing::is_orthogonal(&edge.points));
    }

    #[test]
    fn edge_into_group_goes_around_inner_nodes() {
        let mut graph = SizedGraph::new();
        graph.add_node("top", 80.0, 40.0);
        graph.add_node("bottom", 80.0, 40.0);
        graph.add_node("X", 80.0, 40.0);
        graph.add_edge("top", "bottom");
        graph.add_edge("X", "bottom");
        graph
            .groups
            .push(Group::new("G").with_members(["top", "bottom"]));
        let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
        let top = layout.node("top").unwrap().rect();
        let bottom = layout.node("bottom").unwrap().rect();
        let edge = layout
            .edges
            .iter()
            .find(|edge| edge.source == "X")
            .unwrap();
        assert!(routing::is_orthogonal(&edge.points));
        assert!(ShapeBox::from_rect(&bottom).on_boundary(*edge.points.last().unwrap()));
        for pair in edge.points.windows(2) {
            let segment = Rect::new(
                pair[0].x.min(pair[1].x),
                pair[0].y.min(pair[1].y),
                (pair[0].x - pair[1].x).abs(),
                (pair[0].y - pair[1].y).abs(),
            );
            let inside_x = segment.x < top.right() && segment.right() > top.x;
            let inside_y = segment.y < top.bottom() && segment.bottom() > top.y;
            assert!(!(inside_x && inside_y), "segment {pair:?} crosses {top:?}");
        }
    }

    #[test]
    fn ordering_edges_are_not_emitted() {
        let mut graph = two_node_graph();
        graph.edges.push(SizedEdge::ordering("B", "A"));
        let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.edges.len(), 1);
    }

    #[test]
    fn labelled_edge_gets_anchor_between_nodes() {
        let mut graph = SizedGraph::new();
        graph.add_node("A", 80.0, 40.0);
        graph.add_node("B", 80.0, 40.0);
        graph.edges.push(SizedEdge::new("A", "B").with_label("calls", 40.0, 16.0));
        let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
        let anchor = layout.edges[0].label_anchor.unwrap();
        let a = layout.node("A").unwrap().rect();
        let b = layout.node("B").unwrap().rect();
        assert!(anchor.y > a.bottom() && anchor.y < b.y);
    }
}
