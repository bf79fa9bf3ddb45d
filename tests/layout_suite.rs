use std::path::Path;

use diagram_layout::layout::routing::{ShapeBox, is_orthogonal};
use diagram_layout::layout::{Point, PositionedGroup, Rect};
use diagram_layout::{
    Diagram, LayoutConfig, LayoutError, PositionedGraph, SizedGraph, build_sized_graph,
    compute_layout,
};

const EPS: f64 = 1e-6;

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_diagram(name: &str) -> Diagram {
    let input = std::fs::read_to_string(fixture_path(name)).expect("fixture read failed");
    serde_json::from_str(&input).expect("fixture parse failed")
}

fn layout_fixture(name: &str) -> (SizedGraph, PositionedGraph) {
    let config = LayoutConfig::default();
    let graph = build_sized_graph(&load_diagram(name), &config);
    let layout = compute_layout(&graph, &config).expect("layout failed");
    (graph, layout)
}

fn collect_groups<'a>(groups: &'a [PositionedGroup], out: &mut Vec<&'a PositionedGroup>) {
    for group in groups {
        out.push(group);
        collect_groups(&group.children, out);
    }
}

fn assert_layout_invariants(layout: &PositionedGraph, fixture: &str) {
    let canvas = Rect::new(0.0, 0.0, layout.width, layout.height);
    for node in &layout.nodes {
        assert!(
            canvas.contains_rect(&node.rect()),
            "{fixture}: node {} outside canvas",
            node.id
        );
    }
    for (i, a) in layout.nodes.iter().enumerate() {
        for b in &layout.nodes[i + 1..] {
            assert!(
                !a.rect().intersects(&b.rect()),
                "{fixture}: nodes {} and {} overlap",
                a.id,
                b.id
            );
        }
    }
    for edge in &layout.edges {
        assert!(edge.points.len() >= 2, "{fixture}: short edge");
        assert!(
            is_orthogonal(&edge.points),
            "{fixture}: edge {} -> {} is not orthogonal: {:?}",
            edge.source,
            edge.target,
            edge.points
        );
        let source = layout.node(&edge.source).unwrap().rect();
        let target = layout.node(&edge.target).unwrap().rect();
        let first = edge.points[0];
        let last = *edge.points.last().unwrap();
        assert!(
            ShapeBox::from_rect(&source).on_boundary(first),
            "{fixture}: edge {} -> {} does not leave the source boundary",
            edge.source,
            edge.target
        );
        assert!(
            ShapeBox::from_rect(&target).on_boundary(last),
            "{fixture}: edge {} -> {} does not reach the target boundary",
            edge.source,
            edge.target
        );
        for point in &edge.points {
            assert!(point.x >= -EPS && point.x <= layout.width + EPS);
            assert!(point.y >= -EPS && point.y <= layout.height + EPS);
        }
    }
    let mut groups = Vec::new();
    collect_groups(&layout.groups, &mut groups);
    for group in groups {
        assert!(canvas.contains_rect(&group.rect()), "{fixture}: group {} outside canvas", group.id);
        for child in &group.children {
            assert!(
                group.rect().contains_rect(&child.rect()),
                "{fixture}: group {} does not contain {}",
                group.id,
                child.id
            );
        }
    }
}

#[test]
fn lay_out_all_fixtures() {
    let candidates = [
        "class/basic.json",
        "context/basic.json",
        "flow/basic.json",
        "flow/cycles.json",
        "flow/subgraph.json",
        "layered/basic.json",
    ];
    for fixture in candidates {
        let (_, layout) = layout_fixture(fixture);
        assert!(!layout.nodes.is_empty(), "{fixture}: no nodes");
        assert_layout_invariants(&layout, fixture);
    }
}

#[test]
fn sized_fixture_matches_two_node_scenario() {
    let input = std::fs::read_to_string(fixture_path("sized/two_nodes.json")).unwrap();
    let graph: SizedGraph = serde_json::from_str(&input).unwrap();
    let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
    let a = layout.node("A").unwrap();
    let b = layout.node("B").unwrap();
    assert!(a.y + a.height <= b.y);
    let last = layout.edges[0].points.last().unwrap();
    assert!((last.y - b.y).abs() < EPS);
}

#[test]
fn layout_is_deterministic() {
    for fixture in ["flow/cycles.json", "flow/subgraph.json", "layered/basic.json"] {
        let (graph, first) = layout_fixture(fixture);
        let second = compute_layout(&graph, &LayoutConfig::default()).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap(),
            "{fixture}: layout changed between runs"
        );
    }
}

#[test]
fn builder_drops_relation_to_unknown_element() {
    let (graph, layout) = layout_fixture("flow/basic.json");
    assert_eq!(graph.edges.len(), 3);
    assert_eq!(layout.edges.len(), 3);
    assert!(layout.edges.iter().all(|edge| edge.target != "ghost"));
}

#[test]
fn labelled_edges_get_anchors() {
    let (_, layout) = layout_fixture("flow/basic.json");
    let labelled: Vec<_> = layout.edges.iter().filter(|e| e.label.is_some()).collect();
    assert_eq!(labelled.len(), 2);
    for edge in labelled {
        let anchor = edge.label_anchor.expect("labelled edge without anchor");
        let source = layout.node(&edge.source).unwrap().rect();
        let target = layout.node(&edge.target).unwrap().rect();
        assert!(anchor.y > source.bottom() && anchor.y < target.y);
    }
}

#[test]
fn cycles_keep_every_edge() {
    let (graph, layout) = layout_fixture("flow/cycles.json");
    assert_eq!(layout.edges.len(), graph.edges.len());
    let self_loop = layout
        .edges
        .iter()
        .find(|edge| edge.source == edge.target)
        .expect("self loop missing");
    assert!(self_loop.points.len() >= 3);
    assert!(self_loop.label_anchor.is_some());
}

#[test]
fn nested_groups_contain_their_members() {
    let (_, layout) = layout_fixture("flow/subgraph.json");
    let cluster = layout.group("cluster").unwrap().rect();
    let workers = layout.group("workers").unwrap().rect();
    let empty = layout.group("empty").unwrap();
    assert!(cluster.contains_rect(&workers));
    assert!(cluster.contains_rect(&empty.rect()));
    assert!(!workers.intersects(&empty.rect()));
    for id in ["c", "d"] {
        assert!(workers.contains_rect(&layout.node(id).unwrap().rect()));
    }
    assert!(cluster.contains_rect(&layout.node("b").unwrap().rect()));
    for id in ["a", "e", "f"] {
        assert!(!cluster.intersects(&layout.node(id).unwrap().rect()));
    }
    let config = LayoutConfig::default();
    assert_eq!(empty.width, config.group.min_width);
    assert_eq!(empty.height, config.group.min_height);
}

#[test]
fn layered_bands_share_width_and_stack_in_order() {
    let (_, layout) = layout_fixture("layered/basic.json");
    let bands: Vec<Rect> = ["presentation", "services", "data"]
        .iter()
        .map(|id| layout.group(id).unwrap().rect())
        .collect();
    for band in &bands[1..] {
        assert!((band.x - bands[0].x).abs() < EPS);
        assert!((band.width - bands[0].width).abs() < EPS);
    }
    for pair in bands.windows(2) {
        assert!(pair[0].bottom() <= pair[1].y + EPS, "bands out of order");
    }
    for (band, members) in bands.iter().zip([
        &["Web_UI", "Mobile_App"][..],
        &["Order_Service", "Billing_Service", "Notification_Service"][..],
        &["Postgres"][..],
    ]) {
        for id in members {
            assert!(band.contains_rect(&layout.node(id).unwrap().rect()));
        }
    }
}

#[test]
fn context_hidden_relation_is_not_drawn() {
    let (graph, layout) = layout_fixture("context/basic.json");
    assert_eq!(graph.edges.len(), 4);
    assert_eq!(layout.edges.len(), 3);
    let web = layout.node("web").unwrap();
    assert_eq!(web.kind.as_deref(), Some("container"));
    assert!(web.width >= LayoutConfig::default().context.min_width);
}

#[test]
fn unknown_group_member_is_structural() {
    let mut graph = SizedGraph::new();
    graph.add_node("a", 40.0, 40.0);
    graph
        .groups
        .push(diagram_layout::Group::new("g").with_members(["a", "missing"]));
    let err = compute_layout(&graph, &LayoutConfig::default()).unwrap_err();
    assert!(matches!(err, LayoutError::Structural { .. }));
    assert!(err.to_string().contains("missing"));
}

fn segment_crosses(a: Point, b: Point, rect: &Rect) -> bool {
    let (left, right) = (a.x.min(b.x), a.x.max(b.x));
    let (top, bottom) = (a.y.min(b.y), a.y.max(b.y));
    left < rect.right() - EPS
        && right > rect.x + EPS
        && top < rect.bottom() - EPS
        && bottom > rect.y + EPS
}

#[test]
fn edges_into_groups_route_around_stacked_members() {
    let mut graph = SizedGraph::new();
    for id in ["top", "bottom", "deep_top", "deep_bottom", "X"] {
        graph.add_node(id, 80.0, 40.0);
    }
    graph.add_edge("top", "bottom");
    graph.add_edge("deep_top", "deep_bottom");
    graph.add_edge("X", "bottom");
    graph.add_edge("X", "deep_bottom");
    graph.add_edge("deep_bottom", "X");
    let inner = diagram_layout::Group::new("inner").with_members(["deep_top", "deep_bottom"]);
    graph.groups.push(
        diagram_layout::Group::new("outer")
            .with_members(["top", "bottom"])
            .with_child(inner),
    );
    let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
    assert_layout_invariants(&layout, "stacked members");

    for edge in layout.edges.iter().filter(|edge| edge.source == "X" || edge.target == "X") {
        for node in &layout.nodes {
            if node.id == edge.source || node.id == edge.target {
                continue;
            }
            let rect = node.rect();
            for pair in edge.points.windows(2) {
                assert!(
                    !segment_crosses(pair[0], pair[1], &rect),
                    "edge {} -> {} crosses {}: {:?}",
                    edge.source,
                    edge.target,
                    node.id,
                    edge.points
                );
            }
        }
    }
}

#[test]
fn disconnected_components_do_not_overlap() {
    let mut graph = SizedGraph::new();
    for (idx, id) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        graph.add_node(id, 60.0 + idx as f64 * 10.0, 40.0);
    }
    graph.add_edge("a", "b");
    graph.add_edge("c", "d");
    let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
    assert_layout_invariants(&layout, "disconnected");
}

#[cfg(feature = "cli")]
#[test]
fn cli_writes_layout_dump() {
    use diagram_layout::cli::{Args, run_with_args};

    let output = std::env::temp_dir().join(format!("dlayout-suite-{}.json", std::process::id()));
    run_with_args(Args {
        input: Some(fixture_path("flow/basic.json")),
        output: Some(output.clone()),
        config: None,
        sized: false,
    })
    .expect("cli run failed");
    let written = std::fs::read_to_string(&output).unwrap();
    std::fs::remove_file(&output).ok();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["summary"]["nodeCount"], 4);
    assert_eq!(json["summary"]["edgeCount"], 3);
    assert!(json["width"].as_f64().unwrap() > 0.0);
}
