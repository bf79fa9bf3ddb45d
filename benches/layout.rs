use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use diagram_layout::config::LayoutConfig;
use diagram_layout::diagram::{Diagram, build_sized_graph};
use diagram_layout::ir::{Group, SizedGraph};
use diagram_layout::layout::compute_layout;
use diagram_layout::layout::routing::{Axis, snap_orthogonal};
use diagram_layout::layout::Point;
use std::hint::black_box;

fn dense_graph(nodes: usize, extra_edges: usize) -> SizedGraph {
    let mut graph = SizedGraph::new();
    for i in 0..nodes {
        graph.add_node(&format!("N{i}"), 80.0 + (i % 5) as f64 * 12.0, 40.0);
    }
    for i in 0..nodes.saturating_sub(1) {
        graph.add_edge(&format!("N{i}"), &format!("N{}", i + 1));
    }
    let mut count = 0usize;
    'outer: for i in 0..nodes {
        for j in (i + 2)..nodes {
            if count >= extra_edges {
                break 'outer;
            }
            let edge = graph.add_edge(&format!("N{i}"), &format!("N{j}"));
            if count % 3 == 0 {
                edge.label = Some(format!("e{count}"));
                edge.label_width = Some(36.0);
                edge.label_height = Some(18.0);
            }
            count += 1;
        }
    }
    // A few back edges so cycle removal has work to do.
    for i in (3..nodes).step_by(7) {
        graph.add_edge(&format!("N{i}"), &format!("N{}", i - 3));
    }
    graph
}

fn grouped_graph(groups: usize, per_group: usize) -> SizedGraph {
    let mut graph = SizedGraph::new();
    for g in 0..groups {
        let mut inner = Group::new(format!("inner{g}"));
        let mut outer = Group::new(format!("group{g}"));
        for n in 0..per_group {
            let id = format!("G{g}N{n}");
            graph.add_node(&id, 90.0, 44.0);
            if n % 2 == 0 {
                inner = inner.with_members([id]);
            } else {
                outer = outer.with_members([id]);
            }
            if n > 0 {
                graph.add_edge(&format!("G{g}N{}", n - 1), &format!("G{g}N{n}"));
            }
        }
        if g > 0 {
            graph.add_edge(&format!("G{}N0", g - 1), &format!("G{g}N0"));
        }
        graph.groups.push(outer.with_child(inner));
    }
    graph
}

fn fixture(name: &str) -> &'static str {
    match name {
        "flow_basic" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/flow/basic.json"
        )),
        "context_basic" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/context/basic.json"
        )),
        "layered_basic" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/layered/basic.json"
        )),
        _ => panic!("unknown fixture {name}"),
    }
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    let cases = [
        ("dense_20", dense_graph(20, 10)),
        ("dense_60", dense_graph(60, 40)),
        ("dense_150", dense_graph(150, 120)),
        ("grouped_4x6", grouped_graph(4, 6)),
        ("grouped_10x10", grouped_graph(10, 10)),
    ];
    for (name, graph) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), graph, |b, graph| {
            b.iter(|| {
                let layout = compute_layout(black_box(graph), &config).expect("layout failed");
                black_box(layout.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let config = LayoutConfig::default();
    for name in ["flow_basic", "context_basic", "layered_basic"] {
        let diagram: Diagram = serde_json::from_str(fixture(name)).expect("parse failed");
        group.bench_with_input(BenchmarkId::from_parameter(name), &diagram, |b, diagram| {
            b.iter(|| {
                let graph = build_sized_graph(black_box(diagram), &config);
                let layout = compute_layout(&graph, &config).expect("layout failed");
                black_box(layout.width);
            });
        });
    }
    group.finish();
}

fn bench_snap(c: &mut Criterion) {
    let points: Vec<Point> = (0..200)
        .map(|i| Point::new((i * 37 % 101) as f64, i as f64 * 10.0))
        .collect();
    c.bench_function("routing/snap_orthogonal_200", |b| {
        b.iter(|| black_box(snap_orthogonal(black_box(&points), Axis::Vertical)));
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_layout, bench_end_to_end, bench_snap
);
criterion_main!(benches);
