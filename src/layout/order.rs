//! In-rank ordering: a depth-first initial order followed by alternating median sweeps.
//! The order with the fewest crossings seen so far is kept.

use std::cmp::Ordering;

/// Adjacency of the proper layer graph: every edge joins two consecutive ranks.
pub(super) struct LayerAdjacency<'a> {
    /// Neighbours one rank above.
    pub upper: &'a [Vec<usize>],
    /// Neighbours one rank below.
    pub lower: &'a [Vec<usize>],
}

/// Nodes visited depth-first along downward edges, starting from the lowest rank and
/// lowest index, are appended to their rank in visit order.
pub(super) fn initial_order(ranks: &[usize], adjacency: &LayerAdjacency<'_>) -> Vec<Vec<usize>> {
    let rank_count = ranks.iter().copied().max().map_or(0, |max| max + 1);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    let mut visited = vec![false; ranks.len()];

    let mut starts: Vec<usize> = (0..ranks.len()).collect();
    starts.sort_by_key(|&node| (ranks[node], node));

    for start in starts {
        if visited[start] {
            continue;
        }
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            layers[ranks[node]].push(node);
            for &next in adjacency.lower[node].iter().rev() {
                if !visited[next] {
                    stack.push(next);
                }
            }
        }
    }
    layers
}

/// Runs `passes` down/up median sweeps, returning the best order encountered.
pub(super) fn reduce_crossings(
    layers: Vec<Vec<usize>>,
    adjacency: &LayerAdjacency<'_>,
    node_count: usize,
    passes: usize,
) -> Vec<Vec<usize>> {
    let mut positions = vec![0usize; node_count];
    update_positions(&layers, &mut positions);

    let mut best_crossings = count_crossings(&layers, adjacency, &positions);
    let mut best = layers.clone();
    let mut current = layers;
    if current.len() <= 1 || best_crossings == 0 {
        return best;
    }

    for _ in 0..passes {
        for rank in 1..current.len() {
            sort_layer(&mut current[rank], adjacency.upper, &positions);
            update_positions(&current, &mut positions);
        }
        for rank in (0..current.len() - 1).rev() {
            sort_layer(&mut current[rank], adjacency.lower, &positions);
            update_positions(&current, &mut positions);
        }

        let crossings = count_crossings(&current, adjacency, &positions);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = current.clone();
            if crossings == 0 {
                break;
            }
        }
    }
    best
}

fn update_positions(layers: &[Vec<usize>], positions: &mut [usize]) {
    for layer in layers {
        for (idx, &node) in layer.iter().enumerate() {
            positions[node] = idx;
        }
    }
}

fn sort_layer(layer: &mut [usize], neighbors: &[Vec<usize>], positions: &[usize]) {
    if layer.len() <= 1 {
        return;
    }
    let mut keyed: Vec<(f64, usize, usize)> = layer
        .iter()
        .enumerate()
        .map(|(idx, &node)| (median_position(node, idx, neighbors, positions), idx, node))
        .collect();
    keyed.sort_by(|a, b| match a.0.partial_cmp(&b.0) {
        Some(Ordering::Equal) | None => a.1.cmp(&b.1),
        Some(ordering) => ordering,
    });
    for (slot, (_, _, node)) in layer.iter_mut().zip(keyed) {
        *slot = node;
    }
}

/// Median neighbour position, or the node's own slot when it has no neighbours on that side.
pub(super) fn median_position(
    node: usize,
    current: usize,
    neighbors: &[Vec<usize>],
    positions: &[usize],
) -> f64 {
    let mut values: Vec<f64> = neighbors[node]
        .iter()
        .map(|&neighbor| positions[neighbor] as f64)
        .collect();
    if values.is_empty() {
        return current as f64;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) * 0.5
    }
}

/// Total crossings between every pair of adjacent ranks.
pub(super) fn count_crossings(
    layers: &[Vec<usize>],
    adjacency: &LayerAdjacency<'_>,
    positions: &[usize],
) -> usize {
    let mut total = 0;
    for pair in layers.windows(2) {
        let (north, south) = (&pair[0], &pair[1]);
        let mut south_positions: Vec<usize> = Vec::new();
        for &node in north {
            let mut targets: Vec<usize> = adjacency.lower[node]
                .iter()
                .map(|&next| positions[next])
                .collect();
            targets.sort_unstable();
            south_positions.extend(targets);
        }
        total += count_inversions(&south_positions, south.len());
    }
    total
}

// Accumulator tree over south positions (Barth, Jünger, Mutzel).
fn count_inversions(sequence: &[usize], width: usize) -> usize {
    if sequence.len() < 2 || width == 0 {
        return 0;
    }
    let mut tree = vec![0usize; width + 1];
    let mut seen = 0usize;
    let mut inversions = 0usize;
    for &pos in sequence {
        let mut at_most = 0usize;
        let mut i = pos + 1;
        while i > 0 {
            at_most += tree[i];
            i -= i & i.wrapping_neg();
        }
        inversions += seen - at_most;
        let mut i = pos + 1;
        while i <= width {
            tree[i] += 1;
            i += i & i.wrapping_neg();
        }
        seen += 1;
    }
    inversions
}
