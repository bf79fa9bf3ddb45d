//! Coordinate assignment for an ordered layer graph.
//!
//! Each rank sits on one horizontal band as tall as its tallest node. Within a rank,
//! nodes are pulled toward the median x of their neighbours: one left-to-right pass
//! pushes overlapping nodes right, one right-to-left pass pushes them left, and the two
//! feasible placements are averaged. Averaging two feasible placements stays feasible,
//! so neighbours never end up closer than their separation.

use super::order::LayerAdjacency;

pub(super) struct PositionInput<'a> {
    pub layers: &'a [Vec<usize>],
    pub adjacency: LayerAdjacency<'a>,
    pub widths: &'a [f64],
    pub heights: &'a [f64],
    pub dummy: &'a [bool],
    pub node_spacing: f64,
    pub rank_spacing: f64,
    pub passes: usize,
}

pub(super) struct Positions {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Vertical extent `(top, bottom)` of every rank band.
    pub rank_bands: Vec<(f64, f64)>,
}

pub(super) fn assign_coordinates(input: &PositionInput<'_>) -> Positions {
    let node_count = input.widths.len();
    let mut y = vec![0.0; node_count];
    let mut rank_bands = Vec::with_capacity(input.layers.len());
    let mut top = 0.0;
    for layer in input.layers {
        let height = layer
            .iter()
            .map(|&node| input.heights[node])
            .fold(0.0, f64::max);
        for &node in layer {
            y[node] = top + height / 2.0;
        }
        rank_bands.push((top, top + height));
        top += height + input.rank_spacing;
    }

    let mut x = vec![0.0; node_count];
    for layer in input.layers {
        let mut cursor = 0.0;
        for (idx, &node) in layer.iter().enumerate() {
            if idx > 0 {
                cursor += separation(input, layer[idx - 1], node);
            }
            x[node] = cursor;
        }
    }

    for pass in 0..input.passes {
        if pass % 2 == 0 {
            for layer in input.layers.iter().skip(1) {
                place_layer(input, layer, input.adjacency.upper, &mut x);
            }
        } else {
            for layer in input.layers.iter().rev().skip(1) {
                place_layer(input, layer, input.adjacency.lower, &mut x);
            }
        }
    }

    let min_left = input
        .layers
        .iter()
        .flatten()
        .map(|&node| x[node] - input.widths[node] / 2.0)
        .fold(f64::INFINITY, f64::min);
    if min_left.is_finite() {
        for value in &mut x {
            *value -= min_left;
        }
    }

    Positions { x, y, rank_bands }
}

/// Minimum centre distance between two neighbours in a rank.
fn separation(input: &PositionInput<'_>, left: usize, right: usize) -> f64 {
    let gap = if input.dummy[left] && input.dummy[right] {
        input.node_spacing / 2.0
    } else {
        input.node_spacing
    };
    (input.widths[left] + input.widths[right]) / 2.0 + gap
}

fn place_layer(input: &PositionInput<'_>, layer: &[usize], neighbors: &[Vec<usize>], x: &mut [f64]) {
    if layer.is_empty() {
        return;
    }
    let desired: Vec<f64> = layer
        .iter()
        .map(|&node| median_x(&neighbors[node], x).unwrap_or(x[node]))
        .collect();

    let mut forward = desired.clone();
    for idx in 1..layer.len() {
        let min = forward[idx - 1] + separation(input, layer[idx - 1], layer[idx]);
        if forward[idx] < min {
            forward[idx] = min;
        }
    }

    let mut backward = desired;
    for idx in (0..layer.len() - 1).rev() {
        let max = backward[idx + 1] - separation(input, layer[idx], layer[idx + 1]);
        if backward[idx] > max {
            backward[idx] = max;
        }
    }

    for (idx, &node) in layer.iter().enumerate() {
        x[node] = (forward[idx] + backward[idx]) / 2.0;
    }
}

fn median_x(neighbors: &[usize], x: &[f64]) -> Option<f64> {
    if neighbors.is_empty() {
        return None;
    }
    let mut values: Vec<f64> = neighbors.iter().map(|&n| x[n]).collect();
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    })
}
