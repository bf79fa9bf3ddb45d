//! Cycle breaking with the greedy feedback-arc-set heuristic of Eades, Lin and Smyth.
//!
//! Nodes are peeled off as sinks (appended to the right sequence) or sources (appended to
//! the left sequence); when neither exists the node with the largest out-degree minus
//! in-degree goes left. Edges pointing backwards in the final sequence are reversed.
//! Ties always resolve to the lowest node index so the result is deterministic.
//!
//! Hard edges are never reversed unless they form a cycle among themselves: the final
//! sequence is a topological order of the hard edges, tie-broken by the greedy sequence
//! computed over the soft edges.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Flags, per edge, whether it must be reversed to make the graph acyclic.
/// Self-loops are never flagged; callers exclude them from ranking.
pub(super) fn feedback_edges(node_count: usize, edges: &[(usize, usize)], hard: &[bool]) -> Vec<bool> {
    let is_hard = |idx: usize| hard.get(idx).copied().unwrap_or(false);
    let soft: Vec<(usize, usize)> = edges
        .iter()
        .enumerate()
        .filter(|(idx, _)| !is_hard(*idx))
        .map(|(_, edge)| *edge)
        .collect();
    let mut order = greedy_fas_order(node_count, &soft);
    if soft.len() < edges.len() {
        let hard_edges: Vec<(usize, usize)> = edges
            .iter()
            .enumerate()
            .filter(|(idx, _)| is_hard(*idx))
            .map(|(_, edge)| *edge)
            .collect();
        order = constrained_order(node_count, &hard_edges, &order);
    }

    let mut position = vec![0usize; node_count];
    for (idx, node) in order.iter().enumerate() {
        position[*node] = idx;
    }
    edges
        .iter()
        .map(|&(source, target)| source != target && position[source] > position[target])
        .collect()
}

fn greedy_fas_order(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut out_edges: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut in_edges: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut out_deg = vec![0i64; node_count];
    let mut in_deg = vec![0i64; node_count];
    for &(source, target) in edges {
        if source == target {
            continue;
        }
        out_edges[source].push(target);
        in_edges[target].push(source);
        out_deg[source] += 1;
        in_deg[target] += 1;
    }

    let mut alive = vec![true; node_count];
    let mut remaining = node_count;
    let mut left: Vec<usize> = Vec::with_capacity(node_count);
    let mut right: Vec<usize> = Vec::new();

    let remove = |node: usize,
                  alive: &mut [bool],
                  out_deg: &mut [i64],
                  in_deg: &mut [i64]| {
        alive[node] = false;
        for &succ in &out_edges[node] {
            if alive[succ] {
                in_deg[succ] -= 1;
            }
        }
        for &pred in &in_edges[node] {
            if alive[pred] {
                out_deg[pred] -= 1;
            }
        }
    };

    while remaining > 0 {
        while let Some(sink) = (0..node_count).find(|&v| alive[v] && out_deg[v] == 0) {
            remove(sink, &mut alive, &mut out_deg, &mut in_deg);
            right.push(sink);
            remaining -= 1;
        }
        while let Some(source) = (0..node_count).find(|&v| alive[v] && in_deg[v] == 0) {
            remove(source, &mut alive, &mut out_deg, &mut in_deg);
            left.push(source);
            remaining -= 1;
        }
        if remaining == 0 {
            break;
        }
        let mut best: Option<(i64, usize)> = None;
        for v in (0..node_count).filter(|&v| alive[v]) {
            let delta = out_deg[v] - in_deg[v];
            if best.is_none_or(|(best_delta, _)| delta > best_delta) {
                best = Some((delta, v));
            }
        }
        if let Some((_, v)) = best {
            remove(v, &mut alive, &mut out_deg, &mut in_deg);
            left.push(v);
            remaining -= 1;
        }
    }

    right.reverse();
    left.extend(right);
    left
}

/// Topological order of `edges` preferring nodes that come early in `preferred`.
fn constrained_order(node_count: usize, edges: &[(usize, usize)], preferred: &[usize]) -> Vec<usize> {
    let mut priority = vec![0usize; node_count];
    for (idx, node) in preferred.iter().enumerate() {
        priority[*node] = idx;
    }
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indeg = vec![0usize; node_count];
    for &(source, target) in edges {
        if source == target {
            continue;
        }
        adj[source].push(target);
        indeg[target] += 1;
    }

    let mut ready: BinaryHeap<Reverse<(usize, usize)>> = (0..node_count)
        .filter(|&v| indeg[v] == 0)
        .map(|v| Reverse((priority[v], v)))
        .collect();
    let mut processed = vec![false; node_count];
    let mut order = Vec::with_capacity(node_count);
    loop {
        while let Some(Reverse((_, v))) = ready.pop() {
            if processed[v] {
                continue;
            }
            processed[v] = true;
            order.push(v);
            for &w in &adj[v] {
                if processed[w] {
                    continue;
                }
                indeg[w] = indeg[w].saturating_sub(1);
                if indeg[w] == 0 {
                    ready.push(Reverse((priority[w], w)));
                }
            }
        }
        if order.len() >= node_count {
            break;
        }
        // Hard cycle: release the earliest preferred node that is still waiting.
        match (0..node_count)
            .filter(|&v| !processed[v])
            .min_by_key(|&v| priority[v])
        {
            Some(v) => ready.push(Reverse((priority[v], v))),
            None => break,
        }
    }
    order
}
