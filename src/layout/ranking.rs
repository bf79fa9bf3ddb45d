use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Directed constraint `rank(target) >= rank(source) + min_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RankEdge {
    pub source: usize,
    pub target: usize,
    pub min_len: usize,
}

/// Longest-path ranking over an acyclic constraint graph, followed by a pass that pulls
/// sources down toward their successors. The smallest rank is always 0.
///
/// Ties in the topological order go to the lowest node index, so node declaration order
/// decides the outcome whenever the constraints do not.
pub(super) fn assign_ranks(node_count: usize, edges: &[RankEdge]) -> Vec<usize> {
    let mut adj: Vec<Vec<(usize, usize)>> = vec![Vec::new(); node_count];
    let mut rev: Vec<Vec<(usize, usize)>> = vec![Vec::new(); node_count];
    for edge in edges {
        if edge.source == edge.target {
            continue;
        }
        adj[edge.source].push((edge.target, edge.min_len));
        rev[edge.target].push((edge.source, edge.min_len));
    }

    let order = topological_order(node_count, &adj, &rev);
    let mut position = vec![0usize; node_count];
    for (idx, node) in order.iter().enumerate() {
        position[*node] = idx;
    }

    let mut ranks = vec![0usize; node_count];
    for &node in &order {
        let rank = ranks[node];
        for &(next, min_len) in &adj[node] {
            if position[next] <= position[node] {
                continue;
            }
            ranks[next] = ranks[next].max(rank + min_len);
        }
    }

    tighten_sources(&order, &adj, &rev, &mut ranks);

    let min_rank = ranks.iter().copied().min().unwrap_or(0);
    for rank in &mut ranks {
        *rank -= min_rank;
    }
    ranks
}

fn topological_order(
    node_count: usize,
    adj: &[Vec<(usize, usize)>],
    rev: &[Vec<(usize, usize)>],
) -> Vec<usize> {
    let mut indeg: Vec<usize> = rev.iter().map(Vec::len).collect();
    let mut ready: BinaryHeap<Reverse<usize>> = (0..node_count)
        .filter(|&id| indeg[id] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(node_count);
    let mut processed = vec![false; node_count];
    loop {
        while let Some(Reverse(id)) = ready.pop() {
            if processed[id] {
                continue;
            }
            order.push(id);
            processed[id] = true;
            for &(next, _) in &adj[id] {
                if processed[next] {
                    continue;
                }
                indeg[next] = indeg[next].saturating_sub(1);
                if indeg[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() >= node_count {
            break;
        }

        // Leftover cycle: restart from the earliest unprocessed node and treat its
        // remaining incoming edges as back-edges.
        match (0..node_count).find(|&id| !processed[id]) {
            Some(id) => ready.push(Reverse(id)),
            None => break,
        }
    }
    order
}

/// Sources with successors move to the lowest rank their out-edges allow.
fn tighten_sources(
    order: &[usize],
    adj: &[Vec<(usize, usize)>],
    rev: &[Vec<(usize, usize)>],
    ranks: &mut [usize],
) {
    for &node in order.iter().rev() {
        if !rev[node].is_empty() || adj[node].is_empty() {
            continue;
        }
        let limit = adj[node]
            .iter()
            .map(|&(next, min_len)| ranks[next].saturating_sub(min_len))
            .min()
            .unwrap_or(ranks[node]);
        if limit > ranks[node] {
            ranks[node] = limit;
        }
    }
}
