//! Rank assignment (horizontal layers).
//!
//! Edges point from lower to higher rank. Cycles are broken by a depth-first
//! search in node input order: an edge reaching a node still on the search
//! stack is a back edge and does not constrain ranking. Self loops never
//! constrain ranking. Ranks are longest-path depths, after which each source
//! is pulled right to sit one rank before its nearest successor.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Node index -> rank
    pub ranks: Vec<usize>,
    /// Edge index -> ignored while ranking
    pub ignored: Vec<bool>,
}

impl Ranking {
    pub fn rank_count(&self) -> usize {
        self.ranks.iter().max().map_or(0, |r| r + 1)
    }
}

/// Find back edges and self loops.
pub fn find_ignored_edges(node_count: usize, edges: &[(usize, usize)]) -> Vec<bool> {
    let mut ignored: Vec<bool> = edges.iter().map(|(from, to)| from == to).collect();

    let mut out: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (idx, &(from, to)) in edges.iter().enumerate() {
        if from != to {
            out[from].push(idx);
        }
    }

    // 0 = unvisited, 1 = on stack, 2 = done
    let mut state = vec![0u8; node_count];
    for root in 0..node_count {
        if state[root] != 0 {
            continue;
        }
        state[root] = 1;
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            if top.1 < out[node].len() {
                let edge = out[node][top.1];
                top.1 += 1;
                let next = edges[edge].1;
                match state[next] {
                    0 => {
                        state[next] = 1;
                        stack.push((next, 0));
                    }
                    1 => {
                        log::debug!("Ignoring back edge {} -> {} while ranking", node, next);
                        ignored[edge] = true;
                    }
                    _ => {}
                }
            } else {
                state[node] = 2;
                stack.pop();
            }
        }
    }

    ignored
}

/// Assign a rank to each of `node_count` nodes.
pub fn assign_ranks(node_count: usize, edges: &[(usize, usize)]) -> Ranking {
    let ignored = find_ignored_edges(node_count, edges);

    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indegree = vec![0usize; node_count];
    for (idx, &(from, to)) in edges.iter().enumerate() {
        if !ignored[idx] {
            succs[from].push(to);
            indegree[to] += 1;
        }
    }

    // Longest path over the acyclic part, Kahn order
    let mut ranks = vec![0usize; node_count];
    let mut remaining = indegree.clone();
    let mut queue: VecDeque<usize> = (0..node_count).filter(|&n| remaining[n] == 0).collect();
    while let Some(node) = queue.pop_front() {
        for &next in &succs[node] {
            ranks[next] = ranks[next].max(ranks[node] + 1);
            remaining[next] -= 1;
            if remaining[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    for node in 0..node_count {
        if indegree[node] == 0 {
            if let Some(nearest) = succs[node].iter().map(|&s| ranks[s]).min() {
                ranks[node] = nearest.saturating_sub(1);
            }
        }
    }

    compact(&mut ranks);
    Ranking { ranks, ignored }
}

/// Renumber ranks so no layer is empty.
fn compact(ranks: &mut [usize]) {
    let mut used: Vec<usize> = ranks.to_vec();
    used.sort_unstable();
    used.dedup();
    for rank in ranks.iter_mut() {
        if let Ok(pos) = used.binary_search(rank) {
            *rank = pos;
        }
    }
}
