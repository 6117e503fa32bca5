//! Node ordering and placement.

use super::types::LayoutConfig;

/// Group node indices by rank, keeping input order inside each rank.
pub fn group_by_rank(ranks: &[usize], rank_count: usize) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    for (node, &rank) in ranks.iter().enumerate() {
        groups[rank].push(node);
    }
    groups
}

/// Order nodes inside each rank by the mean position of their predecessors.
///
/// One left-to-right sweep. Nodes without ranked predecessors keep their
/// slot; ties fall back to input order.
pub fn order_within_ranks(
    groups: &mut [Vec<usize>],
    node_count: usize,
    edges: &[(usize, usize)],
    ignored: &[bool],
) {
    let mut slot = vec![0usize; node_count];
    for group in groups.iter() {
        for (idx, &node) in group.iter().enumerate() {
            slot[node] = idx;
        }
    }

    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (idx, &(from, to)) in edges.iter().enumerate() {
        if !ignored[idx] {
            preds[to].push(from);
        }
    }

    for group in groups.iter_mut().skip(1) {
        let mut keyed: Vec<(f64, usize, usize)> = group
            .iter()
            .enumerate()
            .map(|(idx, &node)| {
                let key = if preds[node].is_empty() {
                    idx as f64
                } else {
                    let sum: f64 = preds[node].iter().map(|&p| slot[p] as f64).sum();
                    sum / preds[node].len() as f64
                };
                (key, node, idx)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.2.cmp(&b.2)));

        *group = keyed.into_iter().map(|(_, node, _)| node).collect();
        for (idx, &node) in group.iter().enumerate() {
            slot[node] = idx;
        }
    }
}

/// Result of node placement phase, in center-anchored coordinates.
pub struct NodePlacement {
    /// Node index -> (center x, center y)
    pub centers: Vec<(f64, f64)>,
    pub total_width: f64,
    pub total_height: f64,
}

/// Stack each rank vertically and space ranks horizontally.
///
/// Ranks are centered against the tallest one.
pub fn place_nodes(groups: &[Vec<usize>], heights: &[f64], config: &LayoutConfig) -> NodePlacement {
    let width = config.node.width;
    let mut centers = vec![(0.0, 0.0); heights.len()];

    let column_height = |group: &[usize]| -> f64 {
        let sum: f64 = group.iter().map(|&n| heights[n]).sum();
        sum + group.len().saturating_sub(1) as f64 * config.node_sep
    };
    let tallest = groups.iter().map(|g| column_height(g)).fold(0.0, f64::max);

    for (rank, group) in groups.iter().enumerate() {
        let cx = config.margin + rank as f64 * (width + config.rank_sep) + width / 2.0;
        let mut y = config.margin + (tallest - column_height(group)) / 2.0;
        for &node in group {
            let h = heights[node];
            centers[node] = (cx, y + h / 2.0);
            y += h + config.node_sep;
        }
    }

    let (total_width, total_height) = if groups.is_empty() {
        (0.0, 0.0)
    } else {
        let ranks = groups.len() as f64;
        (
            config.margin * 2.0 + ranks * width + (ranks - 1.0) * config.rank_sep,
            config.margin * 2.0 + tallest,
        )
    };

    NodePlacement {
        centers,
        total_width,
        total_height,
    }
}

/// Shift a center-anchored point to the top-left corner of its box.
#[inline]
pub fn to_top_left((cx, cy): (f64, f64), width: f64, height: f64) -> (f64, f64) {
    (cx - width / 2.0, cy - height / 2.0)
}
