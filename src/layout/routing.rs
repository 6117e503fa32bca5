//! Edge routing and label anchors.
//!
//! Edges leave a node on its right side and enter on the left side.

use super::types::LayoutNode;

/// Loop on the right side of a self-referencing node.
pub fn route_self_ref(node: &LayoutNode, loop_offset: f64) -> Vec<(f64, f64)> {
    let x = node.right();
    let y_top = node.y + node.height * 0.3;
    let y_bottom = node.y + node.height * 0.7;

    vec![
        (x, y_top),
        (x + loop_offset, y_top),
        (x + loop_offset, y_bottom),
        (x, y_bottom),
    ]
}

/// Edge into a later rank, turning once in the gap between the two.
pub fn route_forward(from_node: &LayoutNode, to_node: &LayoutNode) -> Vec<(f64, f64)> {
    let from = (from_node.right(), from_node.center_y());
    let to = (to_node.x, to_node.center_y());

    if (from.1 - to.1).abs() < f64::EPSILON {
        return vec![from, to];
    }
    let mid_x = from.0 + (to.0 - from.0) / 2.0;
    vec![from, (mid_x, from.1), (mid_x, to.1), to]
}

/// Edge between two nodes stacked in the same rank, via the right-hand gutter.
pub fn route_same_rank(
    from_node: &LayoutNode,
    to_node: &LayoutNode,
    gutter: f64,
) -> Vec<(f64, f64)> {
    let x = from_node.right().max(to_node.right()) + gutter;
    let from_y = from_node.center_y();
    let to_y = to_node.center_y();

    vec![
        (from_node.right(), from_y),
        (x, from_y),
        (x, to_y),
        (to_node.right(), to_y),
    ]
}

/// Edge into an earlier rank. Runs along `top_y`, above every node.
pub fn route_backward(
    from_node: &LayoutNode,
    to_node: &LayoutNode,
    gutter: f64,
    top_y: f64,
) -> Vec<(f64, f64)> {
    let exit_x = from_node.right() + gutter;
    let entry_x = to_node.x - gutter;
    let from_y = from_node.center_y();
    let to_y = to_node.center_y();

    vec![
        (from_node.right(), from_y),
        (exit_x, from_y),
        (exit_x, top_y),
        (entry_x, top_y),
        (entry_x, to_y),
        (to_node.x, to_y),
    ]
}

/// Midpoint of the middle segment of a path.
pub fn label_anchor(waypoints: &[(f64, f64)]) -> Option<(f64, f64)> {
    if waypoints.len() < 2 {
        return None;
    }
    let seg = (waypoints.len() - 2) / 2;
    let (a, b) = (waypoints[seg], waypoints[seg + 1]);
    Some(((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0))
}
