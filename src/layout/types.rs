//! Data structures for layout computation.

use crate::measure::{NodeMetrics, TextMetrics};
use serde::{Deserialize, Serialize};

/// Spacing and sizing knobs for the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node: NodeMetrics,
    pub text: TextMetrics,
    /// Horizontal gap between ranks
    pub rank_sep: f64,
    /// Vertical gap between nodes of one rank
    pub node_sep: f64,
    /// Empty border around the whole drawing
    pub margin: f64,
    /// How far a self-reference loop sticks out of its node
    pub self_loop_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node: NodeMetrics::default(),
            text: TextMetrics::default(),
            rank_sep: 120.0,
            node_sep: 80.0,
            margin: 40.0,
            self_loop_offset: 25.0,
        }
    }
}

/// A positioned node; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub rank: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutNode {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Where an edge label is drawn, centered on `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// An edge with computed waypoints for orthogonal routing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    /// Orthogonal path points (start, turns, end)
    pub waypoints: Vec<(f64, f64)>,
    pub is_self_ref: bool,
    /// Ignored while ranking to break a cycle
    pub is_back_edge: bool,
    pub label: Option<EdgeLabel>,
}

/// The complete layout result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub width: f64,
    pub height: f64,
}
