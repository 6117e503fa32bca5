//! Layout engine core implementation.

use crate::model::{Position, Relationship, Table};
use std::collections::HashMap;

use super::placement::{group_by_rank, order_within_ranks, place_nodes, to_top_left};
use super::ranking::assign_ranks;
use super::routing::{label_anchor, route_backward, route_forward, route_same_rank, route_self_ref};
use super::types::{EdgeLabel, Layout, LayoutConfig, LayoutEdge, LayoutNode};

/// Layout engine configuration and computation.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    pub config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Compute layout for the given tables and relationships.
    ///
    /// Output depends only on input order, column counts and edges, never on
    /// the tables' current positions, so calling it again on its own result
    /// gives the same answer.
    pub fn layout(&self, tables: &[Table], relationships: &[Relationship]) -> Layout {
        let index: HashMap<&str, usize> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();

        // Phase 1: Edge collection
        let mut edges: Vec<(usize, usize)> = Vec::new();
        let mut edge_rels: Vec<&Relationship> = Vec::new();
        for rel in relationships {
            match (index.get(rel.source.as_str()), index.get(rel.target.as_str())) {
                (Some(&from), Some(&to)) => {
                    edges.push((from, to));
                    edge_rels.push(rel);
                }
                _ => log::debug!("Layout skips relationship {} with a missing end", rel.id),
            }
        }

        // Phase 2: Ranking
        let ranking = assign_ranks(tables.len(), &edges);

        // Phase 3: Ordering within ranks
        let mut groups = group_by_rank(&ranking.ranks, ranking.rank_count());
        order_within_ranks(&mut groups, tables.len(), &edges, &ranking.ignored);

        // Phase 4: Node sizing and placement
        let heights: Vec<f64> = tables
            .iter()
            .map(|t| self.config.node.height(t.columns.len()))
            .collect();
        let placement = place_nodes(&groups, &heights, &self.config);

        let nodes: Vec<LayoutNode> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let (x, y) = to_top_left(placement.centers[i], self.config.node.width, heights[i]);
                LayoutNode {
                    id: t.id.clone(),
                    rank: ranking.ranks[i],
                    x,
                    y,
                    width: self.config.node.width,
                    height: heights[i],
                }
            })
            .collect();

        // Phase 5: Edge routing
        let gutter = self.config.rank_sep / 2.0;
        let top_y = self.config.margin / 2.0;
        let layout_edges = edges
            .iter()
            .zip(&edge_rels)
            .enumerate()
            .map(|(idx, (&(from, to), rel))| {
                let (a, b) = (&nodes[from], &nodes[to]);
                let waypoints = if from == to {
                    route_self_ref(a, self.config.self_loop_offset)
                } else if a.rank < b.rank {
                    route_forward(a, b)
                } else if a.rank == b.rank {
                    route_same_rank(a, b, gutter)
                } else {
                    route_backward(a, b, gutter, top_y)
                };
                let label = self.place_label(rel, &waypoints);
                LayoutEdge {
                    id: rel.id.clone(),
                    from: rel.source.clone(),
                    to: rel.target.clone(),
                    waypoints,
                    is_self_ref: from == to,
                    is_back_edge: ranking.ignored[idx] && from != to,
                    label,
                }
            })
            .collect();

        Layout {
            nodes,
            edges: layout_edges,
            width: placement.total_width,
            height: placement.total_height,
        }
    }

    /// Copy of `tables` with positions from a fresh layout.
    pub fn arrange(&self, tables: &[Table], relationships: &[Relationship]) -> Vec<Table> {
        let layout = self.layout(tables, relationships);
        tables
            .iter()
            .zip(&layout.nodes)
            .map(|(table, node)| Table {
                position: Position::new(node.x, node.y),
                ..table.clone()
            })
            .collect()
    }

    fn place_label(&self, rel: &Relationship, waypoints: &[(f64, f64)]) -> Option<EdgeLabel> {
        let text = rel.label.as_deref().filter(|l| !l.trim().is_empty())?;
        let (x, y) = label_anchor(waypoints)?;
        let (width, height) = self.config.text.label_size(text);
        Some(EdgeLabel {
            text: text.to_string(),
            x,
            y,
            width,
            height,
        })
    }
}
