//! Ranked left-to-right layout for table nodes.
//!
//! Phases: rank assignment with cycle breaking, ordering within ranks,
//! vertical stacking per rank, conversion from center to top-left anchors,
//! then orthogonal edge routing with label anchors.

mod engine;
mod placement;
mod ranking;
mod routing;
mod types;

pub use engine::LayoutEngine;
pub use ranking::{Ranking, assign_ranks};
pub use types::{EdgeLabel, Layout, LayoutConfig, LayoutEdge, LayoutNode};
