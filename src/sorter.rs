//! Outline ordering.
//!
//! Every mode is applied independently at each depth of the tree, so
//! members stay under their container. Sorting is stable and never adds or
//! removes nodes.

use std::cmp::Ordering;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::types::OutlineNode;

/// Total order used when displaying an outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Ascending declaration line.
    #[default]
    Position,
    /// Ascending name (byte order).
    Name,
    /// Kind rank first, then name.
    Category,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Position => "position",
            SortMode::Name => "name",
            SortMode::Category => "category",
        }
    }

    fn compare(self, a: &OutlineNode, b: &OutlineNode) -> Ordering {
        match self {
            SortMode::Position => a.line.cmp(&b.line),
            SortMode::Name => a.name.cmp(&b.name),
            SortMode::Category => a
                .kind
                .category_rank()
                .cmp(&b.kind.category_rank())
                .then_with(|| a.name.cmp(&b.name)),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return a sorted copy of `nodes`; the input is left untouched.
pub fn sort_nodes(nodes: &[OutlineNode], mode: SortMode) -> Vec<OutlineNode> {
    let mut sorted = nodes.to_vec();
    sort_in_place(&mut sorted, mode);
    sorted
}

/// Sort `nodes` and every child list beneath them.
pub fn sort_in_place(nodes: &mut [OutlineNode], mode: SortMode) {
    nodes.sort_by(|a, b| mode.compare(a, b));
    for node in nodes.iter_mut() {
        if let Some(children) = node.children.as_mut() {
            sort_in_place(children, mode);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
