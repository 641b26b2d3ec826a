//! Stable landmark node handles.
//!
//! [`LandmarkId`] is a newtype over `u32` bridging to petgraph's
//! `NodeIndex<u32>`. Handles stay valid for the lifetime of the graph:
//! landmark nodes are never deleted, only their edges change.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Stable landmark node identifier. Maps to a petgraph `NodeIndex<u32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LandmarkId(pub u32);

impl fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NodeIndex<u32>> for LandmarkId {
    fn from(idx: NodeIndex<u32>) -> Self {
        LandmarkId(idx.index() as u32)
    }
}

impl From<LandmarkId> for NodeIndex<u32> {
    fn from(id: LandmarkId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}
