//! Cycle removal.
//!
//! Sound orders never form cycles, but reasonable and obedient-reasonable
//! edges are heuristic and can. Consumers that serialize the graph into an
//! execution order need a DAG, so after orders are in place the graph is
//! made acyclic by deleting one removable edge per cycle found.
//!
//! The search is an iterative DFS over the children relation. Whenever the
//! walk closes a cycle, one edge on the cyclic segment is deleted and the
//! walk restarts from the same root; nodes fully explored without finding a
//! cycle are closed and never revisited.

use indexmap::IndexSet;
use tracing::debug;

use super::{LandmarkGraph, OrderType};
use crate::error::LandmarkError;
use crate::id::LandmarkId;

/// One step of the DFS path: a node and the edge taken out of it.
type PathStep = (LandmarkId, OrderType);

impl LandmarkGraph {
    /// Deletes removable edges until the graph is acyclic. Returns the
    /// number of edges removed.
    ///
    /// Errors with [`LandmarkError::UnbreakableCycle`] if a cycle consists
    /// of sound edges only, which indicates corrupted orders upstream.
    pub fn acyclify(&mut self) -> Result<usize, LandmarkError> {
        let mut closed: IndexSet<LandmarkId> = IndexSet::new();
        let mut removed = 0;
        for root in self.ids() {
            if !closed.contains(&root) {
                removed += self.break_cycles_from(root, &mut closed)?;
            }
        }
        debug_assert!(self.is_acyclic());
        if removed > 0 {
            debug!(removed, "removed order edges to break cycles");
        }
        Ok(removed)
    }

    /// DFS from `root`, deleting one edge per cycle found and restarting
    /// until the whole subgraph below `root` is closed.
    fn break_cycles_from(
        &mut self,
        root: LandmarkId,
        closed: &mut IndexSet<LandmarkId>,
    ) -> Result<usize, LandmarkError> {
        let mut removed = 0;
        let mut path: Vec<PathStep> = Vec::new();
        let mut on_path: IndexSet<LandmarkId> = IndexSet::new();
        let mut cur = root;
        loop {
            if on_path.contains(&cur) {
                // The walk closed a cycle: it runs from the earlier
                // occurrence of `cur` on the path back to `cur`.
                let start = path
                    .iter()
                    .position(|&(node, _)| node == cur)
                    .unwrap_or(path.len());
                let (parent, child) = pick_cycle_edge(&path[start..], cur)
                    .ok_or(LandmarkError::UnbreakableCycle { id: cur })?;
                self.remove_edge(parent, child);
                removed += 1;
                path.clear();
                on_path.clear();
                cur = root;
                continue;
            }
            on_path.insert(cur);

            let next = self
                .children(cur)
                .find(|(child, _)| !closed.contains(child));
            if let Some((child, ty)) = next {
                path.push((cur, ty));
                cur = child;
                continue;
            }

            // All children closed: close this node and backtrack.
            on_path.swap_remove(&cur);
            closed.insert(cur);
            match path.pop() {
                Some((parent, _)) => cur = parent,
                None => break,
            }
        }
        Ok(removed)
    }
}

/// Chooses which edge of a cycle to delete.
///
/// `segment` holds the steps from the first occurrence of the repeated node
/// up to (not including) its second occurrence; the edge of the final step
/// leads back to `last_child`, closing the cycle.
///
/// Obedient-reasonable edges carry the weakest evidence, so the first one
/// on the segment is taken. Failing that, the last reasonable edge is
/// taken. Cycles made of sound edges only yield `None`.
fn pick_cycle_edge(
    segment: &[PathStep],
    last_child: LandmarkId,
) -> Option<(LandmarkId, LandmarkId)> {
    let child_of = |i: usize| match segment.get(i + 1) {
        Some(&(node, _)) => node,
        None => last_child,
    };
    for (i, &(parent, ty)) in segment.iter().enumerate() {
        if ty == OrderType::ObedientReasonable {
            return Some((parent, child_of(i)));
        }
    }
    let mut weakest = None;
    for (i, &(parent, ty)) in segment.iter().enumerate() {
        if ty == OrderType::Reasonable {
            weakest = Some((parent, child_of(i)));
        }
    }
    weakest
}
