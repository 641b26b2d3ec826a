//! Ordering relation types between landmarks.
//!
//! The derived `Ord` is the strength order used by the edge upgrade rules:
//! later variants are stronger. Greedy-necessary is the strongest sound
//! order; reasonable and obedient-reasonable are heuristic, may be wrong,
//! and are the only types the cycle breaker is allowed to remove.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A directed ordering relation between two landmarks, in increasing
/// strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Reasonable order computed under the assumption that only already
    /// reasonably-ordered predecessors are obeyed. Weakest evidence.
    ObedientReasonable,
    /// Heuristic order: achieving the target before the source would force
    /// redundant work. May be wrong, may introduce cycles.
    Reasonable,
    /// Informational sound order; not produced by discovery but
    /// representable.
    Natural,
    /// Sound order derived from relaxed-reachability gaps or from
    /// single-variable domain connectivity.
    LookaheadNecessary,
    /// Every operator that can first achieve the target requires the
    /// source. The strongest sound order.
    GreedyNecessary,
}

impl OrderType {
    /// Sound orders are trusted and never removed by acyclification.
    pub fn is_sound(self) -> bool {
        matches!(
            self,
            OrderType::Natural | OrderType::LookaheadNecessary | OrderType::GreedyNecessary
        )
    }

    /// Heuristic orders are the only candidates for cycle removal and the
    /// only types allowed to oppose an existing edge.
    pub fn is_removable(self) -> bool {
        matches!(self, OrderType::Reasonable | OrderType::ObedientReasonable)
    }

    /// Short label used in graph dumps.
    pub fn label(self) -> &'static str {
        match self {
            OrderType::Natural => "n",
            OrderType::GreedyNecessary => "gn",
            OrderType::LookaheadNecessary => "ln",
            OrderType::Reasonable => "r",
            OrderType::ObedientReasonable => "o_r",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
