//! Error types for the landmark engine.
//!
//! Uses `thiserror` for structured, matchable error variants. These are the
//! fail-fast internal contract violations: each one indicates that
//! continuing would produce an unsound landmark graph, so construction is
//! aborted instead.

use lmplan_core::Fact;
use thiserror::Error;

use crate::id::LandmarkId;

/// Errors produced by the lmplan-landmarks crate.
#[derive(Debug, Error)]
pub enum LandmarkError {
    /// Attempting to register a simple landmark for a fact that is already
    /// covered by a landmark.
    #[error("duplicate landmark for fact {fact}")]
    DuplicateLandmark { fact: Fact },

    /// A disjunctive landmark candidate contains a fact that already exists
    /// as a simple landmark.
    #[error("disjunctive landmark member {fact} already exists as a simple landmark")]
    DisjunctiveOverlapsSimple { fact: Fact },

    /// A disjunctive landmark was requested with fewer than two facts.
    #[error("disjunctive landmark needs at least two facts, got {count}")]
    DisjunctiveTooSmall { count: usize },

    /// No operator can achieve a landmark whose cost is being computed.
    /// For a solvable task every expanded landmark has an achiever, so this
    /// indicates an unsolvable task or a logic error upstream.
    #[error("landmark {id} has no achieving operator under the current reachability")]
    NoAchievers { id: LandmarkId },

    /// A cycle was found that contains no reasonable or obedient-reasonable
    /// edge. Sound edge types never form cycles, so this indicates a logic
    /// error upstream.
    #[error("cycle through landmark {id} contains no removable edge")]
    UnbreakableCycle { id: LandmarkId },
}
