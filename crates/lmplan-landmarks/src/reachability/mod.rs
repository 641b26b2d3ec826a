//! Relaxed-reachability oracle contract.
//!
//! Discovery needs to know, for every fact, the earliest delete-relaxed
//! step at which it becomes reachable when the landmark under expansion is
//! excluded. The oracle is a trait so the engine can run against any
//! reachability implementation; [`relaxed::DeleteRelaxation`] is the
//! reference one.
//!
//! Levels are step indices; [`UNREACHABLE`] marks facts (or operators) that
//! never become reachable under the given exclusions.

pub mod relaxed;

use lmplan_core::{Fact, OpId, PlanningTask};

pub use relaxed::DeleteRelaxation;

/// Level value for facts and operators that stay unreachable.
pub const UNREACHABLE: u32 = u32::MAX;

/// One reachability request: the exclusions plus whether operator levels
/// are wanted (fact levels are always computed).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReachabilityQuery<'a> {
    /// Facts that may never become true. Propagation must not use them,
    /// even if they hold in the initial state.
    pub excluded_facts: &'a [Fact],
    /// Operators that may not fire at all.
    pub excluded_operators: &'a [OpId],
    /// Whether per-operator levels should be computed alongside.
    pub compute_operator_levels: bool,
}

/// Earliest relaxed step per fact, indexed `[variable][value]`.
#[derive(Debug, Clone)]
pub struct FactLevels {
    levels: Vec<Vec<u32>>,
}

impl FactLevels {
    /// All-unreachable table shaped after the task's variables.
    pub fn unreachable(task: &PlanningTask) -> Self {
        FactLevels {
            levels: task
                .variables()
                .iter()
                .map(|var| vec![UNREACHABLE; var.domain as usize])
                .collect(),
        }
    }

    pub fn level(&self, fact: Fact) -> u32 {
        self.levels[fact.var.index()][fact.value as usize]
    }

    pub fn is_reached(&self, fact: Fact) -> bool {
        self.level(fact) != UNREACHABLE
    }

    pub(crate) fn set(&mut self, fact: Fact, level: u32) {
        self.levels[fact.var.index()][fact.value as usize] = level;
    }
}

/// Earliest relaxed step per operator.
#[derive(Debug, Clone)]
pub struct OperatorLevels {
    levels: Vec<u32>,
}

impl OperatorLevels {
    pub(crate) fn unreachable(num_operators: usize) -> Self {
        OperatorLevels {
            levels: vec![UNREACHABLE; num_operators],
        }
    }

    pub fn level(&self, op: OpId) -> u32 {
        self.levels[op.index()]
    }

    pub fn is_reached(&self, op: OpId) -> bool {
        self.level(op) != UNREACHABLE
    }

    pub(crate) fn set(&mut self, op: OpId, level: u32) {
        self.levels[op.index()] = level;
    }
}

/// Result of one oracle run.
#[derive(Debug, Clone)]
pub struct ReachabilityLevels {
    pub facts: FactLevels,
    /// Present only when the query asked for operator levels.
    pub operators: Option<OperatorLevels>,
}

/// The relaxed-reachability oracle consumed by discovery.
///
/// Implementations must treat the query as a pure function: same exclusions,
/// same levels. Scratch-buffer reuse across calls is an implementation
/// concern and must not leak into results.
pub trait ReachabilityOracle {
    fn reachability(&self, query: ReachabilityQuery<'_>) -> ReachabilityLevels;
}
