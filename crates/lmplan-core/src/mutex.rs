//! Fact inconsistency (mutex) table.
//!
//! Built once from the task's invariant groups: within each group, at most
//! one fact can hold in any reachable state, so all pairs are mutually
//! exclusive. Two different values of the same variable are always mutex,
//! whether or not any groups were supplied.

use indexmap::IndexSet;

use crate::fact::Fact;
use crate::task::PlanningTask;

/// Pairwise fact-inconsistency lookup.
#[derive(Debug, Clone)]
pub struct InconsistencyTable {
    /// `[var][value]` -> facts known to be mutex with (var, value),
    /// excluding the implicit same-variable pairs.
    mutexes: Vec<Vec<IndexSet<Fact>>>,
}

impl InconsistencyTable {
    /// Builds the table from the task's invariant groups.
    pub fn from_task(task: &PlanningTask) -> Self {
        let mut mutexes: Vec<Vec<IndexSet<Fact>>> = task
            .variables()
            .iter()
            .map(|var| vec![IndexSet::new(); var.domain as usize])
            .collect();
        for group in task.mutex_groups() {
            for &a in group {
                for &b in group {
                    if a != b {
                        mutexes[a.var.index()][a.value as usize].insert(b);
                    }
                }
            }
        }
        InconsistencyTable { mutexes }
    }

    /// Returns `true` if `a` and `b` can never hold together.
    ///
    /// A fact is never mutex with itself.
    pub fn are_mutex(&self, a: Fact, b: Fact) -> bool {
        if a == b {
            return false;
        }
        if a.var == b.var {
            return true;
        }
        self.mutexes[a.var.index()][a.value as usize].contains(&b)
    }
}
