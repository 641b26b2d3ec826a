//! Per-variable domain transition graphs.
//!
//! For each variable, the graph of value-to-value transitions induced by the
//! operator set. An effect with a required previous value contributes one
//! transition; an effect without one can fire from any value, so it
//! contributes a transition from every other value. Conditional effects
//! count like unconditional ones -- the landmark engine only asks for
//! *possible* successors.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::id::VarId;
use crate::task::PlanningTask;

/// Value transition graph of a single variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainTransitionGraph {
    /// `successors[value]` -> values reachable in one operator application.
    successors: Vec<IndexSet<u32>>,
}

impl DomainTransitionGraph {
    /// Values directly reachable from `value`.
    pub fn successors(&self, value: u32) -> &IndexSet<u32> {
        &self.successors[value as usize]
    }
}

/// Builds one transition graph per task variable.
pub fn build_transition_graphs(task: &PlanningTask) -> Vec<DomainTransitionGraph> {
    let mut graphs: Vec<DomainTransitionGraph> = task
        .variables()
        .iter()
        .map(|var| DomainTransitionGraph {
            successors: vec![IndexSet::new(); var.domain as usize],
        })
        .collect();
    for op in task.operators() {
        for effect in op.effects() {
            let dtg = &mut graphs[effect.var.index()];
            match effect.pre {
                Some(pre) => {
                    dtg.successors[pre as usize].insert(effect.post);
                }
                None => {
                    for value in 0..task.domain(effect.var) {
                        if value != effect.post {
                            dtg.successors[value as usize].insert(effect.post);
                        }
                    }
                }
            }
        }
    }
    graphs
}

/// Convenience lookup over the per-variable graphs.
pub fn successors(graphs: &[DomainTransitionGraph], var: VarId, value: u32) -> &IndexSet<u32> {
    graphs[var.index()].successors(value)
}
