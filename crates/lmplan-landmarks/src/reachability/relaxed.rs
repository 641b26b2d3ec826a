//! Reference delete-relaxation oracle.
//!
//! Computes exact earliest levels by layered fixpoint propagation over the
//! operator set, ignoring deletes: a fact, once reached, stays reached. An
//! effect fires at layer `k` when its operator's prevail conditions, its
//! own precondition value, and its effect conditions are all reached at
//! layers `< k`. Excluded facts never enter the table, excluded operators
//! never fire.

use tracing::trace;

use lmplan_core::{Fact, OpId, PlanningTask, VarId};

use super::{
    FactLevels, OperatorLevels, ReachabilityLevels, ReachabilityOracle, ReachabilityQuery,
};

/// Delete-relaxation reachability over a borrowed task.
#[derive(Debug, Clone, Copy)]
pub struct DeleteRelaxation<'a> {
    task: &'a PlanningTask,
}

impl<'a> DeleteRelaxation<'a> {
    pub fn new(task: &'a PlanningTask) -> Self {
        DeleteRelaxation { task }
    }
}

impl ReachabilityOracle for DeleteRelaxation<'_> {
    fn reachability(&self, query: ReachabilityQuery<'_>) -> ReachabilityLevels {
        let task = self.task;
        let mut facts = FactLevels::unreachable(task);
        let mut operators = query
            .compute_operator_levels
            .then(|| OperatorLevels::unreachable(task.num_operators()));

        let excluded =
            |fact: Fact| -> bool { query.excluded_facts.contains(&fact) };

        for (i, &value) in task.initial().values().iter().enumerate() {
            let fact = Fact::new(VarId(i as u32), value);
            if !excluded(fact) {
                facts.set(fact, 0);
            }
        }

        let mut layer = 0u32;
        loop {
            layer += 1;
            // Facts found in this pass become reachable at `layer`; they may
            // not feed other operators within the same pass.
            let mut new_facts: Vec<Fact> = Vec::new();
            for (i, op) in task.operators().iter().enumerate() {
                let op_id = OpId(i as u32);
                if query.excluded_operators.contains(&op_id) {
                    continue;
                }
                if !op.prevails().iter().all(|&p| facts.is_reached(p)) {
                    continue;
                }
                if let Some(op_levels) = operators.as_mut() {
                    let applicable = op
                        .effects()
                        .iter()
                        .filter_map(|e| e.precondition())
                        .all(|pre| facts.is_reached(pre));
                    if applicable && !op_levels.is_reached(op_id) {
                        op_levels.set(op_id, layer - 1);
                    }
                }
                for effect in op.effects() {
                    let fact = effect.fact();
                    if facts.is_reached(fact) || excluded(fact) {
                        continue;
                    }
                    let pre_ok = effect
                        .precondition()
                        .map_or(true, |pre| facts.is_reached(pre));
                    let conds_ok = effect.conditions.iter().all(|&c| facts.is_reached(c));
                    if pre_ok && conds_ok && !new_facts.contains(&fact) {
                        new_facts.push(fact);
                    }
                }
            }
            if new_facts.is_empty() {
                break;
            }
            for fact in new_facts {
                facts.set(fact, layer);
            }
        }
        trace!(
            layers = layer - 1,
            excluded_facts = query.excluded_facts.len(),
            excluded_operators = query.excluded_operators.len(),
            "relaxed fixpoint finished"
        );

        ReachabilityLevels { facts, operators }
    }
}
