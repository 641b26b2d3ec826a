//! Fact-to-operator lookup tables.
//!
//! Discovery asks "which operators can achieve fact F" and "which operators
//! require fact F" once per open landmark; [`OperatorIndex`] precomputes
//! both answers for every fact so those queries never scan the operator
//! set. Built once per task, read-only afterwards.

use lmplan_core::{Fact, OpId, PlanningTask};

/// Per-fact operator lookup, indexed by `[variable][value]`.
#[derive(Debug, Clone)]
pub struct OperatorIndex {
    /// Operators with an effect producing the fact, conditional or not.
    achievers: Vec<Vec<Vec<OpId>>>,
    /// Operators with a prevail condition or effect precondition on the
    /// fact. Effect conditions are not preconditions and are not indexed.
    requirers: Vec<Vec<Vec<OpId>>>,
    /// Operators with no prevail conditions and no effect preconditions.
    no_precondition: Vec<OpId>,
}

impl OperatorIndex {
    pub fn new(task: &PlanningTask) -> Self {
        let shape = |task: &PlanningTask| -> Vec<Vec<Vec<OpId>>> {
            task.variables()
                .iter()
                .map(|var| vec![Vec::new(); var.domain as usize])
                .collect()
        };
        let mut achievers = shape(task);
        let mut requirers = shape(task);
        let mut no_precondition = Vec::new();

        for (op_id, op) in task.operators().iter().enumerate() {
            let op_id = OpId(op_id as u32);
            for prevail in op.prevails() {
                requirers[prevail.var.index()][prevail.value as usize].push(op_id);
            }
            for effect in op.effects() {
                achievers[effect.var.index()][effect.post as usize].push(op_id);
                if let Some(pre) = effect.pre {
                    requirers[effect.var.index()][pre as usize].push(op_id);
                }
            }
            if op.has_no_preconditions() {
                no_precondition.push(op_id);
            }
        }

        OperatorIndex {
            achievers,
            requirers,
            no_precondition,
        }
    }

    /// Operators with an effect (conditional or not) producing `fact`.
    pub fn achievers(&self, fact: Fact) -> &[OpId] {
        &self.achievers[fact.var.index()][fact.value as usize]
    }

    /// Operators requiring `fact` as a prevail condition or effect
    /// precondition.
    pub fn requirers(&self, fact: Fact) -> &[OpId] {
        &self.requirers[fact.var.index()][fact.value as usize]
    }

    /// Operators applicable in any state.
    pub fn no_precondition_operators(&self) -> &[OpId] {
        &self.no_precondition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmplan_core::{Effect, Fact, Operator, PlanningTask, State, VarId, Variable};

    fn fact(var: u32, value: u32) -> Fact {
        Fact::new(VarId(var), value)
    }

    fn two_var_task() -> PlanningTask {
        let variables = vec![
            Variable::new("v0", 2),
            Variable::new("v1", 2),
        ];
        let a = Operator::new("a", vec![], vec![Effect::new(VarId(0), Some(0), 1)], 1.0);
        let b = Operator::new(
            "b",
            vec![fact(0, 1)],
            vec![Effect::new(VarId(1), None, 1)],
            1.0,
        );
        let free = Operator::new("free", vec![], vec![Effect::new(VarId(1), None, 0)], 0.0);
        PlanningTask::new(
            variables,
            State::new(vec![0, 0]),
            vec![fact(1, 1)],
            vec![a, b, free],
        )
        .unwrap()
    }

    #[test]
    fn achievers_index_effects() {
        let index = OperatorIndex::new(&two_var_task());
        assert_eq!(index.achievers(fact(0, 1)), &[OpId(0)]);
        assert_eq!(index.achievers(fact(1, 1)), &[OpId(1)]);
        assert_eq!(index.achievers(fact(1, 0)), &[OpId(2)]);
        assert!(index.achievers(fact(0, 0)).is_empty());
    }

    #[test]
    fn requirers_index_prevails_and_effect_preconditions() {
        let index = OperatorIndex::new(&two_var_task());
        // Effect precondition of `a`.
        assert_eq!(index.requirers(fact(0, 0)), &[OpId(0)]);
        // Prevail condition of `b`.
        assert_eq!(index.requirers(fact(0, 1)), &[OpId(1)]);
        assert!(index.requirers(fact(1, 0)).is_empty());
    }

    #[test]
    fn precondition_free_operators_are_marked() {
        let index = OperatorIndex::new(&two_var_task());
        assert_eq!(index.no_precondition_operators(), &[OpId(2)]);
    }

    #[test]
    fn conditional_effects_count_as_achievers() {
        let variables = vec![Variable::new("v0", 2), Variable::new("v1", 2)];
        let op = Operator::new(
            "cond",
            vec![],
            vec![Effect::conditional(VarId(1), None, 1, vec![fact(0, 1)])],
            1.0,
        );
        let task = PlanningTask::new(
            variables,
            State::new(vec![0, 0]),
            vec![fact(1, 1)],
            vec![op],
        )
        .unwrap();
        let index = OperatorIndex::new(&task);
        assert_eq!(index.achievers(fact(1, 1)), &[OpId(0)]);
        // The effect condition is not a precondition.
        assert!(index.requirers(fact(0, 1)).is_empty());
    }
}
