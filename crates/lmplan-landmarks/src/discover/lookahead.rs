//! Lookahead order inference.
//!
//! Two extra order sources attached to a landmark while it is expanded:
//! facts that the exclusion run proved unreachable outright must come after
//! the landmark (buffered as forward orders until they are confirmed as
//! landmarks), and values of the landmark's own variable that every
//! transition path from the initial value must pass through are necessary
//! before it (domain connectivity).

use indexmap::IndexSet;

use lmplan_core::dtg::{self, DomainTransitionGraph};
use lmplan_core::{Fact, PlanningTask, VarId};

use crate::graph::{Landmark, LandmarkGraph, OrderType};
use crate::index::OperatorIndex;
use crate::reachability::FactLevels;

/// Facts unreachable under the landmark's exclusion run that can be soundly
/// ordered after it. Members of the landmark are skipped, as is any fact
/// sharing an achieving operator with a member (ambiguous attribution).
pub(crate) fn forward_order_candidates(
    task: &PlanningTask,
    index: &OperatorIndex,
    levels: &FactLevels,
    landmark: &Landmark,
) -> IndexSet<Fact> {
    let mut candidates = IndexSet::new();
    for fact in task.facts() {
        if levels.is_reached(fact) || landmark.covers(fact) {
            continue;
        }
        let disjoint_achievers = landmark.facts().iter().all(|&member| {
            index
                .achievers(fact)
                .iter()
                .all(|op| !index.achievers(member).contains(op))
        });
        if disjoint_achievers {
            candidates.insert(fact);
        }
    }
    candidates
}

/// Values of the landmark variable that every transition path from the
/// initial value to the landmark value must visit. Each such value is a
/// necessary landmark of its own; the initial value always qualifies, since
/// every path starts there.
///
/// Values already unreachable before the landmark are excluded from every
/// path up front; a reachable value `i` is necessary if additionally
/// excluding `i` disconnects the initial value from the target.
pub(crate) fn necessary_value_landmarks(
    task: &PlanningTask,
    dtgs: &[DomainTransitionGraph],
    levels: &FactLevels,
    fact: Fact,
) -> Vec<Fact> {
    let var = fact.var;
    let initial = task.initial().value(var);
    let unreachable: IndexSet<u32> = (0..task.domain(var))
        .filter(|&v| v != fact.value && !levels.is_reached(Fact::new(var, v)))
        .collect();

    let mut necessary = Vec::new();
    for value in 0..task.domain(var) {
        if value == fact.value || unreachable.contains(&value) {
            continue;
        }
        let mut excluded = unreachable.clone();
        excluded.insert(value);
        if !value_path_exists(dtgs, var, initial, fact.value, &excluded) {
            necessary.push(Fact::new(var, value));
        }
    }
    necessary
}

/// BFS over the variable's transition graph avoiding `excluded` values. An
/// excluded start value has no path anywhere.
fn value_path_exists(
    dtgs: &[DomainTransitionGraph],
    var: VarId,
    from: u32,
    to: u32,
    excluded: &IndexSet<u32>,
) -> bool {
    if excluded.contains(&from) {
        return false;
    }
    let mut visited = excluded.clone();
    let mut queue = vec![from];
    visited.insert(from);
    while let Some(value) = queue.pop() {
        if value == to {
            return true;
        }
        for &next in dtg::successors(dtgs, var, value) {
            if visited.insert(next) {
                queue.push(next);
            }
        }
    }
    false
}

/// Turns buffered forward orders into edges where the target fact was
/// confirmed as a simple landmark. Returns the number of edges added.
pub(crate) fn flush_forward_orders(graph: &mut LandmarkGraph) -> usize {
    let mut added = 0;
    for id in graph.ids() {
        let buffered: Vec<Fact> = graph[id].forward_orders.drain(..).collect();
        for fact in buffered {
            if let Some(target) = graph.simple_node(fact) {
                graph.add_edge(id, target, OrderType::LookaheadNecessary);
                added += 1;
            }
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reachability::{
        DeleteRelaxation, ReachabilityOracle, ReachabilityQuery,
    };
    use lmplan_core::{Effect, OpId, Operator, State, Variable};

    fn fact(var: u32, value: u32) -> Fact {
        Fact::new(VarId(var), value)
    }

    /// v0 walks 0 -> 1 -> 2; v1 flips once v0=2.
    fn corridor_task() -> PlanningTask {
        let variables = vec![Variable::new("v0", 3), Variable::new("v1", 2)];
        let step1 = Operator::new("step1", vec![], vec![Effect::new(VarId(0), Some(0), 1)], 1.0);
        let step2 = Operator::new("step2", vec![], vec![Effect::new(VarId(0), Some(1), 2)], 1.0);
        let finish = Operator::new(
            "finish",
            vec![fact(0, 2)],
            vec![Effect::new(VarId(1), Some(0), 1)],
            1.0,
        );
        PlanningTask::new(
            variables,
            State::new(vec![0, 0]),
            vec![fact(0, 2), fact(1, 1)],
            vec![step1, step2, finish],
        )
        .unwrap()
    }

    fn levels_excluding(task: &PlanningTask, landmark: &Landmark) -> FactLevels {
        let excluded_ops: Vec<OpId> = (0..task.num_operators() as u32)
            .map(OpId)
            .filter(|&id| {
                landmark
                    .facts()
                    .iter()
                    .any(|&f| task.operator(id).unconditionally_achieves(f))
            })
            .collect();
        DeleteRelaxation::new(task)
            .reachability(ReachabilityQuery {
                excluded_facts: landmark.facts(),
                excluded_operators: &excluded_ops,
                compute_operator_levels: false,
            })
            .facts
    }

    #[test]
    fn forward_orders_catch_downstream_facts() {
        let task = corridor_task();
        let index = OperatorIndex::new(&task);
        // Excluding v0=1 makes v0=2 and v1=1 unreachable.
        let landmark = Landmark::Simple(fact(0, 1));
        let levels = levels_excluding(&task, &landmark);
        let candidates = forward_order_candidates(&task, &index, &levels, &landmark);
        assert!(candidates.contains(&fact(0, 2)));
        assert!(candidates.contains(&fact(1, 1)));
        assert!(!candidates.contains(&fact(0, 0)));
        assert!(!candidates.contains(&fact(0, 1)));
    }

    #[test]
    fn shared_achiever_blocks_forward_order() {
        // One operator produces both v0=1 and v1=1, so v1=1 cannot be
        // attributed strictly after v0=1.
        let variables = vec![Variable::new("v0", 2), Variable::new("v1", 2)];
        let both = Operator::new(
            "both",
            vec![],
            vec![
                Effect::new(VarId(0), Some(0), 1),
                Effect::new(VarId(1), Some(0), 1),
            ],
            1.0,
        );
        let task = PlanningTask::new(
            variables,
            State::new(vec![0, 0]),
            vec![fact(0, 1), fact(1, 1)],
            vec![both],
        )
        .unwrap();
        let index = OperatorIndex::new(&task);
        let landmark = Landmark::Simple(fact(0, 1));
        let levels = levels_excluding(&task, &landmark);
        let candidates = forward_order_candidates(&task, &index, &levels, &landmark);
        assert!(!candidates.contains(&fact(1, 1)));
    }

    #[test]
    fn middle_and_initial_values_of_a_corridor_are_necessary() {
        let task = corridor_task();
        let dtgs = dtg::build_transition_graphs(&task);
        let landmark = Landmark::Simple(fact(0, 2));
        let levels = levels_excluding(&task, &landmark);
        let necessary = necessary_value_landmarks(&task, &dtgs, &levels, fact(0, 2));
        // Every path starts at the initial value and must pass through 1.
        assert_eq!(necessary, vec![fact(0, 0), fact(0, 1)]);
    }

    #[test]
    fn detour_value_is_not_necessary() {
        // Two parallel routes 0 -> 1 -> 3 and 0 -> 2 -> 3: neither middle
        // value is necessary on its own, only the shared initial value.
        let variables = vec![Variable::new("v0", 4)];
        let ops = vec![
            Operator::new("a1", vec![], vec![Effect::new(VarId(0), Some(0), 1)], 1.0),
            Operator::new("a2", vec![], vec![Effect::new(VarId(0), Some(1), 3)], 1.0),
            Operator::new("b1", vec![], vec![Effect::new(VarId(0), Some(0), 2)], 1.0),
            Operator::new("b2", vec![], vec![Effect::new(VarId(0), Some(2), 3)], 1.0),
        ];
        let task =
            PlanningTask::new(variables, State::new(vec![0]), vec![fact(0, 3)], ops).unwrap();
        let dtgs = dtg::build_transition_graphs(&task);
        let landmark = Landmark::Simple(fact(0, 3));
        let levels = levels_excluding(&task, &landmark);
        let necessary = necessary_value_landmarks(&task, &dtgs, &levels, fact(0, 3));
        assert_eq!(necessary, vec![fact(0, 0)]);
    }

    #[test]
    fn flush_creates_edges_only_for_confirmed_landmarks() {
        let mut graph = LandmarkGraph::new();
        let source = graph.add_simple(fact(0, 1)).unwrap();
        let confirmed = graph.add_simple(fact(1, 1)).unwrap();
        graph[source].forward_orders.insert(fact(1, 1));
        graph[source].forward_orders.insert(fact(2, 0)); // never became a landmark
        assert_eq!(flush_forward_orders(&mut graph), 1);
        assert_eq!(
            graph.edge(source, confirmed),
            Some(OrderType::LookaheadNecessary)
        );
        assert_eq!(graph.edge_count(), 1);
        assert!(graph[source].forward_orders.is_empty());
    }
}
