//! Backward-chaining analysis of a single open landmark.
//!
//! Given the relaxed levels computed with the landmark excluded, these
//! functions answer: which operators can achieve it first, which
//! preconditions all of those operators share (new simple landmarks), what
//! the cheapest achiever costs, and which precondition groups form
//! disjunctive landmark candidates.

use indexmap::{IndexMap, IndexSet};

use lmplan_core::{Fact, OpId, Operator, PlanningTask, VarId};

use crate::graph::Landmark;
use crate::index::OperatorIndex;
use crate::reachability::FactLevels;

/// Cap on disjunctive landmark size; larger groups blow up the graph
/// without adding guidance.
const MAX_DISJUNCTIVE_SIZE: usize = 5;

/// Returns `true` if `op` can possibly be the first achiever of `landmark`
/// under the given exclusion levels: all prevail conditions and effect
/// preconditions are reachable, and some effect produces a member fact with
/// reachable effect conditions.
pub(crate) fn possibly_first_achieves(
    op: &Operator,
    levels: &FactLevels,
    landmark: &Landmark,
) -> bool {
    if !op.prevails().iter().all(|&p| levels.is_reached(p)) {
        return false;
    }
    if !op
        .effects()
        .iter()
        .filter_map(|e| e.precondition())
        .all(|pre| levels.is_reached(pre))
    {
        return false;
    }
    op.effects().iter().any(|e| {
        landmark.covers(e.fact()) && e.conditions.iter().all(|&c| levels.is_reached(c))
    })
}

/// All operators that can first achieve any member fact of `landmark`,
/// deduplicated, in index order.
pub(crate) fn qualifying_achievers(
    task: &PlanningTask,
    index: &OperatorIndex,
    levels: &FactLevels,
    landmark: &Landmark,
) -> Vec<OpId> {
    let mut ops: IndexSet<OpId> = IndexSet::new();
    for &member in landmark.facts() {
        for &op_id in index.achievers(member) {
            if !ops.contains(&op_id)
                && possibly_first_achieves(task.operator(op_id), levels, landmark)
            {
                ops.insert(op_id);
            }
        }
    }
    ops.into_iter().collect()
}

/// The greedy necessary preconditions of `op` toward `landmark`: its real
/// preconditions and prevail conditions, an inferred initial-state
/// precondition for unconditionally touched two-valued variables the
/// landmark sits on, and the intersection of effect conditions across all
/// effects achieving the landmark.
pub(crate) fn greedy_preconditions(
    task: &PlanningTask,
    op: &Operator,
    landmark: &Landmark,
) -> IndexMap<VarId, u32> {
    let mut result: IndexMap<VarId, u32> = IndexMap::new();
    for &prevail in op.prevails() {
        result.insert(prevail.var, prevail.value);
    }
    for effect in op.effects() {
        if let Some(pre) = effect.pre {
            result.insert(effect.var, pre);
        }
    }

    // A two-valued variable changed by an unconditional precondition-free
    // effect must still carry its initial value when the operator fires,
    // provided the landmark wants the other value on it.
    for effect in op.effects() {
        if effect.pre.is_some() || effect.is_conditional() || task.domain(effect.var) != 2 {
            continue;
        }
        if result.contains_key(&effect.var) {
            continue;
        }
        let initial = task.initial().value(effect.var);
        let wanted_elsewhere = landmark
            .facts()
            .iter()
            .any(|lm| lm.var == effect.var && lm.value != initial);
        if wanted_elsewhere {
            result.insert(effect.var, initial);
        }
    }

    // Effect conditions shared by every effect achieving the landmark. An
    // unconditional achieving effect empties the intersection.
    let mut shared_conditions: Option<IndexMap<VarId, u32>> = None;
    for effect in op.effects() {
        if !landmark.covers(effect.fact()) {
            continue;
        }
        let current: IndexMap<VarId, u32> = effect
            .conditions
            .iter()
            .map(|c| (c.var, c.value))
            .collect();
        shared_conditions = Some(match shared_conditions {
            None => current,
            Some(prev) => intersect(&prev, &current),
        });
    }
    if let Some(conditions) = shared_conditions {
        for (var, value) in conditions {
            result.insert(var, value);
        }
    }
    result
}

/// Preconditions common to every qualifying achiever: each surviving fact
/// is itself a landmark that must hold greedily before the target.
pub(crate) fn shared_preconditions(
    task: &PlanningTask,
    achievers: &[OpId],
    landmark: &Landmark,
) -> Vec<Fact> {
    let mut shared: Option<IndexMap<VarId, u32>> = None;
    for &op_id in achievers {
        let preconditions = greedy_preconditions(task, task.operator(op_id), landmark);
        shared = Some(match shared {
            None => preconditions,
            Some(prev) => intersect(&prev, &preconditions),
        });
        if shared.as_ref().is_some_and(|s| s.is_empty()) {
            break;
        }
    }
    shared
        .unwrap_or_default()
        .into_iter()
        .map(|(var, value)| Fact::new(var, value))
        .collect()
}

/// Cheapest qualifying achiever, or `None` when no operator qualifies.
pub(crate) fn min_achiever_cost(task: &PlanningTask, achievers: &[OpId]) -> Option<f64> {
    achievers
        .iter()
        .map(|&op_id| task.operator(op_id).cost())
        .fold(None, |acc, cost| {
            Some(acc.map_or(cost, |prev: f64| prev.min(cost)))
        })
}

/// Disjunctive landmark candidates: the non-shared greedy preconditions of
/// the qualifying achievers, grouped by predicate name. A group survives
/// only if every achiever contributed exactly one fact to it and the
/// deduplicated group holds more than one, fewer than five distinct facts.
pub(crate) fn disjunctive_candidates(
    task: &PlanningTask,
    achievers: &[OpId],
    landmark: &Landmark,
    shared: &[Fact],
) -> Vec<IndexSet<Fact>> {
    struct Group {
        contributors: IndexSet<OpId>,
        facts: IndexSet<Fact>,
        /// Some achiever contributed two facts to this predicate.
        ambiguous: bool,
    }
    let mut groups: IndexMap<String, Group> = IndexMap::new();

    for &op_id in achievers {
        let preconditions = greedy_preconditions(task, task.operator(op_id), landmark);
        for (var, value) in preconditions {
            let fact = Fact::new(var, value);
            if shared.contains(&fact) {
                continue;
            }
            // Facts without a registered predicate cannot be grouped.
            let Some(predicate) = task.predicate(fact) else {
                continue;
            };
            let group = groups
                .entry(predicate.name.clone())
                .or_insert_with(|| Group {
                    contributors: IndexSet::new(),
                    facts: IndexSet::new(),
                    ambiguous: false,
                });
            if !group.contributors.insert(op_id) {
                group.ambiguous = true;
            }
            group.facts.insert(fact);
        }
    }

    groups
        .into_values()
        .filter(|g| {
            !g.ambiguous
                && g.contributors.len() == achievers.len()
                && g.facts.len() > 1
                && g.facts.len() < MAX_DISJUNCTIVE_SIZE
        })
        .map(|g| g.facts)
        .collect()
}

fn intersect(a: &IndexMap<VarId, u32>, b: &IndexMap<VarId, u32>) -> IndexMap<VarId, u32> {
    a.iter()
        .filter(|(var, value)| b.get(*var) == Some(value))
        .map(|(&var, &value)| (var, value))
        .collect()
}
