//! Reasonable-order approximation.
//!
//! After discovery, heuristic edges are added between simple landmarks that
//! *interfere*: achieving one would undo, or mutually exclude, the other,
//! so doing them in the wrong order forces redundant work. These edges may
//! be wrong and may introduce cycles; acyclification cleans up afterwards.
//!
//! The same pass runs twice. The reasonable pass considers goal landmarks
//! against every other node and non-goal landmarks against ancestors
//! reachable through sound edges. The obedient-reasonable pass extends the
//! ancestor walk across already-installed reasonable edges and tags its
//! findings with the weaker edge type.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use lmplan_core::{Fact, InconsistencyTable, Operator, PlanningTask, VarId};

use crate::graph::{LandmarkGraph, OrderType};
use crate::id::LandmarkId;
use crate::index::OperatorIndex;

/// Adds reasonable (or, with `obedient` set, obedient-reasonable) edges to
/// the graph. Returns the number of edges submitted.
pub fn add_reasonable_orders(
    graph: &mut LandmarkGraph,
    task: &PlanningTask,
    index: &OperatorIndex,
    mutexes: &InconsistencyTable,
    obedient: bool,
) -> usize {
    let ty = if obedient {
        OrderType::ObedientReasonable
    } else {
        OrderType::Reasonable
    };
    let ids = graph.ids();
    let mut added = 0;
    for &id in &ids {
        if graph[id].is_disjunctive() {
            continue;
        }
        if !obedient && graph[id].in_goal {
            // Once the goal fact is reached, nothing interfering with it
            // should still be pending.
            for &other in &ids {
                if other == id || graph[other].is_disjunctive() {
                    continue;
                }
                if interferes(graph, task, index, mutexes, other, id) {
                    graph.add_edge(other, id, OrderType::Reasonable);
                    added += 1;
                }
            }
        } else {
            if graph[id].is_true_in(task.initial()) {
                continue;
            }
            for other in interesting_nodes(graph, id, obedient) {
                if other == id || graph[other].is_disjunctive() {
                    continue;
                }
                if interferes(graph, task, index, mutexes, other, id) {
                    graph.add_edge(other, id, ty);
                    added += 1;
                }
            }
        }
    }
    debug!(added, obedient, "reasonable-order pass finished");
    added
}

/// Candidate sources for reasonable orders into `id`: the other simple
/// parents of its greedy-necessary children, plus all of their ancestors
/// through sound edges (and reasonable edges in the obedient pass).
/// Disjunctive co-parents contribute nothing, not even their ancestors.
fn interesting_nodes(graph: &LandmarkGraph, id: LandmarkId, obedient: bool) -> IndexSet<LandmarkId> {
    let follow =
        |ty: OrderType| ty.is_sound() || (obedient && ty == OrderType::Reasonable);
    let mut result = IndexSet::new();
    for (child, ty) in graph.children(id) {
        if ty != OrderType::GreedyNecessary {
            continue;
        }
        for (parent, parent_ty) in graph.parents(child) {
            if parent == id || graph[parent].is_disjunctive() {
                continue;
            }
            if follow(parent_ty) && result.insert(parent) {
                collect_ancestors(graph, parent, &follow, &mut result);
            }
        }
    }
    result
}

/// Walks the parent relation from `from` through edges accepted by
/// `follow`, inserting every node reached.
fn collect_ancestors(
    graph: &LandmarkGraph,
    from: LandmarkId,
    follow: &impl Fn(OrderType) -> bool,
    out: &mut IndexSet<LandmarkId>,
) {
    let mut queue = vec![from];
    while let Some(node) = queue.pop() {
        for (parent, ty) in graph.parents(node) {
            if follow(ty) && out.insert(parent) {
                queue.push(parent);
            }
        }
    }
}

/// Tests whether achieving `a` threatens `b`: their facts are mutex, every
/// achiever of `a` always co-produces a fact mutex with `b`, or a sound
/// predecessor of `a` is mutex with `b`. Both nodes must be simple.
fn interferes(
    graph: &LandmarkGraph,
    task: &PlanningTask,
    index: &OperatorIndex,
    mutexes: &InconsistencyTable,
    a_id: LandmarkId,
    b_id: LandmarkId,
) -> bool {
    let (Some(a), Some(b)) = (
        graph[a_id].landmark().simple_fact(),
        graph[b_id].landmark().simple_fact(),
    ) else {
        return false;
    };
    if a == b {
        return false;
    }

    if mutexes.are_mutex(a, b) {
        return true;
    }

    // Shared guaranteed side effects of all achievers of a.
    let achievers = index.achievers(a);
    if !achievers.is_empty() {
        let mut shared: Option<IndexSet<Fact>> = None;
        for &op_id in achievers {
            let effects = guaranteed_effects(task, task.operator(op_id));
            shared = Some(match shared {
                None => effects,
                Some(prev) => prev.intersection(&effects).copied().collect(),
            });
            if shared.as_ref().is_some_and(|s| s.is_empty()) {
                break;
            }
        }
        if let Some(shared) = shared {
            for &effect in &shared {
                if effect != a && effect != b && mutexes.are_mutex(effect, b) {
                    return true;
                }
            }
        }
    }

    // A predecessor that must hold greedily right before a.
    for (parent, ty) in graph.parents(a_id) {
        if !matches!(ty, OrderType::GreedyNecessary | OrderType::Natural) {
            continue;
        }
        if let Some(x) = graph[parent].landmark().simple_fact() {
            if mutexes.are_mutex(x, b) {
                return true;
            }
        }
    }
    false
}

/// Facts `op` makes true whenever it fires: unconditional effects plus
/// conditional effects whose trigger values cover the whole domain.
fn guaranteed_effects(task: &PlanningTask, op: &Operator) -> IndexSet<Fact> {
    let mut result: IndexSet<Fact> = op
        .effects()
        .iter()
        .filter(|e| !e.is_conditional())
        .map(|e| e.fact())
        .collect();
    result.extend(trivially_true_conditional_facts(task, op));
    result
}

/// Facts produced by conditional effects that fire in every state where
/// the operator applies: a group of single-condition effects on the same
/// produced fact whose trigger values together cover the trigger
/// variable's full domain (every value but the post value when the trigger
/// is the effect variable itself).
fn trivially_true_conditional_facts(task: &PlanningTask, op: &Operator) -> IndexSet<Fact> {
    let mut groups: IndexMap<Fact, Vec<Fact>> = IndexMap::new();
    let mut multi_condition: IndexSet<Fact> = IndexSet::new();
    for effect in op.effects() {
        if !effect.is_conditional() {
            continue;
        }
        if effect.conditions.len() == 1 {
            groups
                .entry(effect.fact())
                .or_default()
                .push(effect.conditions[0]);
        } else {
            // Multi-condition effects make the coverage test unsound for
            // this fact; drop the whole group.
            multi_condition.insert(effect.fact());
        }
    }

    let mut result = IndexSet::new();
    for (fact, triggers) in groups {
        if multi_condition.contains(&fact) {
            continue;
        }
        let mut by_var: IndexMap<VarId, IndexSet<u32>> = IndexMap::new();
        for trigger in triggers {
            by_var.entry(trigger.var).or_default().insert(trigger.value);
        }
        for (var, values) in by_var {
            let needed = if var == fact.var {
                let excluded_post = u32::from(values.contains(&fact.value));
                task.domain(var) - 1 + excluded_post
            } else {
                task.domain(var)
            };
            if values.len() as u32 == needed {
                result.insert(fact);
                break;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmplan_core::{Effect, State, Variable};

    fn fact(var: u32, value: u32) -> Fact {
        Fact::new(VarId(var), value)
    }

    fn two_location_task() -> PlanningTask {
        // v0 is a location variable; v1 and v2 are goal flags set at
        // different locations.
        let variables = vec![
            Variable::new("loc", 2),
            Variable::new("g1", 2),
            Variable::new("g2", 2),
        ];
        let go = Operator::new("go", vec![], vec![Effect::new(VarId(0), Some(0), 1)], 1.0);
        let back = Operator::new("back", vec![], vec![Effect::new(VarId(0), Some(1), 0)], 1.0);
        let set1 = Operator::new(
            "set1",
            vec![fact(0, 0)],
            vec![Effect::new(VarId(1), Some(0), 1)],
            1.0,
        );
        let set2 = Operator::new(
            "set2",
            vec![fact(0, 1)],
            vec![Effect::new(VarId(2), Some(0), 1)],
            1.0,
        );
        PlanningTask::new(
            variables,
            State::new(vec![0, 0, 0]),
            vec![fact(1, 1), fact(2, 1)],
            vec![go, back, set1, set2],
        )
        .unwrap()
    }

    #[test]
    fn mutex_facts_interfere() {
        let task = two_location_task();
        let index = OperatorIndex::new(&task);
        let mutexes = InconsistencyTable::from_task(&task);
        let mut graph = LandmarkGraph::new();
        let a = graph.add_simple(fact(0, 0)).unwrap();
        let b = graph.add_simple(fact(0, 1)).unwrap();
        assert!(interferes(&graph, &task, &index, &mutexes, a, b));
    }

    #[test]
    fn unrelated_facts_do_not_interfere() {
        let task = two_location_task();
        let index = OperatorIndex::new(&task);
        let mutexes = InconsistencyTable::from_task(&task);
        let mut graph = LandmarkGraph::new();
        let a = graph.add_simple(fact(1, 1)).unwrap();
        let b = graph.add_simple(fact(2, 1)).unwrap();
        assert!(!interferes(&graph, &task, &index, &mutexes, a, b));
    }

    #[test]
    fn achiever_side_effect_interference() {
        // Every achiever of g1=1 requires loc=0; a gn-parent loc=0 of g1=1
        // is mutex with loc=1, so g1=1 interferes with loc=1.
        let task = two_location_task();
        let index = OperatorIndex::new(&task);
        let mutexes = InconsistencyTable::from_task(&task);
        let mut graph = LandmarkGraph::new();
        let g1 = graph.add_simple(fact(1, 1)).unwrap();
        let loc0 = graph.add_simple(fact(0, 0)).unwrap();
        let loc1 = graph.add_simple(fact(0, 1)).unwrap();
        graph.add_edge(loc0, g1, OrderType::GreedyNecessary);
        assert!(interferes(&graph, &task, &index, &mutexes, g1, loc1));
    }

    #[test]
    fn goal_pass_orders_mutex_landmark_before_the_goal() {
        let mut task = two_location_task();
        // g1=1 and g2=1 can never hold together in this variant.
        task.add_mutex_group(vec![fact(1, 1), fact(2, 1)]).unwrap();
        let index = OperatorIndex::new(&task);
        let mutexes = InconsistencyTable::from_task(&task);
        let mut graph = LandmarkGraph::new();
        let g1 = graph.add_simple(fact(1, 1)).unwrap();
        let other = graph.add_simple(fact(2, 1)).unwrap();
        graph[g1].in_goal = true;

        let added = add_reasonable_orders(&mut graph, &task, &index, &mutexes, false);
        assert_eq!(added, 1);
        assert_eq!(graph.edge(other, g1), Some(OrderType::Reasonable));
    }

    #[test]
    fn pass_orders_interfering_co_parent_before_precondition() {
        // Grabbing g2 also throws the agent to loc=1, so g2=1 must come
        // before the loc=0 landmark that g1 needs.
        let variables = vec![
            Variable::new("loc", 2),
            Variable::new("g1", 2),
            Variable::new("g2", 2),
        ];
        let move10 = Operator::new("move10", vec![], vec![Effect::new(VarId(0), Some(1), 0)], 1.0);
        let move01 = Operator::new("move01", vec![], vec![Effect::new(VarId(0), Some(0), 1)], 1.0);
        let set1 = Operator::new(
            "set1",
            vec![fact(0, 0)],
            vec![Effect::new(VarId(1), Some(0), 1)],
            1.0,
        );
        let grab2 = Operator::new(
            "grab2",
            vec![],
            vec![
                Effect::new(VarId(2), Some(0), 1),
                Effect::new(VarId(0), None, 1),
            ],
            1.0,
        );
        let task = PlanningTask::new(
            variables,
            State::new(vec![1, 0, 0]),
            vec![fact(1, 1), fact(2, 1)],
            vec![move10, move01, set1, grab2],
        )
        .unwrap();
        let index = OperatorIndex::new(&task);
        let mutexes = InconsistencyTable::from_task(&task);

        let mut graph = LandmarkGraph::new();
        let g1 = graph.add_simple(fact(1, 1)).unwrap();
        let g2 = graph.add_simple(fact(2, 1)).unwrap();
        let loc0 = graph.add_simple(fact(0, 0)).unwrap();
        graph[g1].in_goal = true;
        graph[g2].in_goal = true;
        graph.add_edge(loc0, g1, OrderType::GreedyNecessary);
        graph.add_edge(g2, g1, OrderType::GreedyNecessary);

        let added = add_reasonable_orders(&mut graph, &task, &index, &mutexes, false);
        // g2 is a co-parent of loc0's gn-child g1; every achiever of g2=1
        // also sets loc=1, which is mutex with loc=0.
        assert_eq!(added, 1);
        assert_eq!(graph.edge(g2, loc0), Some(OrderType::Reasonable));
    }

    #[test]
    fn obedient_pass_extends_over_reasonable_edges() {
        let mut graph = LandmarkGraph::new();
        let target = graph.add_simple(fact(1, 1)).unwrap();
        let child = graph.add_simple(fact(2, 1)).unwrap();
        let sound_parent = graph.add_simple(fact(0, 0)).unwrap();
        let r_parent = graph.add_simple(fact(0, 1)).unwrap();
        let r_grandparent = graph.add_simple(fact(1, 0)).unwrap();
        graph.add_edge(target, child, OrderType::GreedyNecessary);
        graph.add_edge(sound_parent, child, OrderType::GreedyNecessary);
        graph.add_edge(r_parent, child, OrderType::Reasonable);
        graph.add_edge(r_grandparent, sound_parent, OrderType::Reasonable);

        let strict = interesting_nodes(&graph, target, false);
        assert!(strict.contains(&sound_parent));
        assert!(!strict.contains(&r_parent));
        assert!(!strict.contains(&r_grandparent));

        let obedient = interesting_nodes(&graph, target, true);
        assert!(obedient.contains(&sound_parent));
        assert!(obedient.contains(&r_parent));
        assert!(obedient.contains(&r_grandparent));
    }

    #[test]
    fn disjunctive_co_parents_and_their_ancestors_are_not_interesting() {
        let mut graph = LandmarkGraph::new();
        let target = graph.add_simple(fact(1, 1)).unwrap();
        let child = graph.add_simple(fact(2, 1)).unwrap();
        let members: IndexSet<Fact> = [fact(0, 1), fact(3, 1)].into_iter().collect();
        let disj = graph.add_disjunctive(members).unwrap();
        let disj_parent = graph.add_simple(fact(4, 1)).unwrap();
        graph.add_edge(target, child, OrderType::GreedyNecessary);
        graph.add_edge(disj, child, OrderType::GreedyNecessary);
        graph.add_edge(disj_parent, disj, OrderType::GreedyNecessary);

        let nodes = interesting_nodes(&graph, target, false);
        assert!(!nodes.contains(&disj));
        // Ancestors of the disjunctive co-parent are cut off with it.
        assert!(!nodes.contains(&disj_parent));
        assert!(nodes.is_empty());
    }

    #[test]
    fn trivially_true_conditional_effect_detected() {
        let task = PlanningTask::new(
            vec![Variable::new("v0", 2), Variable::new("v1", 2)],
            State::new(vec![0, 0]),
            vec![],
            vec![],
        )
        .unwrap();
        // Two conditional effects produce v0=1, triggered by v1=0 and v1=1:
        // together they cover v1's domain, so v0=1 always happens.
        let op = Operator::new(
            "always",
            vec![],
            vec![
                Effect::conditional(VarId(0), None, 1, vec![fact(1, 0)]),
                Effect::conditional(VarId(0), None, 1, vec![fact(1, 1)]),
            ],
            1.0,
        );
        let facts = trivially_true_conditional_facts(&task, &op);
        assert!(facts.contains(&fact(0, 1)));

        // A single trigger value does not cover the domain.
        let partial = Operator::new(
            "partial",
            vec![],
            vec![Effect::conditional(VarId(0), None, 1, vec![fact(1, 0)])],
            1.0,
        );
        assert!(trivially_true_conditional_facts(&task, &partial).is_empty());
    }

    #[test]
    fn self_triggered_effect_covers_domain_minus_post() {
        let task = PlanningTask::new(
            vec![Variable::new("v0", 2)],
            State::new(vec![0]),
            vec![],
            vec![],
        )
        .unwrap();
        // Condition on the effect variable itself: v0=0 triggers v0:=1.
        // The only value other than the post value is covered.
        let op = Operator::new(
            "flip",
            vec![],
            vec![Effect::conditional(VarId(0), None, 1, vec![fact(0, 0)])],
            1.0,
        );
        let facts = trivially_true_conditional_facts(&task, &op);
        assert!(facts.contains(&fact(0, 1)));
    }
}
