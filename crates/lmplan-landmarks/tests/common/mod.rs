//! Shared helpers for the integration tests: plan search over the explicit
//! state space and plan-trace utilities used to verify landmark soundness.

#![allow(dead_code)]

use lmplan_core::{Fact, OpId, PlanningTask, State, VarId};
use lmplan_landmarks::{LandmarkGraph, LandmarkNode};

pub fn fact(var: u32, value: u32) -> Fact {
    Fact::new(VarId(var), value)
}

pub fn goal_holds(task: &PlanningTask, state: &State) -> bool {
    task.goal().iter().all(|&g| state.holds(g))
}

/// Uniform-cost search over the explicit state space. Returns the cheapest
/// goal-reaching operator sequence with its cost.
pub fn optimal_plan(task: &PlanningTask) -> Option<(f64, Vec<OpId>)> {
    use std::collections::HashMap;
    let mut best: HashMap<State, f64> = HashMap::new();
    let mut frontier: Vec<(f64, State, Vec<OpId>)> =
        vec![(0.0, task.initial().clone(), Vec::new())];
    best.insert(task.initial().clone(), 0.0);
    while !frontier.is_empty() {
        let next = frontier
            .iter()
            .enumerate()
            .min_by(|a, b| a.1 .0.partial_cmp(&b.1 .0).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        let (cost, state, plan) = frontier.swap_remove(next);
        if best.get(&state).is_some_and(|&c| c < cost) {
            continue;
        }
        if goal_holds(task, &state) {
            return Some((cost, plan));
        }
        for (idx, op) in task.operators().iter().enumerate() {
            if !op.is_applicable(&state) {
                continue;
            }
            let successor = state.apply(op);
            let successor_cost = cost + op.cost();
            if best.get(&successor).map_or(true, |&c| successor_cost < c) {
                best.insert(successor.clone(), successor_cost);
                let mut successor_plan = plan.clone();
                successor_plan.push(OpId(idx as u32));
                frontier.push((successor_cost, successor, successor_plan));
            }
        }
    }
    None
}

/// The state sequence a plan visits, starting with the initial state.
pub fn state_trace(task: &PlanningTask, plan: &[OpId]) -> Vec<State> {
    let mut states = vec![task.initial().clone()];
    for &op in plan {
        let next = states.last().unwrap().apply(task.operator(op));
        states.push(next);
    }
    states
}

/// Every applicable operator sequence of length at most `max_len` whose
/// final state satisfies the goal. Exhaustive; keep the tasks tiny.
pub fn all_goal_plans(task: &PlanningTask, max_len: usize) -> Vec<Vec<OpId>> {
    let mut plans = Vec::new();
    let mut stack = vec![(task.initial().clone(), Vec::new())];
    while let Some((state, plan)) = stack.pop() {
        if goal_holds(task, &state) {
            plans.push(plan.clone());
        }
        if plan.len() == max_len {
            continue;
        }
        for (idx, op) in task.operators().iter().enumerate() {
            if op.is_applicable(&state) {
                let mut next_plan = plan.clone();
                next_plan.push(OpId(idx as u32));
                stack.push((state.apply(op), next_plan));
            }
        }
    }
    plans
}

/// Index of the first state in the trace where the landmark holds.
pub fn first_true_index(node: &LandmarkNode, trace: &[State]) -> Option<usize> {
    trace.iter().position(|state| node.is_true_in(state))
}

/// Asserts that every sound edge of the graph is respected by the plan:
/// the source landmark becomes true strictly before the target landmark
/// first does.
pub fn assert_sound_edges_respected(graph: &LandmarkGraph, task: &PlanningTask, plan: &[OpId]) {
    let trace = state_trace(task, plan);
    for (id, node) in graph.nodes() {
        for (child, ty) in graph.children(id) {
            if !ty.is_sound() {
                continue;
            }
            let Some(child_first) = first_true_index(&graph[child], &trace) else {
                panic!(
                    "landmark {} never achieved by plan",
                    graph[child].landmark()
                );
            };
            if child_first == 0 {
                continue; // target holds initially; nothing to order
            }
            let parent_first = first_true_index(node, &trace);
            assert!(
                parent_first.is_some_and(|i| i < child_first),
                "{ty} edge {} -> {} violated by plan",
                node.landmark(),
                graph[child].landmark()
            );
        }
    }
}
