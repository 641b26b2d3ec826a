//! Landmark discovery.
//!
//! [`LandmarkGenerator`] seeds the graph with one simple landmark per goal
//! fact and backward-chains over the reachability oracle: each open
//! landmark is expanded exactly once by excluding it from the relaxed task,
//! collecting the operators that could still achieve it first, and turning
//! their shared and disjunctive preconditions into new landmarks with
//! greedy-necessary edges. Lookahead orders are attached along the way; the
//! buffered forward orders are flushed once the worklist drains.
//!
//! The generator is the only mutator of the graph during discovery; order
//! approximation and acyclification run afterwards on the finished store.

pub(crate) mod backchain;
pub(crate) mod lookahead;

use std::collections::VecDeque;

use indexmap::IndexSet;
use tracing::{debug, info};

use lmplan_core::dtg::{self, DomainTransitionGraph};
use lmplan_core::{Fact, OpId, PlanningTask};

use crate::error::LandmarkError;
use crate::graph::{LandmarkGraph, OrderType};
use crate::id::LandmarkId;
use crate::index::OperatorIndex;
use crate::reachability::{ReachabilityOracle, ReachabilityQuery};

/// Drives landmark discovery for one task.
pub struct LandmarkGenerator<'a, O> {
    task: &'a PlanningTask,
    oracle: O,
    index: &'a OperatorIndex,
    dtgs: Vec<DomainTransitionGraph>,
    graph: LandmarkGraph,
    worklist: VecDeque<LandmarkId>,
}

impl<'a, O: ReachabilityOracle> LandmarkGenerator<'a, O> {
    pub fn new(task: &'a PlanningTask, oracle: O, index: &'a OperatorIndex) -> Self {
        LandmarkGenerator {
            task,
            oracle,
            index,
            dtgs: dtg::build_transition_graphs(task),
            graph: LandmarkGraph::new(),
            worklist: VecDeque::new(),
        }
    }

    /// Runs discovery to completion and returns the landmark graph with all
    /// greedy-necessary and lookahead edges in place.
    pub fn discover(mut self) -> Result<LandmarkGraph, LandmarkError> {
        self.seed_goals()?;
        while let Some(id) = self.worklist.pop_front() {
            self.expand(id)?;
        }
        let forward_edges = lookahead::flush_forward_orders(&mut self.graph);
        info!(
            landmarks = self.graph.node_count(),
            edges = self.graph.edge_count(),
            forward_edges,
            "landmark discovery finished"
        );
        Ok(self.graph)
    }

    fn seed_goals(&mut self) -> Result<(), LandmarkError> {
        for &goal in self.task.goal() {
            // Goal conditions may repeat a fact; seed each one once.
            if let Some(id) = self.graph.simple_node(goal) {
                self.graph[id].in_goal = true;
                continue;
            }
            let id = self.graph.add_simple(goal)?;
            self.graph[id].in_goal = true;
            self.worklist.push_back(id);
        }
        Ok(())
    }

    /// Expands one landmark: oracle run with the landmark excluded, then
    /// shared preconditions, min-cost, lookahead orders, and disjunctive
    /// precondition groups.
    fn expand(&mut self, id: LandmarkId) -> Result<(), LandmarkError> {
        if self.graph[id].is_true_in(self.task.initial()) {
            // Nothing needs to happen before a fact that holds initially;
            // the node stays as an ordering target for others.
            return Ok(());
        }
        let landmark = self.graph[id].landmark().clone();

        let excluded_operators = self.unconditional_achievers(&landmark);
        let levels = self
            .oracle
            .reachability(ReachabilityQuery {
                excluded_facts: landmark.facts(),
                excluded_operators: &excluded_operators,
                compute_operator_levels: false,
            })
            .facts;

        let achievers =
            backchain::qualifying_achievers(self.task, self.index, &levels, &landmark);
        let min_cost = backchain::min_achiever_cost(self.task, &achievers)
            .ok_or(LandmarkError::NoAchievers { id })?;
        self.graph[id].min_cost = min_cost;

        let shared = backchain::shared_preconditions(self.task, &achievers, &landmark);
        for fact in &shared {
            self.found_simple(*fact, id, OrderType::GreedyNecessary)?;
        }

        let forward =
            lookahead::forward_order_candidates(self.task, self.index, &levels, &landmark);
        self.graph[id].forward_orders.extend(forward);
        if let Some(fact) = landmark.simple_fact() {
            for value_fact in
                lookahead::necessary_value_landmarks(self.task, &self.dtgs, &levels, fact)
            {
                self.found_simple(value_fact, id, OrderType::LookaheadNecessary)?;
            }
        }

        for candidate in
            backchain::disjunctive_candidates(self.task, &achievers, &landmark, &shared)
        {
            self.found_disjunctive(candidate, id)?;
        }

        debug!(
            landmark = %self.graph[id].landmark(),
            achievers = achievers.len(),
            shared = shared.len(),
            min_cost,
            "expanded landmark"
        );
        Ok(())
    }

    /// Operators whose unconditional effects achieve a member of the
    /// landmark; these must not fire in the exclusion run.
    fn unconditional_achievers(&self, landmark: &crate::graph::Landmark) -> Vec<OpId> {
        let mut ops = Vec::new();
        for (i, op) in self.task.operators().iter().enumerate() {
            if landmark
                .facts()
                .iter()
                .any(|&f| op.unconditionally_achieves(f))
            {
                ops.push(OpId(i as u32));
            }
        }
        ops
    }

    /// Registers `fact` as a simple landmark ordered before `target`,
    /// reusing or narrowing existing nodes instead of duplicating.
    fn found_simple(
        &mut self,
        fact: Fact,
        target: LandmarkId,
        ty: OrderType,
    ) -> Result<(), LandmarkError> {
        if let Some(existing) = self.graph.simple_node(fact) {
            if existing != target {
                self.graph.add_edge(existing, target, ty);
            }
            return Ok(());
        }
        if let Some(disjunctive) = self.graph.disjunctive_node(fact) {
            // The fact turned out to be a landmark on its own; narrow the
            // disjunctive node and re-expand it under its new identity.
            self.graph.convert_to_simple(disjunctive, fact);
            self.worklist.push_back(disjunctive);
            if disjunctive != target {
                self.graph.add_edge(disjunctive, target, ty);
            }
            return Ok(());
        }
        let id = self.graph.add_simple(fact)?;
        self.graph.add_edge(id, target, ty);
        self.worklist.push_back(id);
        Ok(())
    }

    /// Registers a disjunctive landmark candidate ordered before `target`.
    /// Redundant or overlapping candidates are silently discarded.
    fn found_disjunctive(
        &mut self,
        facts: IndexSet<Fact>,
        target: LandmarkId,
    ) -> Result<(), LandmarkError> {
        // A disjunction with an initially true member carries no information.
        if facts.iter().any(|&f| self.task.initial().holds(f)) {
            return Ok(());
        }
        // A member that is already a simple landmark subsumes the
        // disjunction, but attributing the order to it would be unsound.
        if facts.iter().any(|&f| self.graph.simple_exists(f)) {
            return Ok(());
        }
        if self.graph.exact_disjunctive_exists(&facts) {
            if let Some(&first) = facts.first() {
                if let Some(existing) = self.graph.disjunctive_node(first) {
                    self.graph
                        .add_edge(existing, target, OrderType::GreedyNecessary);
                }
            }
            return Ok(());
        }
        // Partial overlap with a different disjunctive landmark.
        if facts.iter().any(|&f| self.graph.disjunctive_member_exists(f)) {
            return Ok(());
        }
        let id = self.graph.add_disjunctive(facts)?;
        self.graph.add_edge(id, target, OrderType::GreedyNecessary);
        self.worklist.push_back(id);
        Ok(())
    }
}
