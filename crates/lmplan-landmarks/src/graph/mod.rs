//! The landmark graph store.
//!
//! [`LandmarkGraph`] owns the landmark nodes in a petgraph `StableGraph`
//! (an arena addressed by stable integer handles) and keeps two fact
//! indices: one for simple landmarks, and one with an entry per member fact
//! of each disjunctive landmark. All mutations go through `LandmarkGraph`
//! methods so the edge invariants hold at all times:
//!
//! - for any ordered node pair, at most one edge per direction;
//! - an edge may only oppose an existing reverse edge if it is of a
//!   removable type (reasonable / obedient-reasonable), and the stronger
//!   type wins;
//! - parallel insertion upgrades weaker edges and ignores weaker ones.
//!
//! Nodes are created only by discovery; later passes add and remove edges
//! or narrow a disjunctive node to a simple one, but never delete nodes.

pub mod acyclic;
pub mod edge;
pub mod node;

use std::fmt::Write as _;
use std::ops::{Index, IndexMut};

use indexmap::{IndexMap, IndexSet};
use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use lmplan_core::Fact;

use crate::error::LandmarkError;
use crate::id::LandmarkId;

pub use edge::OrderType;
pub use node::{Landmark, LandmarkNode};

/// The landmark graph: nodes, typed order edges, and fact indices.
///
/// Only the node/edge store is serialized; the fact indices are derived
/// data and are rebuilt on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "GraphData", into = "GraphData")]
pub struct LandmarkGraph {
    graph: StableGraph<LandmarkNode, OrderType, Directed, u32>,
    /// fact -> simple landmark covering it.
    simple_index: IndexMap<Fact, LandmarkId>,
    /// fact -> disjunctive landmark containing it (one entry per member).
    disjunctive_index: IndexMap<Fact, LandmarkId>,
}

/// Serialized form of [`LandmarkGraph`].
#[derive(Serialize, Deserialize)]
struct GraphData {
    graph: StableGraph<LandmarkNode, OrderType, Directed, u32>,
}

impl From<LandmarkGraph> for GraphData {
    fn from(graph: LandmarkGraph) -> Self {
        GraphData { graph: graph.graph }
    }
}

impl From<GraphData> for LandmarkGraph {
    fn from(data: GraphData) -> Self {
        let mut simple_index = IndexMap::new();
        let mut disjunctive_index = IndexMap::new();
        for idx in data.graph.node_indices() {
            let id = LandmarkId::from(idx);
            match data.graph[idx].landmark() {
                Landmark::Simple(fact) => {
                    simple_index.insert(*fact, id);
                }
                Landmark::Disjunctive(facts) => {
                    for &fact in facts.iter() {
                        disjunctive_index.insert(fact, id);
                    }
                }
            }
        }
        LandmarkGraph {
            graph: data.graph,
            simple_index,
            disjunctive_index,
        }
    }
}

impl LandmarkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    /// Number of landmarks.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of order edges of all types.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Sum of every node's `min_cost`: a lower bound on plan cost.
    pub fn cost_lower_bound(&self) -> f64 {
        self.graph
            .node_weights()
            .map(|node| node.min_cost)
            .sum()
    }

    pub fn get(&self, id: LandmarkId) -> Option<&LandmarkNode> {
        self.graph.node_weight(id.into())
    }

    pub fn get_mut(&mut self, id: LandmarkId) -> Option<&mut LandmarkNode> {
        self.graph.node_weight_mut(id.into())
    }

    /// All node handles, in creation order.
    pub fn ids(&self) -> Vec<LandmarkId> {
        self.graph.node_indices().map(LandmarkId::from).collect()
    }

    /// Iterates over (handle, node) pairs in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (LandmarkId, &LandmarkNode)> {
        self.graph
            .node_indices()
            .map(|idx| (LandmarkId::from(idx), &self.graph[idx]))
    }

    /// Returns `true` if `fact` is covered by a simple landmark.
    pub fn simple_exists(&self, fact: Fact) -> bool {
        self.simple_index.contains_key(&fact)
    }

    /// Returns `true` if `fact` is a member of some disjunctive landmark.
    pub fn disjunctive_member_exists(&self, fact: Fact) -> bool {
        self.disjunctive_index.contains_key(&fact)
    }

    /// Returns `true` if `fact` is covered by any landmark.
    pub fn landmark_exists(&self, fact: Fact) -> bool {
        self.simple_exists(fact) || self.disjunctive_member_exists(fact)
    }

    /// Returns `true` if a disjunctive landmark with exactly this fact set
    /// exists. Partial overlaps do not count.
    pub fn exact_disjunctive_exists(&self, facts: &IndexSet<Fact>) -> bool {
        let mut found: Option<LandmarkId> = None;
        for fact in facts {
            match self.disjunctive_index.get(fact) {
                None => return false,
                Some(&id) => {
                    if found.is_some_and(|prev| prev != id) {
                        return false;
                    }
                    found = Some(id);
                }
            }
        }
        match found {
            Some(id) => self[id].facts().len() == facts.len(),
            None => false,
        }
    }

    /// Handle of the simple landmark covering `fact`.
    pub fn simple_node(&self, fact: Fact) -> Option<LandmarkId> {
        self.simple_index.get(&fact).copied()
    }

    /// Handle of the disjunctive landmark containing `fact`.
    pub fn disjunctive_node(&self, fact: Fact) -> Option<LandmarkId> {
        self.disjunctive_index.get(&fact).copied()
    }

    /// Handle of the landmark covering `fact`, preferring simple landmarks.
    pub fn find_node(&self, fact: Fact) -> Option<LandmarkId> {
        self.simple_node(fact).or_else(|| self.disjunctive_node(fact))
    }

    // -----------------------------------------------------------------------
    // Node creation and conversion
    // -----------------------------------------------------------------------

    /// Creates and indexes a new simple landmark.
    ///
    /// Errors if the fact is already covered by any landmark; callers must
    /// reuse or convert the existing node instead.
    pub fn add_simple(&mut self, fact: Fact) -> Result<LandmarkId, LandmarkError> {
        if self.landmark_exists(fact) {
            return Err(LandmarkError::DuplicateLandmark { fact });
        }
        let id = LandmarkId::from(self.graph.add_node(LandmarkNode::simple(fact)));
        self.simple_index.insert(fact, id);
        Ok(id)
    }

    /// Creates a new disjunctive landmark, indexed under every member fact.
    ///
    /// Errors if any member is already a simple landmark (the candidate is
    /// redundant) or belongs to another disjunctive landmark (overlap).
    pub fn add_disjunctive(&mut self, facts: IndexSet<Fact>) -> Result<LandmarkId, LandmarkError> {
        if facts.len() < 2 {
            return Err(LandmarkError::DisjunctiveTooSmall { count: facts.len() });
        }
        for &fact in &facts {
            if self.simple_exists(fact) {
                return Err(LandmarkError::DisjunctiveOverlapsSimple { fact });
            }
            if self.disjunctive_member_exists(fact) {
                return Err(LandmarkError::DuplicateLandmark { fact });
            }
        }
        let members: SmallVec<[Fact; 4]> = facts.iter().copied().collect();
        let id = LandmarkId::from(self.graph.add_node(LandmarkNode::disjunctive(members)));
        for fact in facts {
            self.disjunctive_index.insert(fact, id);
        }
        Ok(id)
    }

    /// Narrows a disjunctive landmark to the simple landmark `fact`.
    ///
    /// Removes the node's disjunctive index entries, re-keys it under the
    /// simple index, and discards all of its edges and buffered forward
    /// orders: orders attributed to "any of several facts" cannot be
    /// soundly narrowed to one of them.
    pub fn convert_to_simple(&mut self, id: LandmarkId, fact: Fact) {
        debug_assert!(self[id].is_disjunctive());
        debug_assert!(self[id].landmark().covers(fact));
        let members: SmallVec<[Fact; 4]> = self[id].facts().into();
        for member in members {
            self.disjunctive_index.swap_remove(&member);
        }
        self.clear_edges(id);
        self[id].narrow_to_simple(fact);
        self.simple_index.insert(fact, id);
    }

    fn clear_edges(&mut self, id: LandmarkId) {
        let idx = id.into();
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.id())
            .collect();
        edges.extend(
            self.graph
                .edges_directed(idx, Direction::Incoming)
                .map(|e| e.id()),
        );
        for edge in edges {
            self.graph.remove_edge(edge);
        }
    }

    // -----------------------------------------------------------------------
    // Edges
    // -----------------------------------------------------------------------

    /// The type of the edge `from -> to`, if present.
    pub fn edge(&self, from: LandmarkId, to: LandmarkId) -> Option<OrderType> {
        self.graph
            .find_edge(from.into(), to.into())
            .map(|e| self.graph[e])
    }

    /// Inserts or upgrades the order edge `from -> to`.
    ///
    /// If an edge exists in the opposite direction, the incoming type must
    /// be removable (reasonable / obedient-reasonable): an equal-or-stronger
    /// reverse edge makes the call a no-op, a weaker one is deleted first.
    /// In the forward direction the stronger type wins.
    pub fn add_edge(&mut self, from: LandmarkId, to: LandmarkId, ty: OrderType) {
        debug_assert_ne!(from, to);
        if let Some(reverse) = self.edge(to, from) {
            debug_assert!(
                ty.is_removable(),
                "sound edge {ty} opposes existing {reverse} edge"
            );
            if reverse >= ty {
                return;
            }
            self.remove_edge(to, from);
        }
        match self.edge(from, to) {
            Some(existing) if existing >= ty => return,
            Some(_) => {
                self.remove_edge(from, to);
            }
            None => {}
        }
        self.graph.add_edge(from.into(), to.into(), ty);
    }

    /// Removes the edge `from -> to`. Returns `true` if one existed.
    pub fn remove_edge(&mut self, from: LandmarkId, to: LandmarkId) -> bool {
        match self.graph.find_edge(from.into(), to.into()) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                true
            }
            None => false,
        }
    }

    /// Parents of `id` with their edge types.
    pub fn parents(
        &self,
        id: LandmarkId,
    ) -> impl Iterator<Item = (LandmarkId, OrderType)> + '_ {
        self.graph
            .edges_directed(id.into(), Direction::Incoming)
            .map(|e| (LandmarkId::from(e.source()), *e.weight()))
    }

    /// Children of `id` with their edge types.
    pub fn children(
        &self,
        id: LandmarkId,
    ) -> impl Iterator<Item = (LandmarkId, OrderType)> + '_ {
        self.graph
            .edges_directed(id.into(), Direction::Outgoing)
            .map(|e| (LandmarkId::from(e.target()), *e.weight()))
    }

    /// Returns `true` if the graph (all edge types) contains no directed
    /// cycle.
    pub fn is_acyclic(&self) -> bool {
        !petgraph::algo::is_cyclic_directed(&self.graph)
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    /// Deterministic textual rendering: one block per node in creation
    /// order, with parent and child edges and their type labels.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (id, node) in self.nodes() {
            let _ = write!(out, "{}", node.landmark());
            if node.in_goal {
                out.push_str(" [goal]");
            }
            let _ = writeln!(out, " (cost {})", node.min_cost);
            for (parent, ty) in self.parents(id) {
                let _ = writeln!(out, "  <-{}- {}", ty, self[parent].landmark());
            }
            for (child, ty) in self.children(id) {
                let _ = writeln!(out, "  -{}-> {}", ty, self[child].landmark());
            }
        }
        out
    }
}

impl Index<LandmarkId> for LandmarkGraph {
    type Output = LandmarkNode;

    fn index(&self, id: LandmarkId) -> &LandmarkNode {
        &self.graph[petgraph::graph::NodeIndex::from(id)]
    }
}

impl IndexMut<LandmarkId> for LandmarkGraph {
    fn index_mut(&mut self, id: LandmarkId) -> &mut LandmarkNode {
        &mut self.graph[petgraph::graph::NodeIndex::from(id)]
    }
}
