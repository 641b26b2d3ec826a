//! Landmark nodes.
//!
//! A [`Landmark`] is either a single fact (*simple*) or a set of facts of
//! which at least one must hold at some point in every plan (*disjunctive*).
//! The disjunctive-to-simple narrowing required by discovery is an explicit
//! variant transition performed by the graph store
//! ([`super::LandmarkGraph::convert_to_simple`]), never in-place field
//! surgery by callers.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use lmplan_core::{Fact, State};

/// The fact content of a landmark node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Landmark {
    /// One fact every plan must make true.
    Simple(Fact),
    /// A set of facts of which every plan must make at least one true.
    /// Always contains at least two facts.
    Disjunctive(SmallVec<[Fact; 4]>),
}

impl Landmark {
    /// The facts this landmark covers (one for simple landmarks).
    pub fn facts(&self) -> &[Fact] {
        match self {
            Landmark::Simple(fact) => std::slice::from_ref(fact),
            Landmark::Disjunctive(facts) => facts,
        }
    }

    pub fn is_disjunctive(&self) -> bool {
        matches!(self, Landmark::Disjunctive(_))
    }

    /// The single fact of a simple landmark.
    pub fn simple_fact(&self) -> Option<Fact> {
        match self {
            Landmark::Simple(fact) => Some(*fact),
            Landmark::Disjunctive(_) => None,
        }
    }

    /// Returns `true` if `fact` is a member of this landmark.
    pub fn covers(&self, fact: Fact) -> bool {
        self.facts().contains(&fact)
    }

    /// Returns `true` if the landmark holds in `state` (any member fact
    /// suffices for a disjunctive landmark).
    pub fn is_true_in(&self, state: &State) -> bool {
        self.facts().iter().any(|&fact| state.holds(fact))
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Landmark::Simple(fact) => write!(f, "{fact}"),
            Landmark::Disjunctive(facts) => {
                write!(f, "{{")?;
                for (i, fact) in facts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{fact}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A node of the landmark graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkNode {
    landmark: Landmark,
    /// Set for landmarks seeded from the goal condition.
    pub in_goal: bool,
    /// Lower bound on the cost of first achieving this landmark. Zero until
    /// discovery expands the node.
    pub min_cost: f64,
    /// Facts proven unreachable until after this landmark, buffered until
    /// discovery finishes and they are known to be landmarks themselves.
    pub(crate) forward_orders: IndexSet<Fact>,
}

impl LandmarkNode {
    pub(crate) fn simple(fact: Fact) -> Self {
        LandmarkNode {
            landmark: Landmark::Simple(fact),
            in_goal: false,
            min_cost: 0.0,
            forward_orders: IndexSet::new(),
        }
    }

    pub(crate) fn disjunctive(facts: SmallVec<[Fact; 4]>) -> Self {
        LandmarkNode {
            landmark: Landmark::Disjunctive(facts),
            in_goal: false,
            min_cost: 0.0,
            forward_orders: IndexSet::new(),
        }
    }

    pub fn landmark(&self) -> &Landmark {
        &self.landmark
    }

    /// The facts this node covers.
    pub fn facts(&self) -> &[Fact] {
        self.landmark.facts()
    }

    pub fn is_disjunctive(&self) -> bool {
        self.landmark.is_disjunctive()
    }

    /// Returns `true` if the landmark holds in `state`.
    pub fn is_true_in(&self, state: &State) -> bool {
        self.landmark.is_true_in(state)
    }

    /// Narrows this node to a simple landmark on `fact`. Only the store may
    /// call this; it rebuilds indices and drops edges alongside.
    pub(crate) fn narrow_to_simple(&mut self, fact: Fact) {
        debug_assert!(self.landmark.covers(fact));
        self.landmark = Landmark::Simple(fact);
        self.forward_orders.clear();
    }
}
