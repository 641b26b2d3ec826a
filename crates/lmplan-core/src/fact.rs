//! Atomic facts of a SAS+ task.
//!
//! A [`Fact`] is a (variable, value) pair -- the proposition "variable takes
//! this value". A [`Predicate`] is the symbolic name a fact carried in the
//! original first-order encoding; it is only used to group disjunctive
//! landmark candidates, so tasks may leave it unset for any fact.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::VarId;

/// A (variable, value) pair -- an atomic proposition of the planning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fact {
    pub var: VarId,
    pub value: u32,
}

impl Fact {
    /// Creates a fact asserting that `var` takes `value`.
    pub fn new(var: VarId, value: u32) -> Self {
        Fact { var, value }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.var, self.value)
    }
}

/// The symbolic predicate behind a fact, e.g. `at(truck1, depot)`.
///
/// Grouping key for disjunctive landmark candidates: two facts can only be
/// combined into one disjunctive landmark if they stem from the same
/// predicate name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    pub name: String,
    pub args: Vec<String>,
}

impl Predicate {
    /// Creates a predicate with the given name and arguments.
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Predicate {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.join(", "))
    }
}
