//! Full variable assignments.
//!
//! A [`State`] assigns exactly one value to every variable of the task. The
//! landmark engine only ever reads states (fact truth queries); mutation is
//! limited to [`State::apply`], which the test-side plan enumeration uses.

use serde::{Deserialize, Serialize};

use crate::fact::Fact;
use crate::id::VarId;
use crate::operator::Operator;

/// An assignment of one value to every task variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State(Vec<u32>);

impl State {
    /// Creates a state from per-variable values, indexed by `VarId`.
    pub fn new(values: Vec<u32>) -> Self {
        State(values)
    }

    /// Returns the value assigned to `var`.
    pub fn value(&self, var: VarId) -> u32 {
        self.0[var.index()]
    }

    /// Returns `true` if the fact holds in this state.
    pub fn holds(&self, fact: Fact) -> bool {
        self.value(fact.var) == fact.value
    }

    /// Number of variables covered by this state.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the state covers no variables.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the successor state reached by applying `op`.
    ///
    /// The operator must be applicable in this state; conditional effects
    /// fire only if their conditions hold.
    pub fn apply(&self, op: &Operator) -> State {
        debug_assert!(op.is_applicable(self));
        let mut values = self.0.clone();
        for effect in op.effects() {
            if effect.fires_in(self) {
                values[effect.var.index()] = effect.post;
            }
        }
        State(values)
    }

    /// Raw per-variable values, indexed by `VarId`.
    pub fn values(&self) -> &[u32] {
        &self.0
    }
}
