//! SAS+ operators: prevail conditions, effects, costs.
//!
//! An [`Operator`] carries two kinds of conditions. *Prevail* conditions are
//! variables that must hold a value which the operator does not change.
//! [`Effect`]s change a variable to a `post` value, optionally requiring a
//! `pre` value on the same variable and/or a set of extra effect conditions
//! (conditional effects). Axioms are represented as zero-cost operators with
//! the `axiom` flag set.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::fact::Fact;
use crate::id::VarId;
use crate::state::State;

/// A single variable change caused by an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// The variable being set.
    pub var: VarId,
    /// Required previous value of `var`, if any. `None` means the effect
    /// applies regardless of the variable's current value.
    pub pre: Option<u32>,
    /// The value `var` takes after the operator fires.
    pub post: u32,
    /// Extra effect conditions on *other* facts; the effect fires only if
    /// all of them hold. Empty for unconditional effects.
    pub conditions: SmallVec<[Fact; 2]>,
}

impl Effect {
    /// Creates an unconditional effect.
    pub fn new(var: VarId, pre: Option<u32>, post: u32) -> Self {
        Effect {
            var,
            pre,
            post,
            conditions: SmallVec::new(),
        }
    }

    /// Creates a conditional effect.
    pub fn conditional(var: VarId, pre: Option<u32>, post: u32, conditions: Vec<Fact>) -> Self {
        Effect {
            var,
            pre,
            post,
            conditions: conditions.into(),
        }
    }

    /// Returns `true` if this effect has effect conditions.
    pub fn is_conditional(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// The fact this effect makes true.
    pub fn fact(&self) -> Fact {
        Fact::new(self.var, self.post)
    }

    /// The precondition fact on the effect variable, if any.
    pub fn precondition(&self) -> Option<Fact> {
        self.pre.map(|value| Fact::new(self.var, value))
    }

    /// Returns `true` if the effect would fire in `state` (its `pre` and all
    /// effect conditions hold).
    pub fn fires_in(&self, state: &State) -> bool {
        if let Some(pre) = self.pre {
            if state.value(self.var) != pre {
                return false;
            }
        }
        self.conditions.iter().all(|&cond| state.holds(cond))
    }
}

/// A SAS+ operator (or axiom).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    name: String,
    prevails: SmallVec<[Fact; 2]>,
    effects: SmallVec<[Effect; 2]>,
    cost: f64,
    axiom: bool,
}

impl Operator {
    /// Creates a regular operator.
    pub fn new(
        name: impl Into<String>,
        prevails: Vec<Fact>,
        effects: Vec<Effect>,
        cost: f64,
    ) -> Self {
        Operator {
            name: name.into(),
            prevails: prevails.into(),
            effects: effects.into(),
            cost,
            axiom: false,
        }
    }

    /// Creates an axiom: a zero-cost derived-variable rule.
    pub fn axiom(name: impl Into<String>, prevails: Vec<Fact>, effects: Vec<Effect>) -> Self {
        Operator {
            name: name.into(),
            prevails: prevails.into(),
            effects: effects.into(),
            cost: 0.0,
            axiom: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prevails(&self) -> &[Fact] {
        &self.prevails
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn is_axiom(&self) -> bool {
        self.axiom
    }

    /// Returns `true` if the operator has no precondition at all: no prevail
    /// conditions and no effect with a required previous value.
    pub fn has_no_preconditions(&self) -> bool {
        self.prevails.is_empty() && self.effects.iter().all(|e| e.pre.is_none())
    }

    /// Returns `true` if all prevail conditions and effect preconditions
    /// hold in `state`. Effect conditions are not checked here; they gate
    /// individual effects, not applicability.
    pub fn is_applicable(&self, state: &State) -> bool {
        self.prevails.iter().all(|&p| state.holds(p))
            && self
                .effects
                .iter()
                .all(|e| e.pre.map_or(true, |pre| state.value(e.var) == pre))
    }

    /// Returns `true` if some *unconditional* effect of this operator makes
    /// `fact` true. Conditional effects do not count: they may fail to fire.
    pub fn unconditionally_achieves(&self, fact: Fact) -> bool {
        self.effects
            .iter()
            .any(|e| !e.is_conditional() && e.fact() == fact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pickup() -> Operator {
        Operator::new(
            "pickup",
            vec![Fact::new(VarId(0), 1)],
            vec![Effect::new(VarId(1), Some(0), 1)],
            2.0,
        )
    }

    #[test]
    fn applicability_checks_prevails_and_effect_pres() {
        let op = pickup();
        assert!(op.is_applicable(&State::new(vec![1, 0])));
        assert!(!op.is_applicable(&State::new(vec![0, 0]))); // prevail fails
        assert!(!op.is_applicable(&State::new(vec![1, 1]))); // effect pre fails
    }

    #[test]
    fn unconditional_achievement() {
        let op = pickup();
        assert!(op.unconditionally_achieves(Fact::new(VarId(1), 1)));
        assert!(!op.unconditionally_achieves(Fact::new(VarId(1), 0)));

        let cond = Operator::new(
            "maybe",
            vec![],
            vec![Effect::conditional(
                VarId(0),
                None,
                1,
                vec![Fact::new(VarId(1), 1)],
            )],
            1.0,
        );
        assert!(!cond.unconditionally_achieves(Fact::new(VarId(0), 1)));
    }

    #[test]
    fn no_precondition_detection() {
        let free = Operator::new("free", vec![], vec![Effect::new(VarId(0), None, 1)], 1.0);
        assert!(free.has_no_preconditions());
        assert!(!pickup().has_no_preconditions());
    }

    #[test]
    fn axioms_are_zero_cost() {
        let ax = Operator::axiom("derive", vec![], vec![Effect::new(VarId(0), None, 1)]);
        assert!(ax.is_axiom());
        assert_eq!(ax.cost(), 0.0);
    }
}
