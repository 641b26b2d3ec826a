//! The planning task container.
//!
//! [`PlanningTask`] is the single read-only input to the landmark engine:
//! variables with finite domains, the initial state, the goal condition, the
//! operator set (axioms included), plus two optional registries -- predicate
//! names per fact (used to group disjunctive landmark candidates) and
//! invariant groups of mutually exclusive facts (used by the reasonable-order
//! approximation).
//!
//! All construction goes through validating methods so that every consumer
//! may assume facts are in range and states are well-formed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::fact::{Fact, Predicate};
use crate::id::{OpId, VarId};
use crate::operator::Operator;
use crate::state::State;

/// A finite-domain state variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Human-readable name, used only for diagnostics.
    pub name: String,
    /// Domain size; values range over `0..domain`.
    pub domain: u32,
}

impl Variable {
    /// Creates a variable with the given name and domain size.
    pub fn new(name: impl Into<String>, domain: u32) -> Self {
        Variable {
            name: name.into(),
            domain,
        }
    }
}

/// A complete SAS+ planning task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningTask {
    variables: Vec<Variable>,
    initial: State,
    goal: Vec<Fact>,
    operators: Vec<Operator>,
    /// Predicate names per fact; facts without an entry are ignored for
    /// disjunctive landmark grouping. Serialized as a sequence of pairs
    /// since the keys are not strings.
    #[serde(with = "predicate_entries")]
    predicates: IndexMap<Fact, Predicate>,
    /// Invariant groups: within each group, facts are pairwise mutually
    /// exclusive.
    mutex_groups: Vec<Vec<Fact>>,
}

mod predicate_entries {
    use super::{Fact, IndexMap, Predicate};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        map: &IndexMap<Fact, Predicate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<Fact, Predicate>, D::Error> {
        let entries: Vec<(Fact, Predicate)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

impl PlanningTask {
    /// Creates a validated task.
    ///
    /// Checks that every variable has a non-empty domain, the initial state
    /// assigns an in-range value to every variable, and every fact mentioned
    /// by the goal or by an operator is in range.
    pub fn new(
        variables: Vec<Variable>,
        initial: State,
        goal: Vec<Fact>,
        operators: Vec<Operator>,
    ) -> Result<Self, CoreError> {
        for (i, var) in variables.iter().enumerate() {
            if var.domain == 0 {
                return Err(CoreError::EmptyDomain {
                    var: VarId(i as u32),
                });
            }
        }
        if initial.len() != variables.len() {
            return Err(CoreError::StateLengthMismatch {
                expected: variables.len(),
                actual: initial.len(),
            });
        }
        let task = PlanningTask {
            variables,
            initial,
            goal,
            operators,
            predicates: IndexMap::new(),
            mutex_groups: Vec::new(),
        };
        for (i, &value) in task.initial.values().iter().enumerate() {
            task.check_fact(Fact::new(VarId(i as u32), value))?;
        }
        for &fact in &task.goal {
            task.check_fact(fact)?;
        }
        for op in &task.operators {
            for &prevail in op.prevails() {
                task.check_fact(prevail)?;
            }
            for effect in op.effects() {
                task.check_fact(effect.fact())?;
                if let Some(pre) = effect.precondition() {
                    task.check_fact(pre)?;
                    if pre.value == effect.post {
                        return Err(CoreError::SelfLoopEffect {
                            name: op.name().to_string(),
                            var: effect.var,
                        });
                    }
                }
                for &cond in &effect.conditions {
                    task.check_fact(cond)?;
                }
            }
        }
        Ok(task)
    }

    fn check_fact(&self, fact: Fact) -> Result<(), CoreError> {
        match self.variables.get(fact.var.index()) {
            None => Err(CoreError::UnknownVariable { var: fact.var }),
            Some(var) if fact.value >= var.domain => Err(CoreError::ValueOutOfRange {
                fact,
                domain: var.domain,
            }),
            Some(_) => Ok(()),
        }
    }

    /// Registers the predicate behind a fact.
    pub fn set_predicate(&mut self, fact: Fact, predicate: Predicate) -> Result<(), CoreError> {
        self.check_fact(fact)?;
        self.predicates.insert(fact, predicate);
        Ok(())
    }

    /// Registers an invariant group: a set of facts of which at most one can
    /// hold in any reachable state.
    pub fn add_mutex_group(&mut self, facts: Vec<Fact>) -> Result<(), CoreError> {
        for &fact in &facts {
            self.check_fact(fact)?;
        }
        self.mutex_groups.push(facts);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Domain size of `var`.
    pub fn domain(&self, var: VarId) -> u32 {
        self.variables[var.index()].domain
    }

    pub fn initial(&self) -> &State {
        &self.initial
    }

    pub fn goal(&self) -> &[Fact] {
        &self.goal
    }

    /// Returns `true` if `fact` is part of the goal condition.
    pub fn goal_contains(&self, fact: Fact) -> bool {
        self.goal.contains(&fact)
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }

    pub fn operator(&self, id: OpId) -> &Operator {
        &self.operators[id.index()]
    }

    /// Predicate behind `fact`, if one was registered.
    pub fn predicate(&self, fact: Fact) -> Option<&Predicate> {
        self.predicates.get(&fact)
    }

    pub fn mutex_groups(&self) -> &[Vec<Fact>] {
        &self.mutex_groups
    }

    /// Iterates over every fact of the task, variable by variable.
    pub fn facts(&self) -> impl Iterator<Item = Fact> + '_ {
        self.variables.iter().enumerate().flat_map(|(i, var)| {
            (0..var.domain).map(move |value| Fact::new(VarId(i as u32), value))
        })
    }
}
