//! Core error types for lmplan-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of task construction and validation.

use crate::fact::Fact;
use crate::id::VarId;
use thiserror::Error;

/// Core errors produced by the lmplan-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A fact references a variable that does not exist in the task.
    #[error("unknown variable: {var}")]
    UnknownVariable { var: VarId },

    /// A fact's value lies outside its variable's domain.
    #[error("value out of range: {fact} (domain size {domain})")]
    ValueOutOfRange { fact: Fact, domain: u32 },

    /// The initial state does not assign a value to every variable.
    #[error("initial state covers {actual} variables, task has {expected}")]
    StateLengthMismatch { expected: usize, actual: usize },

    /// A variable was declared with an empty domain.
    #[error("variable {var} has an empty domain")]
    EmptyDomain { var: VarId },

    /// An operator effect sets a variable to its required previous value.
    #[error("operator '{name}' has a self-loop effect on {var}")]
    SelfLoopEffect { name: String, var: VarId },
}
