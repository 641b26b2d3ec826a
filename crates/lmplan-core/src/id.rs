//! Stable ID newtypes for task entities.
//!
//! All IDs are distinct newtype wrappers over `u32`, providing type safety
//! so that a `VarId` cannot be accidentally used where an `OpId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State variable identity within a planning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(pub u32);

/// Operator identity within a planning task. Axioms share the same ID space
/// as regular operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OpId(pub u32);

impl VarId {
    /// Returns the ID as a `usize` for direct table indexing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl OpId {
    /// Returns the ID as a `usize` for direct table indexing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// Display implementations -- just print the inner value.

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "o{}", self.0)
    }
}
