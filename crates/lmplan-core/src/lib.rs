pub mod dtg;
pub mod error;
pub mod fact;
pub mod id;
pub mod mutex;
pub mod operator;
pub mod state;
pub mod task;

// Re-export commonly used types
pub use dtg::{build_transition_graphs, DomainTransitionGraph};
pub use error::CoreError;
pub use fact::{Fact, Predicate};
pub use id::{OpId, VarId};
pub use mutex::InconsistencyTable;
pub use operator::{Effect, Operator};
pub use state::State;
pub use task::{PlanningTask, Variable};
