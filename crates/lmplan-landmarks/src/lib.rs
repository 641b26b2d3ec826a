//! Landmark graph engine for SAS+ planning tasks.
//!
//! A *landmark* is a fact (or a small disjunction of facts) that every plan
//! must make true at some point. This crate discovers landmarks by backward
//! chaining from the goal over a delete-relaxed reachability oracle, infers
//! ordering constraints between them, and repairs the heuristic orders into
//! a DAG. The finished [`LandmarkGraph`] exposes per-node facts, goal
//! membership, cost bounds, and typed parent/child edges for consumption by
//! search heuristics.
//!
//! The usual entry point is [`build_landmark_graph`]:
//!
//! ```
//! use lmplan_core::{Effect, Fact, Operator, PlanningTask, State, VarId, Variable};
//! use lmplan_landmarks::{build_landmark_graph, LandmarkOptions};
//!
//! let task = PlanningTask::new(
//!     vec![Variable::new("v0", 2), Variable::new("v1", 2)],
//!     State::new(vec![0, 0]),
//!     vec![Fact::new(VarId(1), 1)],
//!     vec![
//!         Operator::new("a", vec![], vec![Effect::new(VarId(0), Some(0), 1)], 1.0),
//!         Operator::new(
//!             "b",
//!             vec![Fact::new(VarId(0), 1)],
//!             vec![Effect::new(VarId(1), Some(0), 1)],
//!             1.0,
//!         ),
//!     ],
//! )
//! .unwrap();
//! let graph = build_landmark_graph(&task, &LandmarkOptions::default()).unwrap();
//! assert!(graph.landmark_exists(Fact::new(VarId(0), 1)));
//! assert!(graph.is_acyclic());
//! ```

pub mod discover;
pub mod error;
pub mod graph;
pub mod id;
pub mod index;
pub mod orders;
pub mod reachability;

pub use discover::LandmarkGenerator;
pub use error::LandmarkError;
pub use graph::{Landmark, LandmarkGraph, LandmarkNode, OrderType};
pub use id::LandmarkId;
pub use index::OperatorIndex;
pub use orders::add_reasonable_orders;
pub use reachability::{
    DeleteRelaxation, FactLevels, OperatorLevels, ReachabilityLevels, ReachabilityOracle,
    ReachabilityQuery, UNREACHABLE,
};

use lmplan_core::{InconsistencyTable, PlanningTask};

/// Knobs for [`build_landmark_graph`].
#[derive(Debug, Clone)]
pub struct LandmarkOptions {
    /// Run the reasonable-order approximation after discovery.
    pub reasonable_orders: bool,
    /// Additionally run the obedient-reasonable pass. Has no effect unless
    /// `reasonable_orders` is set.
    pub obedient_orders: bool,
}

impl Default for LandmarkOptions {
    fn default() -> Self {
        LandmarkOptions {
            reasonable_orders: true,
            obedient_orders: true,
        }
    }
}

/// Builds the complete landmark graph for `task`: discovery with the
/// reference delete-relaxation oracle, order approximation per `options`,
/// and acyclification.
pub fn build_landmark_graph(
    task: &PlanningTask,
    options: &LandmarkOptions,
) -> Result<LandmarkGraph, LandmarkError> {
    let index = OperatorIndex::new(task);
    let oracle = DeleteRelaxation::new(task);
    let mut graph = LandmarkGenerator::new(task, oracle, &index).discover()?;
    if options.reasonable_orders {
        let mutexes = InconsistencyTable::from_task(task);
        add_reasonable_orders(&mut graph, task, &index, &mutexes, false);
        if options.obedient_orders {
            add_reasonable_orders(&mut graph, task, &index, &mutexes, true);
        }
    }
    graph.acyclify()?;
    Ok(graph)
}
