//! Post-discovery order approximation.

pub mod reasonable;

pub use reasonable::add_reasonable_orders;
