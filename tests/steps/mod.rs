//! Step definitions for the behavioural test suite.

mod env_steps;
mod master_steps;
mod variable_steps;

pub use env_steps::EnvWorld;
pub use master_steps::MasterWorld;
pub use variable_steps::VariableWorld;
