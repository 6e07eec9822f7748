//! Time-advance simulation engine.
//!
//! - **`state`**: [`EpisodeState`], the mutable disjunctive-graph state
//! - **`advancer`**: [`TimeAdvancer`], owner of the clock; finds decision points
//! - **`mapper`**: maps action indices onto state mutations
//!
//! The three pieces are independent of any RL interface; the environment
//! façade in [`crate::env`] composes them.

mod advancer;
pub mod mapper;
mod state;

pub use advancer::{DecisionPoint, TimeAdvancer};
pub use mapper::{ActionKind, Transition};
pub use state::{EpisodeState, JobState, MachineState, OpStatus, OperationState};
