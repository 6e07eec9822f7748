//! Time-advance job-shop simulation environment.
//!
//! Models Job Shop Scheduling Problems (JSSP) as a discrete-event
//! reinforcement-learning environment. The clock is never ticked: every
//! `step` jumps straight to the next decision point, the earliest time a
//! free machine has an eligible operation waiting, and asks the policy
//! which of the ready operations to start.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Instance`, `OpId`, `Schedule`, `Assignment`
//! - **`validation`**: Input integrity checks (empty jobs, machine refs, durations)
//! - **`engine`**: Episode state, time advancer and action mapper
//! - **`reward`**: Pluggable reward functions and termination
//! - **`env`**: `JobShopEnv` reset/step façade and `Observation`
//! - **`config`**: Serializable environment settings
//! - **`dispatching`**: Priority rules (SPT, MWKR, ...) and rule engine
//! - **`scheduler`**: Policies, rollouts and schedule KPIs
//! - **`generator`**: Random Taillard-style instances
//!
//! # Guarantees
//!
//! Every completed episode yields a feasible schedule: no machine runs two
//! operations at once, job order is respected, and each operation runs
//! exactly once for its full duration. Episodes are deterministic given
//! the instance and the action sequence.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Giffler & Thompson (1960), "Algorithms for Solving Production-Scheduling Problems"
//! - Zhang et al. (2020), "Learning to Dispatch for Job Shop Scheduling via
//!   Deep Reinforcement Learning"

pub mod config;
pub mod dispatching;
pub mod engine;
pub mod env;
pub mod error;
pub mod generator;
pub mod models;
pub mod reward;
pub mod scheduler;
pub mod validation;

pub use config::EnvConfig;
pub use env::{EnvStatus, JobShopEnv, Observation, StepInfo, StepResult};
pub use error::{Error, Result};
pub use models::{Instance, InstanceData, OpId, Schedule, Time};
