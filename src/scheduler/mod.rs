//! Policies, rollouts and KPI evaluation.
//!
//! Baseline decision makers for the environment and schedule quality
//! metrics.
//!
//! # Policies
//!
//! `Policy` maps an observation to an action index. `RandomPolicy` picks
//! uniformly among legal actions; a dispatching
//! [`RuleEngine`](crate::dispatching::RuleEngine) is a greedy priority
//! policy. `rollout` plays a full episode and returns an `EpisodeSummary`.
//!
//! # KPI
//!
//! `ScheduleKpi` computes standard scheduling metrics: makespan, gap to the
//! lower bound, idle time, utilization, and flow time.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod kpi;
mod policy;
mod rollout;

pub use kpi::ScheduleKpi;
pub use policy::{Policy, RandomPolicy};
pub use rollout::{rollout, rollout_instance, EpisodeSummary};
