//! Reward functions and termination.
//!
//! A reward function scores each applied action from its [`Transition`].
//! Rewards are "lower cost = higher reward", so every built-in returns a
//! non-positive value.
//!
//! | Kind | Reward per action | Episode sum |
//! |------|-------------------|-------------|
//! | `MakespanIncrease` | −(makespan after − makespan before) | −makespan |
//! | `IdleTime` | −(gap opened on the machine) | −total machine idle time |
//!
//! # Reference
//! Zhang et al. (2020), "Learning to Dispatch for Job Shop Scheduling via
//! Deep Reinforcement Learning" (makespan-increment reward)

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::engine::{EpisodeState, Transition};

/// Scores a single transition.
pub trait RewardFunction: Send + Sync + Debug {
    /// Short name (e.g., "makespan").
    fn name(&self) -> &'static str;

    fn reward(&self, transition: &Transition) -> f64;
}

/// Negative increase of the running makespan.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakespanIncrease;

impl RewardFunction for MakespanIncrease {
    fn name(&self) -> &'static str {
        "makespan"
    }

    fn reward(&self, transition: &Transition) -> f64 {
        -(transition.makespan_increase() as f64)
    }
}

/// Negative machine idle time introduced by an assignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleTime;

impl RewardFunction for IdleTime {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn reward(&self, transition: &Transition) -> f64 {
        -(transition.machine_idle as f64)
    }
}

/// Serializable selector for the built-in reward functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    #[default]
    MakespanIncrease,
    IdleTime,
}

impl RewardKind {
    pub fn build(self) -> Arc<dyn RewardFunction> {
        match self {
            Self::MakespanIncrease => Arc::new(MakespanIncrease),
            Self::IdleTime => Arc::new(IdleTime),
        }
    }
}

/// Whether the episode is over: every operation completed.
pub fn is_terminal(state: &EpisodeState) -> bool {
    state.is_complete()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ActionKind;
    use crate::models::{Assignment, OpId};

    fn transition(idle: i64, before: i64, after: i64) -> Transition {
        Transition {
            kind: ActionKind::Schedule(Assignment::new(OpId::new(0, 0), 0, idle, idle + 1)),
            clock: idle,
            machine_idle: idle,
            makespan_before: before,
            makespan_after: after,
        }
    }

    #[test]
    fn test_makespan_increase() {
        assert_eq!(MakespanIncrease.reward(&transition(0, 3, 7)), -4.0);
        assert_eq!(MakespanIncrease.reward(&transition(0, 7, 7)), 0.0);
    }

    #[test]
    fn test_idle_time() {
        assert_eq!(IdleTime.reward(&transition(5, 0, 6)), -5.0);
    }

    #[test]
    fn test_wait_scores_zero() {
        let t = Transition {
            kind: ActionKind::Wait,
            clock: 2,
            machine_idle: 0,
            makespan_before: 9,
            makespan_after: 9,
        };
        assert_eq!(MakespanIncrease.reward(&t), 0.0);
        assert_eq!(IdleTime.reward(&t), 0.0);
    }

    #[test]
    fn test_kind_builds_and_serializes() {
        assert_eq!(RewardKind::default().build().name(), "makespan");
        assert_eq!(RewardKind::IdleTime.build().name(), "idle");
        assert_eq!(
            serde_json::to_string(&RewardKind::IdleTime).unwrap(),
            "\"idle_time\""
        );
    }
}
