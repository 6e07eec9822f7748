//! Environment configuration.

use serde::{Deserialize, Serialize};

use crate::reward::RewardKind;

/// Knobs of a [`JobShopEnv`](crate::env::JobShopEnv).
///
/// Serializable so a training run can store the exact setup next to its
/// results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Apply decisions with exactly one legal action inside `step`
    /// without consulting the policy.
    pub auto_advance_singletons: bool,

    /// Expose a no-op action (index == number of eligible operations)
    /// that lets time pass to the next completion.
    pub allow_no_op: bool,

    /// Built-in reward function.
    pub reward: RewardKind,

    /// Multiplier applied to every reward.
    pub reward_scale: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            auto_advance_singletons: false,
            allow_no_op: false,
            reward: RewardKind::MakespanIncrease,
            reward_scale: 1.0,
        }
    }
}

impl EnvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_advance_singletons(mut self, enabled: bool) -> Self {
        self.auto_advance_singletons = enabled;
        self
    }

    pub fn with_no_op(mut self, enabled: bool) -> Self {
        self.allow_no_op = enabled;
        self
    }

    pub fn with_reward(mut self, reward: RewardKind) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_reward_scale(mut self, scale: f64) -> Self {
        self.reward_scale = scale;
        self
    }
}
