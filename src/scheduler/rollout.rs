//! Episode rollouts.
//!
//! Drives a [`JobShopEnv`] with a [`Policy`] from reset to termination and
//! summarizes the result. Useful as a benchmark harness: the same instance
//! can be rolled out under dispatching rules, a random policy, or a
//! learned agent wrapped as a `Policy`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Policy, ScheduleKpi};
use crate::env::{JobShopEnv, Observation};
use crate::error::{EnvError, Result};
use crate::models::{Instance, InstanceData, Schedule, Time};

/// Outcome of one complete episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub case_name: Option<String>,
    pub policy: String,
    pub makespan: Time,
    pub total_reward: f64,
    /// External `step` calls made by the policy.
    pub steps: usize,
    pub no_op_count: usize,
    pub schedule: Schedule,
    pub kpi: ScheduleKpi,
}

/// Resets `env` on `data` and plays one episode with `policy`.
pub fn rollout<P: Policy + ?Sized>(
    env: &mut JobShopEnv,
    data: &InstanceData,
    policy: &mut P,
) -> Result<EpisodeSummary> {
    let obs = env.reset(data)?;
    play(env, obs, policy)
}

/// Like [`rollout`], for an already validated instance.
pub fn rollout_instance<P: Policy + ?Sized>(
    env: &mut JobShopEnv,
    instance: Instance,
    policy: &mut P,
) -> Result<EpisodeSummary> {
    let obs = env.reset_instance(instance)?;
    play(env, obs, policy)
}

fn play<P: Policy + ?Sized>(
    env: &mut JobShopEnv,
    mut obs: Observation,
    policy: &mut P,
) -> Result<EpisodeSummary> {
    let mut total_reward = 0.0;

    let info = loop {
        let action = policy.act(&obs);
        let result = env.step(action)?;
        total_reward += result.reward;
        if result.done {
            break result.info;
        }
        obs = result.observation;
    };

    // the terminal step always carries the KPI
    let (Some(schedule), Some(kpi)) = (env.schedule(), info.kpi) else {
        return Err(EnvError::NotRunning(env.status()).into());
    };

    let summary = EpisodeSummary {
        case_name: env.case_name().map(str::to_string),
        policy: policy.name().to_string(),
        makespan: schedule.makespan(),
        total_reward,
        steps: info.steps,
        no_op_count: info.no_op_count,
        schedule,
        kpi,
    };
    debug!(
        policy = %summary.policy,
        makespan = summary.makespan,
        reward = summary.total_reward,
        "rollout finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvConfig;
    use crate::dispatching::{rules, RuleEngine};
    use crate::scheduler::RandomPolicy;

    fn two_by_two() -> InstanceData {
        InstanceData::new(2)
            .with_name("ft02")
            .with_job(vec![(0, 3), (1, 2)])
            .with_job(vec![(1, 2), (0, 4)])
    }

    #[test]
    fn test_rollout_with_rule_engine() {
        let mut env = JobShopEnv::new(EnvConfig::default());
        let mut policy = RuleEngine::new().with_rule(rules::Mwkr);
        let summary = rollout(&mut env, &two_by_two(), &mut policy).unwrap();

        assert_eq!(summary.case_name.as_deref(), Some("ft02"));
        assert_eq!(summary.policy, "MWKR");
        assert_eq!(summary.makespan, summary.kpi.makespan);
        assert_eq!(summary.total_reward, -(summary.makespan as f64));
        assert_eq!(summary.schedule.assignment_count(), 4);
    }

    #[test]
    fn test_rollout_instance_with_random_policy() {
        let instance = Instance::new(two_by_two()).unwrap();
        let mut env = JobShopEnv::new(EnvConfig::default().with_no_op(true));
        let mut policy = RandomPolicy::seeded(3);
        let summary = rollout_instance(&mut env, instance.clone(), &mut policy).unwrap();

        assert!(summary.schedule.verify(&instance).is_empty());
        assert!(summary.makespan >= instance.lower_bound());
    }
}
