//! Reset/step environment façade.
//!
//! [`JobShopEnv`] composes instance validation, the episode state, the
//! time advancer, the action mapper and the reward function into the
//! interface an external training loop consumes.
//!
//! # Lifecycle
//!
//! ```md
//! Current status | Call        | Next status | Notes
//! ---------------|-------------|-------------|----------------------------------
//! any            | reset()     | Running     | New instance, fresh state
//! Running/Done   | restart()   | Running     | Same instance, fresh state
//! Running        | step()      | Running     | Invalid action: error, no change
//! Running        | step()      | Done        | Every operation completed
//! Running        | step()      | Failed      | Internal consistency error
//! Ready/Done/Failed | step()   | unchanged   | Error::Env(NotRunning)
//! ```
//!
//! # Example
//!
//! ```
//! use jssp_env::env::JobShopEnv;
//! use jssp_env::config::EnvConfig;
//! use jssp_env::models::InstanceData;
//!
//! let data = InstanceData::new(2)
//!     .with_job(vec![(0, 3), (1, 2)])
//!     .with_job(vec![(1, 2), (0, 4)]);
//!
//! let mut env = JobShopEnv::new(EnvConfig::default());
//! let obs = env.reset(&data).unwrap();
//! assert_eq!(obs.num_actions(), 2);
//! let mut total = 0.0;
//! loop {
//!     let result = env.step(0).unwrap();
//!     total += result.reward;
//!     if result.done {
//!         assert_eq!(result.info.final_makespan, Some(7));
//!         break;
//!     }
//! }
//! assert_eq!(total, -7.0);
//! ```

mod observation;

pub use observation::{EligibleOp, Observation};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::EnvConfig;
use crate::engine::mapper::{self, can_wait, legal_action_count};
use crate::engine::{DecisionPoint, EpisodeState, TimeAdvancer};
use crate::error::{EnvError, Result};
use crate::models::{Instance, InstanceData, Schedule, Time};
use crate::reward::{self, RewardFunction};
use crate::scheduler::ScheduleKpi;

/// Lifecycle status of the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvStatus {
    /// Waiting for `reset()`.
    Ready,
    /// An episode is active.
    Running,
    /// The episode ended with every operation completed.
    Done,
    /// The engine hit an internal consistency error; the episode is invalid.
    Failed,
}

/// Diagnostics returned with every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    pub clock: Time,
    /// Running makespan of the partial schedule.
    pub makespan: Time,
    /// External `step` calls so far.
    pub steps: usize,
    /// Actions applied so far, auto-advanced ones included.
    pub decisions: usize,
    /// Singleton decisions applied inside this step.
    pub auto_advanced: usize,
    pub no_op_count: usize,
    /// Set on the terminal step.
    pub final_makespan: Option<Time>,
    /// Set on the terminal step.
    pub kpi: Option<ScheduleKpi>,
}

/// Output of [`JobShopEnv::step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// Everything owned by one running episode.
#[derive(Debug, Clone)]
struct Episode {
    instance: Instance,
    state: EpisodeState,
    advancer: TimeAdvancer,
    decision: DecisionPoint,
    steps: usize,
    decisions: usize,
    no_op_count: usize,
}

impl Episode {
    fn start(instance: Instance) -> Result<Self> {
        let mut state = EpisodeState::new(&instance);
        let mut advancer = TimeAdvancer::new();
        let decision = advancer.advance(&instance, &mut state)?;
        Ok(Self {
            instance,
            state,
            advancer,
            decision,
            steps: 0,
            decisions: 0,
            no_op_count: 0,
        })
    }

    fn can_wait(&self, config: &EnvConfig) -> bool {
        can_wait(&self.decision, &self.state, config.allow_no_op)
    }

    fn observation(&self, config: &EnvConfig) -> Observation {
        Observation::new(&self.instance, &self.state, &self.decision, self.can_wait(config))
    }

    /// Applies one action and advances to the next decision point.
    fn apply(&mut self, action: usize, config: &EnvConfig, reward_fn: &dyn RewardFunction) -> Result<f64> {
        let transition = mapper::apply(
            &self.instance,
            &mut self.state,
            &self.decision,
            action,
            config.allow_no_op,
        )?;

        self.decision = if transition.is_wait() {
            self.no_op_count += 1;
            match self.advancer.wait(&self.instance, &mut self.state)? {
                Some(decision) => decision,
                None => self.advancer.advance(&self.instance, &mut self.state)?,
            }
        } else {
            self.advancer.advance(&self.instance, &mut self.state)?
        };
        self.decisions += 1;

        Ok(reward_fn.reward(&transition) * config.reward_scale)
    }

    /// One external step: the policy's action, then any forced singletons.
    fn step(&mut self, action: usize, config: &EnvConfig, reward_fn: &dyn RewardFunction) -> Result<(f64, usize)> {
        let mut reward = self.apply(action, config, reward_fn)?;
        let mut auto_advanced = 0;

        if config.auto_advance_singletons {
            while legal_action_count(&self.decision, &self.state, config.allow_no_op) == 1 {
                reward += self.apply(0, config, reward_fn)?;
                auto_advanced += 1;
            }
        }

        self.steps += 1;
        Ok((reward, auto_advanced))
    }
}

/// Time-advance job-shop environment.
///
/// Each instance owns its state exclusively; independent environments can
/// run on separate threads.
#[derive(Debug, Clone)]
pub struct JobShopEnv {
    config: EnvConfig,
    reward_fn: Arc<dyn RewardFunction>,
    episode: Option<Episode>,
    status: EnvStatus,
}

impl JobShopEnv {
    pub fn new(config: EnvConfig) -> Self {
        let reward_fn = config.reward.build();
        Self {
            config,
            reward_fn,
            episode: None,
            status: EnvStatus::Ready,
        }
    }

    /// Replaces the configured reward with a custom one.
    pub fn with_reward_fn(self, reward_fn: Arc<dyn RewardFunction>) -> Self {
        Self { reward_fn, ..self }
    }

    /// Validates `data` and starts a new episode on it.
    ///
    /// Fails with [`Error::Validation`](crate::error::Error::Validation) on malformed input; the previous
    /// episode (if any) is left untouched in that case.
    pub fn reset(&mut self, data: &InstanceData) -> Result<Observation> {
        let instance = Instance::new(data.clone())?;
        self.reset_instance(instance)
    }

    /// Starts a new episode on an already validated instance.
    pub fn reset_instance(&mut self, instance: Instance) -> Result<Observation> {
        let name = instance.name().unwrap_or("unnamed").to_string();
        let (jobs, machines) = (instance.job_count(), instance.machine_count());

        let episode = match Episode::start(instance) {
            Ok(episode) => episode,
            Err(e) => {
                error!(error = %e, "episode failed to start");
                self.episode = None;
                self.status = EnvStatus::Failed;
                return Err(e);
            }
        };

        info!(case = %name, jobs, machines, "Environment Reset");
        let obs = episode.observation(&self.config);
        self.episode = Some(episode);
        self.status = EnvStatus::Running;
        Ok(obs)
    }

    /// Starts a fresh episode on the current instance.
    pub fn restart(&mut self) -> Result<Observation> {
        let instance = self
            .episode
            .take()
            .map(|ep| ep.instance)
            .ok_or(EnvError::NotRunning(self.status))?;
        self.reset_instance(instance)
    }

    /// Applies `action` and advances to the next decision point.
    ///
    /// `action` indexes the current decision set (see
    /// [`Observation::eligible`]); with `allow_no_op`, index
    /// `eligible.len()` waits for the next completion.
    ///
    /// An out-of-range action fails with [`Error::InvalidAction`](crate::error::Error::InvalidAction) and
    /// leaves the environment exactly as it was.
    #[tracing::instrument(skip(self), fields(clock = self.clock()))]
    pub fn step(&mut self, action: usize) -> Result<StepResult> {
        if self.status != EnvStatus::Running {
            return Err(EnvError::NotRunning(self.status).into());
        }
        let Some(episode) = self.episode.as_mut() else {
            return Err(EnvError::NotRunning(self.status).into());
        };

        let (reward, auto_advanced) =
            match episode.step(action, &self.config, self.reward_fn.as_ref()) {
                Ok(out) => out,
                Err(e) if e.is_recoverable() => {
                    warn!(reason = "validation", error = %e, "Action Rejected");
                    return Err(e);
                }
                Err(e) => {
                    error!(error = %e, "consistency violation, episode discarded");
                    self.status = EnvStatus::Failed;
                    return Err(e);
                }
            };

        let done = reward::is_terminal(&episode.state);
        let mut info = StepInfo {
            clock: episode.advancer.clock(),
            makespan: episode.state.makespan(),
            steps: episode.steps,
            decisions: episode.decisions,
            auto_advanced,
            no_op_count: episode.no_op_count,
            final_makespan: None,
            kpi: None,
        };

        if done {
            let schedule = episode.state.to_schedule(&episode.instance);
            info.final_makespan = Some(schedule.makespan());
            info.kpi = Some(ScheduleKpi::calculate(&schedule, &episode.instance));
            info!(
                makespan = schedule.makespan(),
                steps = episode.steps,
                no_ops = episode.no_op_count,
                "Episode Done"
            );
            self.status = EnvStatus::Done;
        }

        Ok(StepResult {
            observation: episode.observation(&self.config),
            reward,
            done,
            info,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn status(&self) -> EnvStatus {
        self.status
    }

    pub fn instance(&self) -> Option<&Instance> {
        self.episode.as_ref().map(|ep| &ep.instance)
    }

    pub fn state(&self) -> Option<&EpisodeState> {
        self.episode.as_ref().map(|ep| &ep.state)
    }

    pub fn decision(&self) -> Option<&DecisionPoint> {
        self.episode.as_ref().map(|ep| &ep.decision)
    }

    /// Current simulation time (0 before the first reset).
    pub fn clock(&self) -> Time {
        self.episode.as_ref().map_or(0, |ep| ep.advancer.clock())
    }

    /// Observation at the current decision point.
    pub fn observation(&self) -> Option<Observation> {
        self.episode.as_ref().map(|ep| ep.observation(&self.config))
    }

    /// Schedule built so far in the current episode.
    pub fn schedule(&self) -> Option<Schedule> {
        self.episode
            .as_ref()
            .map(|ep| ep.state.to_schedule(&ep.instance))
    }

    pub fn case_name(&self) -> Option<&str> {
        self.instance().and_then(Instance::name)
    }

    pub fn no_op_count(&self) -> usize {
        self.episode.as_ref().map_or(0, |ep| ep.no_op_count)
    }

    /// Width of a per-job action head: one unit per job, plus the no-op.
    pub fn action_dim(&self) -> usize {
        self.instance().map_or(0, |inst| {
            inst.job_count() + usize::from(self.config.allow_no_op)
        })
    }

    /// Length of [`Observation::features`] for the current instance.
    pub fn state_dim(&self) -> usize {
        self.instance().map_or(0, |inst| {
            Observation::feature_len(inst.job_count(), inst.machine_count())
        })
    }
}

impl Default for JobShopEnv {
    fn default() -> Self {
        Self::new(EnvConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OpStatus;
    use crate::error::Error;
    use crate::models::OpId;

    fn two_by_two() -> InstanceData {
        InstanceData::new(2)
            .with_job(vec![(0, 3), (1, 2)])
            .with_job(vec![(1, 2), (0, 4)])
    }

    /// Rewrites one operation's status behind the engine's back.
    fn force_status(env: &mut JobShopEnv, op: OpId, status: OpStatus) {
        let episode = env.episode.as_mut().unwrap();
        let mut value = serde_json::to_value(&episode.state).unwrap();
        value["ops"][op.job][op.index]["status"] = serde_json::to_value(status).unwrap();
        episode.state = serde_json::from_value(value).unwrap();
    }

    #[test]
    fn test_deadlock_fails_episode_until_restart() {
        let mut env = JobShopEnv::default();
        env.reset(&two_by_two()).unwrap();
        force_status(&mut env, OpId::new(1, 0), OpStatus::Unscheduled);

        // J0.O0 [0,3), then J0.O1 is all that is left to run
        let result = env.step(0).unwrap();
        assert_eq!(result.observation.clock, 3);
        assert_eq!(result.observation.num_actions(), 1);

        // J0.O1 [3,5); job 1 can never start
        let err = env.step(0).unwrap_err();
        assert!(matches!(
            err,
            Error::Deadlock {
                clock: 5,
                unscheduled: 2
            }
        ));
        assert!(!err.is_recoverable());
        assert_eq!(env.status(), EnvStatus::Failed);

        assert!(matches!(
            env.step(0),
            Err(Error::Env(EnvError::NotRunning(EnvStatus::Failed)))
        ));
        assert_eq!(env.status(), EnvStatus::Failed);

        let obs = env.restart().unwrap();
        assert_eq!(env.status(), EnvStatus::Running);
        assert_eq!(obs.clock, 0);
        assert_eq!(obs.num_actions(), 2);

        let mut last = env.step(0).unwrap();
        while !last.done {
            last = env.step(0).unwrap();
        }
        assert_eq!(last.info.final_makespan, Some(7));
    }

    #[test]
    fn test_invalid_assignment_fails_episode() {
        let mut env = JobShopEnv::default();
        env.reset(&two_by_two()).unwrap();
        force_status(&mut env, OpId::new(0, 0), OpStatus::Completed);

        let err = env.step(0).unwrap_err();
        assert!(matches!(err, Error::InvalidAssignment { op, .. } if op == OpId::new(0, 0)));
        assert!(!err.is_recoverable());
        assert_eq!(env.status(), EnvStatus::Failed);

        // a fresh instance recovers as well
        assert!(env.reset(&two_by_two()).is_ok());
        assert_eq!(env.status(), EnvStatus::Running);
    }

    #[test]
    fn test_invalid_action_is_not_fatal() {
        let mut env = JobShopEnv::default();
        env.reset(&two_by_two()).unwrap();
        let err = env.step(9).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(env.status(), EnvStatus::Running);
    }
}
