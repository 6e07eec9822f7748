//! Observation emitted at every decision point.
//!
//! The structured form carries everything needed to rebuild machine loads
//! and job progress. [`Observation::features`] flattens it into a
//! fixed-length vector for function approximators:
//!
//! | Slice | Length | Content |
//! |-------|--------|---------|
//! | `[0]` | 1 | clock / total work |
//! | `[1]` | 1 | eligible count / jobs |
//! | machines | M | time until machine is free / total work |
//! | machines | M | unscheduled work on machine / total work |
//! | jobs | J | scheduled fraction of operations |
//! | jobs | J | unscheduled work / total work |
//! | jobs | J | 1.0 if the job has an operation in the decision set |

use serde::{Deserialize, Serialize};

use crate::engine::{DecisionPoint, EpisodeState};
use crate::models::{Instance, OpId, Time};

/// An operation the policy may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleOp {
    pub op: OpId,
    pub machine: usize,
    pub duration: Time,
    /// Operations of the job after this one.
    pub remaining_ops_after: usize,
    /// Machine of the job's next operation, if any.
    pub next_machine: Option<usize>,
    /// Unscheduled work of the job, this operation included.
    pub job_remaining_work: Time,
    /// Time the job became ready (predecessor finish, 0 for first ops).
    pub job_ready_at: Time,
}

/// Snapshot of the episode at a decision point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub clock: Time,
    /// Decision set in action order.
    pub eligible: Vec<EligibleOp>,
    /// Whether the no-op action (index `eligible.len()`) is legal.
    pub can_wait: bool,
    pub machine_available_at: Vec<Time>,
    /// Unscheduled work per machine.
    pub machine_remaining_work: Vec<Time>,
    /// Index of each job's next unscheduled operation.
    pub job_next_op: Vec<usize>,
    pub job_op_count: Vec<usize>,
    pub job_remaining_work: Vec<Time>,
    pub job_ready_at: Vec<Time>,
    pub total_work: Time,
    /// Running makespan of the partial schedule.
    pub makespan: Time,
}

impl Observation {
    pub(crate) fn new(
        instance: &Instance,
        state: &EpisodeState,
        decision: &DecisionPoint,
        can_wait: bool,
    ) -> Self {
        let jobs = state.jobs();

        let eligible = decision
            .eligible
            .iter()
            .map(|&op| {
                let job = &jobs[op.job];
                EligibleOp {
                    op,
                    machine: instance.machine_of(op),
                    duration: instance.duration_of(op),
                    remaining_ops_after: instance.operations(op.job).len() - op.index - 1,
                    next_machine: instance.operations(op.job).get(op.index + 1).map(|o| o.machine),
                    job_remaining_work: job.remaining_work,
                    job_ready_at: job.ready_at,
                }
            })
            .collect();

        let mut machine_remaining_work = vec![0; instance.machine_count()];
        for (j, job) in jobs.iter().enumerate() {
            for o in &instance.operations(j)[job.next_op..] {
                machine_remaining_work[o.machine] += o.duration;
            }
        }

        Self {
            clock: decision.clock,
            eligible,
            can_wait,
            machine_available_at: state.machines().iter().map(|m| m.available_at).collect(),
            machine_remaining_work,
            job_next_op: jobs.iter().map(|j| j.next_op).collect(),
            job_op_count: instance.jobs().iter().map(|j| j.operation_count()).collect(),
            job_remaining_work: jobs.iter().map(|j| j.remaining_work).collect(),
            job_ready_at: jobs.iter().map(|j| j.ready_at).collect(),
            total_work: instance.total_work(),
            makespan: state.makespan(),
        }
    }

    pub fn num_eligible(&self) -> usize {
        self.eligible.len()
    }

    /// Number of legal action indices (`0..num_actions()`).
    pub fn num_actions(&self) -> usize {
        self.eligible.len() + usize::from(self.can_wait)
    }

    pub fn machine_count(&self) -> usize {
        self.machine_available_at.len()
    }

    pub fn job_count(&self) -> usize {
        self.job_next_op.len()
    }

    /// Whether this is the terminal observation.
    pub fn is_terminal(&self) -> bool {
        self.eligible.is_empty()
    }

    /// Length of [`features`](Self::features) for an instance shape.
    pub fn feature_len(jobs: usize, machines: usize) -> usize {
        2 + 2 * machines + 3 * jobs
    }

    /// Fixed-length, normalized feature vector.
    pub fn features(&self) -> Vec<f32> {
        let scale = self.total_work.max(1) as f32;
        let jobs = self.job_count();
        let mut out = Vec::with_capacity(Self::feature_len(jobs, self.machine_count()));

        out.push(self.clock as f32 / scale);
        out.push(self.num_eligible() as f32 / jobs.max(1) as f32);

        out.extend(
            self.machine_available_at
                .iter()
                .map(|&t| (t - self.clock).max(0) as f32 / scale),
        );
        out.extend(self.machine_remaining_work.iter().map(|&w| w as f32 / scale));

        out.extend(
            self.job_next_op
                .iter()
                .zip(&self.job_op_count)
                .map(|(&next, &count)| next as f32 / count.max(1) as f32),
        );
        out.extend(self.job_remaining_work.iter().map(|&w| w as f32 / scale));

        let mut in_decision = vec![0.0; jobs];
        for e in &self.eligible {
            if let Some(slot) = in_decision.get_mut(e.op.job) {
                *slot = 1.0;
            }
        }
        out.extend(in_decision);

        out
    }

    /// Per-job legality mask (plus a trailing no-op slot when `with_no_op`).
    ///
    /// For agents whose output head has one unit per job.
    pub fn action_mask(&self, with_no_op: bool) -> Vec<bool> {
        let mut mask = vec![false; self.job_count()];
        for e in &self.eligible {
            if let Some(slot) = mask.get_mut(e.op.job) {
                *slot = true;
            }
        }
        if with_no_op {
            mask.push(self.can_wait);
        }
        mask
    }

    /// Action index that schedules `job`'s eligible operation.
    pub fn action_for_job(&self, job: usize) -> Option<usize> {
        self.eligible.iter().position(|e| e.op.job == job)
    }

    /// Operation selected by an action index (`None` for the no-op or out of range).
    pub fn op_for_action(&self, action: usize) -> Option<OpId> {
        self.eligible.get(action).map(|e| e.op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TimeAdvancer;
    use crate::models::InstanceData;

    fn first_observation() -> Observation {
        let inst = Instance::new(
            InstanceData::new(2)
                .with_job(vec![(0, 3), (1, 2)])
                .with_job(vec![(1, 2), (0, 4)]),
        )
        .unwrap();
        let mut state = EpisodeState::new(&inst);
        let dp = TimeAdvancer::new().advance(&inst, &mut state).unwrap();
        Observation::new(&inst, &state, &dp, false)
    }

    #[test]
    fn test_structured_fields() {
        let obs = first_observation();
        assert_eq!(obs.clock, 0);
        assert_eq!(obs.num_eligible(), 2);
        assert_eq!(obs.num_actions(), 2);
        assert_eq!(obs.machine_remaining_work, vec![7, 4]);
        assert_eq!(obs.job_remaining_work, vec![5, 6]);
        assert_eq!(obs.eligible[1].machine, 1);
        assert_eq!(obs.eligible[1].remaining_ops_after, 1);
        assert_eq!(obs.eligible[1].next_machine, Some(0));
    }

    #[test]
    fn test_feature_length_is_fixed() {
        let obs = first_observation();
        let f = obs.features();
        assert_eq!(f.len(), Observation::feature_len(2, 2));
        // clock 0, both jobs eligible
        assert_eq!(f[0], 0.0);
        assert_eq!(f[1], 1.0);
        assert!(f.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_action_mask_and_lookup() {
        let obs = first_observation();
        assert_eq!(obs.action_mask(true), vec![true, true, false]);
        assert_eq!(obs.action_for_job(1), Some(1));
        assert_eq!(obs.op_for_action(0), Some(OpId::new(0, 0)));
        assert_eq!(obs.op_for_action(2), None);
    }

    #[test]
    fn test_inconsistent_observation_does_not_panic() {
        let mut obs = first_observation();
        obs.eligible[1].op = OpId::new(7, 0);
        obs.eligible.push(obs.eligible[0]);
        obs.eligible[2].op = OpId::new(9, 0);

        assert_eq!(obs.action_mask(false), vec![true, false]);
        let f = obs.features();
        assert_eq!(f.len(), Observation::feature_len(2, 2));
        // per-job decision flags are the last two values
        assert_eq!(&f[f.len() - 2..], &[1.0, 0.0]);

        let empty = Observation {
            eligible: obs.eligible.clone(),
            ..Default::default()
        };
        assert_eq!(empty.action_mask(true), vec![false]);
    }
}
