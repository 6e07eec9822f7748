//! Episode state: the mutable side of the disjunctive graph.
//!
//! Tracks per-operation status and times, per-machine timelines and
//! per-job progress. Job arcs (precedence) are fixed by the instance;
//! machine arcs are added one by one as operations are assigned, so the
//! machine sequences here are the oriented disjunctive arcs.
//!
//! # Status lifecycle
//!
//! ```text
//! Unscheduled ──(predecessor completed)──▶ Eligible ──assign──▶ Scheduled ──(clock ≥ finish)──▶ Completed
//! ```
//!
//! Transitions never go backwards. The first operation of each job starts
//! out `Eligible`.
//!
//! # Reference
//! Roy & Sussmann (1964), "Les problèmes d'ordonnancement avec contraintes disjonctives"

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::error::{Error, Result};
use crate::models::{Assignment, Instance, OpId, Schedule, Time};

/// Scheduling status of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OpStatus {
    Unscheduled,
    Eligible,
    Scheduled,
    Completed,
}

/// Mutable state of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationState {
    pub status: OpStatus,
    /// Defined once `Scheduled`.
    pub start: Option<Time>,
    /// Defined once `Scheduled`.
    pub finish: Option<Time>,
}

/// Mutable state of one machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    /// Finish time of the last operation assigned to this machine.
    pub available_at: Time,
    /// Operations assigned to this machine, in processing order.
    pub sequence: Vec<OpId>,
}

/// Mutable progress of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobState {
    /// Index of the next operation not yet scheduled (== op count when done).
    pub next_op: usize,
    /// Finish time of the last scheduled operation (0 before the first).
    pub ready_at: Time,
    /// Processing time of operations not yet scheduled.
    pub remaining_work: Time,
    /// Number of completed operations.
    pub completed: usize,
}

/// A pending completion. Ordered so that `BinaryHeap` pops the earliest
/// finish first, ties by operation id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionEvent {
    finish: Time,
    op: OpId,
}

impl Ord for CompletionEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.finish
            .cmp(&other.finish)
            .then_with(|| self.op.cmp(&other.op))
            .reverse()
    }
}

impl PartialOrd for CompletionEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The authoritative scheduling state of one episode.
///
/// Owned exclusively by one environment; all mutation goes through
/// [`assign`](Self::assign) and [`advance_completions`](Self::advance_completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeState {
    ops: Vec<Vec<OperationState>>,
    machines: Vec<MachineState>,
    jobs: Vec<JobState>,
    completions: BinaryHeap<CompletionEvent>,
    /// Assignment order across all machines.
    history: Vec<OpId>,
    makespan: Time,
    completed: usize,
    total: usize,
}

impl EpisodeState {
    /// Fresh state: nothing scheduled, first operation of every job eligible.
    pub fn new(instance: &Instance) -> Self {
        let ops = instance
            .jobs()
            .iter()
            .map(|job| {
                (0..job.operation_count())
                    .map(|i| OperationState {
                        status: if i == 0 {
                            OpStatus::Eligible
                        } else {
                            OpStatus::Unscheduled
                        },
                        start: None,
                        finish: None,
                    })
                    .collect()
            })
            .collect();

        let jobs = instance
            .jobs()
            .iter()
            .map(|job| JobState {
                next_op: 0,
                ready_at: 0,
                remaining_work: job.total_duration(),
                completed: 0,
            })
            .collect();

        Self {
            ops,
            machines: vec![MachineState::default(); instance.machine_count()],
            jobs,
            completions: BinaryHeap::new(),
            history: Vec::new(),
            makespan: 0,
            completed: 0,
            total: instance.operation_count(),
        }
    }

    /// Operations whose job predecessor is completed and that are not yet
    /// scheduled, ordered by job index.
    ///
    /// Eligibility is precedence-only; machine availability is enforced by
    /// [`assign`](Self::assign). At most one operation per job is eligible.
    pub fn eligible_operations(&self) -> Vec<OpId> {
        self.jobs
            .iter()
            .enumerate()
            .filter_map(|(j, job)| {
                let op = OpId::new(j, job.next_op);
                (self.ops[j].get(job.next_op)?.status == OpStatus::Eligible).then_some(op)
            })
            .collect()
    }

    /// Schedules an eligible operation at `start`.
    ///
    /// Fails with [`Error::InvalidAssignment`] if the operation is not
    /// eligible, or `start` precedes the machine's availability or the job
    /// predecessor's finish. On failure nothing is mutated.
    ///
    /// Returns the finish time.
    pub fn assign(&mut self, instance: &Instance, op: OpId, start: Time) -> Result<Time> {
        let status = self.status(op);
        if status != OpStatus::Eligible {
            return Err(invalid(op, format!("status is {status:?}, expected Eligible")));
        }

        let machine = instance.machine_of(op);
        let available = self.machines[machine].available_at;
        if start < available {
            return Err(invalid(
                op,
                format!("start {start} before M{machine} is available at {available}"),
            ));
        }
        if let Some(pred_finish) = instance.predecessor_of(op).and_then(|p| self.finish_of(p)) {
            if start < pred_finish {
                return Err(invalid(
                    op,
                    format!("start {start} before job predecessor finishes at {pred_finish}"),
                ));
            }
        }

        let duration = instance.duration_of(op);
        // bounded by the instance's total work, which validation keeps within Time
        let finish = start + duration;

        let state = &mut self.ops[op.job][op.index];
        state.status = OpStatus::Scheduled;
        state.start = Some(start);
        state.finish = Some(finish);

        let m = &mut self.machines[machine];
        m.available_at = finish;
        m.sequence.push(op);

        let job = &mut self.jobs[op.job];
        job.next_op += 1;
        job.ready_at = finish;
        job.remaining_work -= duration;

        self.makespan = self.makespan.max(finish);
        self.history.push(op);
        self.completions.push(CompletionEvent { finish, op });

        Ok(finish)
    }

    /// Completes every scheduled operation with `finish <= up_to`, in
    /// finish order, and makes each job successor eligible.
    ///
    /// Returns the operations completed by this call.
    pub fn advance_completions(&mut self, instance: &Instance, up_to: Time) -> Vec<OpId> {
        let mut done = Vec::new();
        while let Some(&event) = self.completions.peek() {
            if event.finish > up_to {
                break;
            }
            self.completions.pop();

            let op = event.op;
            self.ops[op.job][op.index].status = OpStatus::Completed;
            self.jobs[op.job].completed += 1;
            self.completed += 1;
            trace!(%op, finish = event.finish, "operation completed");

            if let Some(next) = instance.successor_of(op) {
                let succ = &mut self.ops[next.job][next.index];
                if succ.status == OpStatus::Unscheduled {
                    succ.status = OpStatus::Eligible;
                }
            }
            done.push(op);
        }
        done
    }

    pub fn status(&self, op: OpId) -> OpStatus {
        self.ops[op.job][op.index].status
    }

    pub fn operation_state(&self, op: OpId) -> &OperationState {
        &self.ops[op.job][op.index]
    }

    pub fn start_of(&self, op: OpId) -> Option<Time> {
        self.ops[op.job][op.index].start
    }

    pub fn finish_of(&self, op: OpId) -> Option<Time> {
        self.ops[op.job][op.index].finish
    }

    pub fn machines(&self) -> &[MachineState] {
        &self.machines
    }

    pub fn machine_available_at(&self, machine: usize) -> Time {
        self.machines[machine].available_at
    }

    /// Operations assigned to a machine, in processing order.
    pub fn machine_sequence(&self, machine: usize) -> &[OpId] {
        &self.machines[machine].sequence
    }

    pub fn jobs(&self) -> &[JobState] {
        &self.jobs
    }

    pub fn job_progress(&self, job: usize) -> &JobState {
        &self.jobs[job]
    }

    /// Processing time of a job's operations not yet scheduled.
    pub fn remaining_work(&self, job: usize) -> Time {
        self.jobs[job].remaining_work
    }

    /// Finish time of the predecessor of `op` (0 for a job's first operation).
    pub fn predecessor_finish(&self, instance: &Instance, op: OpId) -> Time {
        instance
            .predecessor_of(op)
            .and_then(|p| self.finish_of(p))
            .unwrap_or(0)
    }

    /// Running maximum finish time over all scheduled operations.
    pub fn makespan(&self) -> Time {
        self.makespan
    }

    /// Earliest pending completion, if any operation is in progress.
    pub fn next_completion_time(&self) -> Option<Time> {
        self.completions.peek().map(|e| e.finish)
    }

    pub fn pending_completions(&self) -> usize {
        self.completions.len()
    }

    pub fn operation_count(&self) -> usize {
        self.total
    }

    pub fn scheduled_count(&self) -> usize {
        self.history.len()
    }

    pub fn unscheduled_count(&self) -> usize {
        self.total - self.history.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed
    }

    /// Whether every operation is completed.
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    /// Operations in the order they were assigned.
    pub fn history(&self) -> &[OpId] {
        &self.history
    }

    /// The schedule built so far, in assignment order.
    pub fn to_schedule(&self, instance: &Instance) -> Schedule {
        let mut schedule = Schedule::new();
        for &op in &self.history {
            let s = self.operation_state(op);
            if let (Some(start), Some(end)) = (s.start, s.finish) {
                schedule.add_assignment(Assignment::new(op, instance.machine_of(op), start, end));
            }
        }
        schedule
    }
}

impl PartialEq for EpisodeState {
    fn eq(&self, other: &Self) -> bool {
        self.ops == other.ops
            && self.machines == other.machines
            && self.jobs == other.jobs
            && self.history == other.history
            && self.makespan == other.makespan
            && self.completed == other.completed
            && self.total == other.total
            && self.completions.clone().into_sorted_vec()
                == other.completions.clone().into_sorted_vec()
    }
}

impl Eq for EpisodeState {}

fn invalid(op: OpId, reason: String) -> Error {
    Error::InvalidAssignment { op, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstanceData;

    fn tiny() -> Instance {
        Instance::new(
            InstanceData::new(2)
                .with_job(vec![(0, 3), (1, 2)])
                .with_job(vec![(1, 2), (0, 4)]),
        )
        .unwrap()
    }

    #[test]
    fn test_initial_eligibility() {
        let inst = tiny();
        let state = EpisodeState::new(&inst);
        assert_eq!(
            state.eligible_operations(),
            vec![OpId::new(0, 0), OpId::new(1, 0)]
        );
        assert_eq!(state.status(OpId::new(0, 1)), OpStatus::Unscheduled);
        assert_eq!(state.unscheduled_count(), 4);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_eligible_is_idempotent() {
        let inst = tiny();
        let mut state = EpisodeState::new(&inst);
        state.assign(&inst, OpId::new(0, 0), 0).unwrap();
        assert_eq!(state.eligible_operations(), state.eligible_operations());
    }

    #[test]
    fn test_assign_updates_machine_and_job() {
        let inst = tiny();
        let mut state = EpisodeState::new(&inst);
        let finish = state.assign(&inst, OpId::new(0, 0), 0).unwrap();

        assert_eq!(finish, 3);
        assert_eq!(state.status(OpId::new(0, 0)), OpStatus::Scheduled);
        assert_eq!(state.machine_available_at(0), 3);
        assert_eq!(state.machine_sequence(0), &[OpId::new(0, 0)]);
        assert_eq!(state.job_progress(0).next_op, 1);
        assert_eq!(state.remaining_work(0), 2);
        assert_eq!(state.makespan(), 3);
        assert_eq!(state.next_completion_time(), Some(3));
        // Successor waits for completion, not for scheduling
        assert_eq!(state.eligible_operations(), vec![OpId::new(1, 0)]);
    }

    #[test]
    fn test_assign_rejects_machine_overlap() {
        let inst = tiny();
        let mut state = EpisodeState::new(&inst);
        state.assign(&inst, OpId::new(1, 0), 0).unwrap(); // M1 busy until 2
        state.advance_completions(&inst, 3);
        state.assign(&inst, OpId::new(0, 0), 0).unwrap();
        state.advance_completions(&inst, 3);

        // J0.O1 needs M1; predecessor done at 3, so 1 is too early on both counts
        let before = state.clone();
        let err = state.assign(&inst, OpId::new(0, 1), 1).unwrap_err();
        assert!(matches!(err, Error::InvalidAssignment { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_assign_rejects_precedence_breach() {
        let inst = tiny();
        let mut state = EpisodeState::new(&inst);
        state.assign(&inst, OpId::new(0, 0), 0).unwrap();
        state.advance_completions(&inst, 3);
        // M1 is free from 0, but J0.O0 finishes at 3
        let err = state.assign(&inst, OpId::new(0, 1), 2).unwrap_err();
        assert!(err.to_string().contains("predecessor"));
    }

    #[test]
    fn test_assign_rejects_non_eligible() {
        let inst = tiny();
        let mut state = EpisodeState::new(&inst);
        assert!(state.assign(&inst, OpId::new(0, 1), 10).is_err());
        state.assign(&inst, OpId::new(0, 0), 0).unwrap();
        assert!(state.assign(&inst, OpId::new(0, 0), 5).is_err());
    }

    #[test]
    fn test_advance_completions_cascades() {
        let inst = tiny();
        let mut state = EpisodeState::new(&inst);
        state.assign(&inst, OpId::new(0, 0), 0).unwrap();
        state.assign(&inst, OpId::new(1, 0), 0).unwrap();

        assert!(state.advance_completions(&inst, 1).is_empty());
        assert_eq!(state.advance_completions(&inst, 2), vec![OpId::new(1, 0)]);
        assert_eq!(state.eligible_operations(), vec![OpId::new(1, 1)]);
        assert_eq!(state.advance_completions(&inst, 10), vec![OpId::new(0, 0)]);
        assert_eq!(
            state.eligible_operations(),
            vec![OpId::new(0, 1), OpId::new(1, 1)]
        );
        assert_eq!(state.completed_count(), 2);
    }

    #[test]
    fn test_completion_ties_break_by_op_id() {
        let inst = Instance::new(
            InstanceData::new(2)
                .with_job(vec![(0, 5)])
                .with_job(vec![(1, 5)]),
        )
        .unwrap();
        let mut state = EpisodeState::new(&inst);
        state.assign(&inst, OpId::new(1, 0), 0).unwrap();
        state.assign(&inst, OpId::new(0, 0), 0).unwrap();
        assert_eq!(
            state.advance_completions(&inst, 5),
            vec![OpId::new(0, 0), OpId::new(1, 0)]
        );
        assert!(state.is_complete());
    }

    #[test]
    fn test_to_schedule_in_assignment_order() {
        let inst = tiny();
        let mut state = EpisodeState::new(&inst);
        state.assign(&inst, OpId::new(1, 0), 0).unwrap();
        state.assign(&inst, OpId::new(0, 0), 0).unwrap();
        let schedule = state.to_schedule(&inst);
        assert_eq!(schedule.assignments[0].op, OpId::new(1, 0));
        assert_eq!(schedule.assignments[1].machine, 0);
        assert_eq!(schedule.makespan(), 3);
    }

    #[test]
    fn test_state_serde_round_trip() {
        let inst = tiny();
        let mut state = EpisodeState::new(&inst);
        state.assign(&inst, OpId::new(0, 0), 0).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: EpisodeState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
