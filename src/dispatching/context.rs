//! Scheduling context for dispatching rule evaluation.

use crate::env::Observation;
use crate::models::Time;

/// Shop-floor state passed to dispatching rules.
///
/// Per-operation data travels in [`EligibleOp`](crate::env::EligibleOp);
/// the context carries what rules need about machines.
#[derive(Debug, Clone, Default)]
pub struct SchedulingContext {
    /// Current simulation time.
    pub clock: Time,
    /// Time each machine becomes free (indexed by machine id).
    pub machine_available_at: Vec<Time>,
    /// Unscheduled work per machine (indexed by machine id).
    pub machine_remaining_work: Vec<Time>,
}

impl SchedulingContext {
    /// Creates a context at the given time with no machine data.
    pub fn at_time(clock: Time) -> Self {
        Self {
            clock,
            ..Default::default()
        }
    }

    /// Builds the context for an observation's decision point.
    pub fn from_observation(obs: &Observation) -> Self {
        Self {
            clock: obs.clock,
            machine_available_at: obs.machine_available_at.clone(),
            machine_remaining_work: obs.machine_remaining_work.clone(),
        }
    }

    /// Sets unscheduled work for a machine, growing the table as needed.
    pub fn with_machine_work(mut self, machine: usize, work: Time) -> Self {
        if self.machine_remaining_work.len() <= machine {
            self.machine_remaining_work.resize(machine + 1, 0);
        }
        self.machine_remaining_work[machine] = work;
        self
    }

    /// Unscheduled work on `machine` (0 if unknown).
    pub fn machine_work(&self, machine: usize) -> Time {
        self.machine_remaining_work.get(machine).copied().unwrap_or(0)
    }
}
