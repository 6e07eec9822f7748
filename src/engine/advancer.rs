//! Time advancer: jumps the clock to the next decision point.
//!
//! The clock never ticks. Each call moves it straight to the earliest time
//! at which some machine is free while an eligible operation waits for it,
//! processing any completions that happen on the way (a completion can
//! unlock a job successor and therefore an earlier decision).
//!
//! # Algorithm
//!
//! 1. Complete every operation finishing at or before the clock.
//! 2. For each machine with an eligible operation, its effective
//!    availability is `max(available_at, clock)`.
//! 3. Candidate time = minimum effective availability (lowest machine id
//!    on ties).
//! 4. If a completion is due at or before the candidate, jump to it and
//!    repeat from 1. Otherwise the clock becomes the candidate.
//! 5. The decision set is every eligible operation whose machine's
//!    effective availability equals the clock.
//!
//! # Reference
//! Giffler & Thompson (1960), "Algorithms for Solving Production-Scheduling Problems"

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::state::EpisodeState;
use crate::error::{Error, Result};
use crate::models::{Instance, OpId, Time};

/// A point in simulated time where the policy must choose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPoint {
    /// Simulation clock at the decision.
    pub clock: Time,
    /// Operations that can start now, ordered by job index.
    /// Empty only when the episode is over.
    pub eligible: Vec<OpId>,
    /// Lowest-id machine whose availability set the clock.
    pub machine: Option<usize>,
}

impl DecisionPoint {
    pub fn is_terminal(&self) -> bool {
        self.eligible.is_empty()
    }

    pub fn len(&self) -> usize {
        self.eligible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }
}

/// Owner of the simulation clock.
///
/// The clock is monotonically non-decreasing for the lifetime of the
/// advancer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAdvancer {
    clock: Time,
}

impl TimeAdvancer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> Time {
        self.clock
    }

    /// Advances to the next decision point.
    ///
    /// When every operation is scheduled the clock runs through the
    /// remaining completions up to the makespan and a terminal (empty)
    /// decision point is returned.
    ///
    /// Fails with [`Error::Deadlock`] if work remains but nothing is
    /// eligible or in progress, which cannot happen for a valid instance.
    pub fn advance(&mut self, instance: &Instance, state: &mut EpisodeState) -> Result<DecisionPoint> {
        loop {
            state.advance_completions(instance, self.clock);
            let eligible = state.eligible_operations();

            if eligible.is_empty() {
                match state.next_completion_time() {
                    Some(t) => {
                        self.move_to(t);
                        continue;
                    }
                    None if state.unscheduled_count() == 0 => {
                        return Ok(DecisionPoint {
                            clock: self.clock,
                            eligible,
                            machine: None,
                        });
                    }
                    None => {
                        let unscheduled = state.unscheduled_count();
                        error!(clock = self.clock, unscheduled, "no eligible operation while work remains");
                        return Err(Error::Deadlock {
                            clock: self.clock,
                            unscheduled,
                        });
                    }
                }
            }

            let (machine, candidate) = self.earliest_machine(instance, state, &eligible);

            if let Some(t) = state.next_completion_time() {
                if t <= candidate {
                    self.move_to(t);
                    continue;
                }
            }

            self.move_to(candidate);
            let clock = self.clock;
            let ready: Vec<OpId> = eligible
                .into_iter()
                .filter(|&op| self.effective(state, instance.machine_of(op)) == clock)
                .collect();

            debug!(clock, machine, eligible = ready.len(), "decision point");
            return Ok(DecisionPoint {
                clock,
                eligible: ready,
                machine: Some(machine),
            });
        }
    }

    /// Lets time pass without scheduling: jumps to the next completion and
    /// then to the following decision point.
    ///
    /// Returns `None` (and does nothing) if no operation is in progress.
    pub fn wait(
        &mut self,
        instance: &Instance,
        state: &mut EpisodeState,
    ) -> Result<Option<DecisionPoint>> {
        let Some(t) = state.next_completion_time() else {
            return Ok(None);
        };
        self.move_to(t);
        self.advance(instance, state).map(Some)
    }

    /// Machine with the smallest effective availability among those an
    /// eligible operation needs. Ties go to the lowest machine id.
    fn earliest_machine(
        &self,
        instance: &Instance,
        state: &EpisodeState,
        eligible: &[OpId],
    ) -> (usize, Time) {
        let mut needed: Vec<usize> = eligible.iter().map(|&op| instance.machine_of(op)).collect();
        needed.sort_unstable();
        needed.dedup();

        needed
            .into_iter()
            .map(|m| (m, self.effective(state, m)))
            .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
            .unwrap_or((0, self.clock))
    }

    fn effective(&self, state: &EpisodeState, machine: usize) -> Time {
        state.machine_available_at(machine).max(self.clock)
    }

    fn move_to(&mut self, t: Time) {
        debug_assert!(t >= self.clock, "clock moved backwards: {} -> {t}", self.clock);
        self.clock = self.clock.max(t);
    }
}
