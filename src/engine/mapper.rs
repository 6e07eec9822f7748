//! Decision mapper: turns an action index into a state mutation.
//!
//! Action `i < len` schedules the `i`-th operation of the current decision
//! set. When waiting is enabled and some operation is in progress, action
//! `len` is the no-op. Everything else is rejected before any mutation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::advancer::DecisionPoint;
use super::state::EpisodeState;
use crate::error::{Error, Result};
use crate::models::{Assignment, Instance, Time};

/// What an applied action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// An operation was scheduled.
    Schedule(Assignment),
    /// The policy chose to let time pass.
    Wait,
}

/// Effect of one applied action, consumed by reward functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: ActionKind,
    /// Clock at the decision point the action was taken at.
    pub clock: Time,
    /// Gap left on the machine: `start - previous availability` (0 for waits).
    pub machine_idle: Time,
    pub makespan_before: Time,
    pub makespan_after: Time,
}

impl Transition {
    /// Increase of the running makespan caused by this action.
    pub fn makespan_increase(&self) -> Time {
        self.makespan_after - self.makespan_before
    }

    pub fn is_wait(&self) -> bool {
        matches!(self.kind, ActionKind::Wait)
    }
}

/// Number of legal actions at a decision point.
pub fn legal_action_count(decision: &DecisionPoint, state: &EpisodeState, allow_wait: bool) -> usize {
    decision.len() + usize::from(can_wait(decision, state, allow_wait))
}

/// Whether the no-op action is currently legal.
pub fn can_wait(decision: &DecisionPoint, state: &EpisodeState, allow_wait: bool) -> bool {
    allow_wait && !decision.is_terminal() && state.next_completion_time().is_some()
}

/// Applies `index` to the decision set.
///
/// The start time is `max(machine availability, predecessor finish, clock)`,
/// which equals the clock for operations in the decision set. The clock
/// itself is not moved here.
///
/// Fails with [`Error::InvalidAction`] (state untouched) when `index` is
/// not a legal action.
pub fn apply(
    instance: &Instance,
    state: &mut EpisodeState,
    decision: &DecisionPoint,
    index: usize,
    allow_wait: bool,
) -> Result<Transition> {
    let makespan_before = state.makespan();

    let Some(&op) = decision.eligible.get(index) else {
        if index == decision.len() && can_wait(decision, state, allow_wait) {
            debug!(clock = decision.clock, "wait");
            return Ok(Transition {
                kind: ActionKind::Wait,
                clock: decision.clock,
                machine_idle: 0,
                makespan_before,
                makespan_after: makespan_before,
            });
        }
        return Err(Error::InvalidAction {
            index,
            len: legal_action_count(decision, state, allow_wait),
        });
    };

    let machine = instance.machine_of(op);
    let available = state.machine_available_at(machine);
    let start = available
        .max(state.predecessor_finish(instance, op))
        .max(decision.clock);

    let end = state.assign(instance, op, start)?;
    debug!(%op, machine, start, end, "assigned");

    Ok(Transition {
        kind: ActionKind::Schedule(Assignment::new(op, machine, start, end)),
        clock: decision.clock,
        machine_idle: start - available,
        makespan_before,
        makespan_after: state.makespan(),
    })
}
