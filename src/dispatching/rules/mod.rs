//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Time-based**: SPT, LPT
//! - **Work remaining**: LWKR, MWKR, MOPNR
//! - **Queue/Load**: FIFO, WINQ
//!
//! # Score Convention
//! All rules return lower scores for higher priority operations.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"
//! - Panwalkar & Iskander (1977), "A Survey of Scheduling Rules"

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::env::EligibleOp;

// ======================== Time-based rules ========================

/// Shortest Processing Time.
///
/// Prioritizes operations with shorter processing time.
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, op: &EligibleOp, _context: &SchedulingContext) -> RuleScore {
        op.duration as f64
    }

    fn description(&self) -> &'static str {
        "Shortest Processing Time"
    }
}

/// Longest Processing Time.
#[derive(Debug, Clone, Copy)]
pub struct Lpt;

impl DispatchingRule for Lpt {
    fn name(&self) -> &'static str {
        "LPT"
    }

    fn evaluate(&self, op: &EligibleOp, _context: &SchedulingContext) -> RuleScore {
        -(op.duration as f64)
    }

    fn description(&self) -> &'static str {
        "Longest Processing Time"
    }
}

// ======================== Work-remaining rules ========================

/// Least Work Remaining.
///
/// Prioritizes jobs closer to completion.
#[derive(Debug, Clone, Copy)]
pub struct Lwkr;

impl DispatchingRule for Lwkr {
    fn name(&self) -> &'static str {
        "LWKR"
    }

    fn evaluate(&self, op: &EligibleOp, _context: &SchedulingContext) -> RuleScore {
        op.job_remaining_work as f64
    }

    fn description(&self) -> &'static str {
        "Least Work Remaining"
    }
}

/// Most Work Remaining.
///
/// Prioritizes jobs with the most unscheduled work. A strong makespan
/// baseline for job shops since it keeps the critical job moving.
#[derive(Debug, Clone, Copy)]
pub struct Mwkr;

impl DispatchingRule for Mwkr {
    fn name(&self) -> &'static str {
        "MWKR"
    }

    fn evaluate(&self, op: &EligibleOp, _context: &SchedulingContext) -> RuleScore {
        -(op.job_remaining_work as f64)
    }

    fn description(&self) -> &'static str {
        "Most Work Remaining"
    }
}

/// Most Operations Remaining.
///
/// Counts the operations left in the job after this one.
#[derive(Debug, Clone, Copy)]
pub struct Mopnr;

impl DispatchingRule for Mopnr {
    fn name(&self) -> &'static str {
        "MOPNR"
    }

    fn evaluate(&self, op: &EligibleOp, _context: &SchedulingContext) -> RuleScore {
        -(op.remaining_ops_after as f64)
    }

    fn description(&self) -> &'static str {
        "Most Operations Remaining"
    }
}

// ======================== Queue/Load rules ========================

/// First In First Out.
///
/// Prioritizes operations whose job became ready earliest.
#[derive(Debug, Clone, Copy)]
pub struct Fifo;

impl DispatchingRule for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn evaluate(&self, op: &EligibleOp, _context: &SchedulingContext) -> RuleScore {
        op.job_ready_at as f64
    }

    fn description(&self) -> &'static str {
        "First In First Out"
    }
}

/// Work In Next Queue.
///
/// Prioritizes operations whose next machine carries the least unscheduled
/// work. Last operations of a job score 0.
#[derive(Debug, Clone, Copy)]
pub struct Winq;

impl DispatchingRule for Winq {
    fn name(&self) -> &'static str {
        "WINQ"
    }

    fn evaluate(&self, op: &EligibleOp, context: &SchedulingContext) -> RuleScore {
        op.next_machine
            .map_or(0, |m| context.machine_work(m)) as f64
    }

    fn description(&self) -> &'static str {
        "Work In Next Queue"
    }
}
