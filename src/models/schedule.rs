//! Schedule (solution) model.
//!
//! A schedule is the set of operation-machine-time assignments produced by
//! an episode. [`Schedule::verify`] checks it against the instance and
//! reports every violated JSSP constraint.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Instance, OpId, Time};

/// A complete or partial schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Assignments in the order they were made.
    pub assignments: Vec<Assignment>,
}

/// An operation-machine-time assignment over `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub op: OpId,
    pub machine: usize,
    pub start: Time,
    pub end: Time,
}

/// A constraint violation found by [`Schedule::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub violation_type: ViolationType,
    pub op: OpId,
    pub message: String,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Two operations overlap on the same machine.
    MachineOverlap,
    /// Operation started before its job predecessor finished.
    PrecedenceViolation,
    /// Operation never scheduled.
    MissingOperation,
    /// Operation scheduled more than once.
    DuplicateOperation,
    /// Operation placed on a machine other than the one it requires.
    WrongMachine,
    /// `end - start` differs from the operation's duration.
    DurationMismatch,
    /// The assignment names an operation the instance does not have.
    UnknownOperation,
}

impl Assignment {
    pub fn new(op: OpId, machine: usize, start: Time, end: Time) -> Self {
        Self {
            op,
            machine,
            start,
            end,
        }
    }

    #[inline]
    pub fn duration(&self) -> Time {
        self.end - self.start
    }

    /// Whether two half-open intervals intersect.
    #[inline]
    pub fn overlaps(&self, other: &Assignment) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl Violation {
    fn new(violation_type: ViolationType, op: OpId, message: impl Into<String>) -> Self {
        Self {
            violation_type,
            op,
            message: message.into(),
        }
    }
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Makespan: latest end time across all assignments.
    pub fn makespan(&self) -> Time {
        self.assignments.iter().map(|a| a.end).max().unwrap_or(0)
    }

    pub fn assignment_for(&self, op: OpId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.op == op)
    }

    /// Assignments of one job, in operation order.
    pub fn assignments_for_job(&self, job: usize) -> Vec<&Assignment> {
        let mut out: Vec<_> = self.assignments.iter().filter(|a| a.op.job == job).collect();
        out.sort_by_key(|a| a.op.index);
        out
    }

    /// Assignments on one machine, in start-time order.
    pub fn assignments_for_machine(&self, machine: usize) -> Vec<&Assignment> {
        let mut out: Vec<_> = self
            .assignments
            .iter()
            .filter(|a| a.machine == machine)
            .collect();
        out.sort_by_key(|a| (a.start, a.op));
        out
    }

    /// Completion time of a job (latest end of its assignments).
    pub fn job_completion_time(&self, job: usize) -> Option<Time> {
        self.assignments
            .iter()
            .filter(|a| a.op.job == job)
            .map(|a| a.end)
            .max()
    }

    /// Busy time / horizon for a machine. `None` if `horizon` is not positive.
    pub fn machine_utilization(&self, machine: usize, horizon: Time) -> Option<f64> {
        if horizon <= 0 {
            return None;
        }
        let busy: Time = self
            .assignments
            .iter()
            .filter(|a| a.machine == machine)
            .map(Assignment::duration)
            .sum();
        Some(busy as f64 / horizon as f64)
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Checks the schedule against every JSSP constraint of `instance`.
    ///
    /// An empty result means the schedule is complete and feasible.
    pub fn verify(&self, instance: &Instance) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut by_op: HashMap<OpId, &Assignment> = HashMap::new();

        for a in &self.assignments {
            if by_op.insert(a.op, a).is_some() {
                violations.push(Violation::new(
                    ViolationType::DuplicateOperation,
                    a.op,
                    format!("{} scheduled more than once", a.op),
                ));
            }
            let Some(operation) = instance.get_operation(a.op) else {
                violations.push(Violation::new(
                    ViolationType::UnknownOperation,
                    a.op,
                    format!("{} is not an operation of the instance", a.op),
                ));
                continue;
            };
            let required = operation.machine;
            if a.machine != required {
                violations.push(Violation::new(
                    ViolationType::WrongMachine,
                    a.op,
                    format!("{} on M{} but requires M{required}", a.op, a.machine),
                ));
            }
            let duration = operation.duration;
            if a.duration() != duration {
                violations.push(Violation::new(
                    ViolationType::DurationMismatch,
                    a.op,
                    format!("{} lasts {} but needs {duration}", a.op, a.duration()),
                ));
            }
        }

        for op in instance.op_ids() {
            let Some(a) = by_op.get(&op) else {
                violations.push(Violation::new(
                    ViolationType::MissingOperation,
                    op,
                    format!("{op} was never scheduled"),
                ));
                continue;
            };
            if let Some(pred) = instance.predecessor_of(op).and_then(|p| by_op.get(&p)) {
                if a.start < pred.end {
                    violations.push(Violation::new(
                        ViolationType::PrecedenceViolation,
                        op,
                        format!("{op} starts at {} before {} ends at {}", a.start, pred.op, pred.end),
                    ));
                }
            }
        }

        for machine in 0..instance.machine_count() {
            let seq = self.assignments_for_machine(machine);
            for pair in seq.windows(2) {
                if pair[0].overlaps(pair[1]) {
                    violations.push(Violation::new(
                        ViolationType::MachineOverlap,
                        pair[1].op,
                        format!("{} overlaps {} on M{machine}", pair[1].op, pair[0].op),
                    ));
                }
            }
        }

        violations
    }
}
