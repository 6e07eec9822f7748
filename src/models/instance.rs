//! Job-shop instance model.
//!
//! An instance is an ordered list of jobs. Each job is an ordered list of
//! operations, and each operation needs exactly one machine for a fixed,
//! strictly positive duration. Operation order within a job is the only
//! precedence constraint.
//!
//! # Time Representation
//! All times are integer units relative to episode start (t=0).
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 2.3 (Job Shops)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::validation::validate_instance;

/// Simulation time (integer units).
pub type Time = i64;

/// Identifies an operation by its job and its position within the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OpId {
    /// Job index.
    pub job: usize,
    /// Position within the job (0-indexed).
    pub index: usize,
}

impl OpId {
    pub fn new(job: usize, index: usize) -> Self {
        Self { job, index }
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{}.O{}", self.job, self.index)
    }
}

/// A single processing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Required machine.
    pub machine: usize,
    /// Processing time.
    pub duration: Time,
}

/// A job: operations in precedence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub operations: Vec<Operation>,
}

impl Job {
    /// Total processing time across all operations.
    pub fn total_duration(&self) -> Time {
        self.operations.iter().map(|o| o.duration).sum()
    }

    /// Number of operations.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }
}

/// Raw instance input, as supplied by an external loader.
///
/// This is the minimal schema: each job is a list of
/// `(machine_id, duration)` pairs. No checks are applied until the data
/// is turned into an [`Instance`].
///
/// ```json
/// { "name": "tiny", "machines": 2, "jobs": [[[0, 3], [1, 2]], [[1, 2], [0, 4]]] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceData {
    /// Case name (e.g., "ft06").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Number of machines; valid ids are `0..machines`.
    pub machines: usize,
    /// Jobs as `(machine_id, duration)` sequences.
    pub jobs: Vec<Vec<(usize, Time)>>,
}

impl InstanceData {
    /// Creates empty input for the given machine count.
    pub fn new(machines: usize) -> Self {
        Self {
            name: None,
            machines,
            jobs: Vec::new(),
        }
    }

    /// Sets the case name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a job.
    pub fn with_job(mut self, operations: Vec<(usize, Time)>) -> Self {
        self.jobs.push(operations);
        self
    }

    /// Parses the JSON schema.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads the JSON schema from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Serializes to JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A validated, immutable job-shop instance.
///
/// Deserializing goes through [`InstanceData`] and validation, so an
/// `Instance` value is always well-formed.
///
/// # Example
///
/// ```
/// use jssp_env::models::{Instance, InstanceData, OpId};
///
/// let data = InstanceData::new(2)
///     .with_job(vec![(0, 3), (1, 2)])
///     .with_job(vec![(1, 2), (0, 4)]);
/// let instance = Instance::new(data).unwrap();
///
/// assert_eq!(instance.job_count(), 2);
/// assert_eq!(instance.machine_of(OpId::new(1, 1)), 0);
/// assert_eq!(instance.predecessor_of(OpId::new(1, 1)), Some(OpId::new(1, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InstanceData", into = "InstanceData")]
pub struct Instance {
    name: Option<String>,
    machine_count: usize,
    jobs: Vec<Job>,
    total_work: Time,
}

impl Instance {
    /// Validates the input and builds the instance.
    ///
    /// All problems are reported at once as [`Error::Validation`].
    pub fn new(data: InstanceData) -> Result<Self> {
        validate_instance(&data).map_err(Error::Validation)?;

        let jobs: Vec<Job> = data
            .jobs
            .into_iter()
            .map(|ops| Job {
                operations: ops
                    .into_iter()
                    .map(|(machine, duration)| Operation { machine, duration })
                    .collect(),
            })
            .collect();
        let total_work = jobs.iter().map(Job::total_duration).sum();

        Ok(Self {
            name: data.name,
            machine_count: data.machines,
            jobs,
            total_work,
        })
    }

    /// Case name, if one was supplied.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn machine_count(&self) -> usize {
        self.machine_count
    }

    /// Operations of a job, in precedence order.
    pub fn operations(&self, job: usize) -> &[Operation] {
        &self.jobs[job].operations
    }

    /// Total number of operations.
    pub fn operation_count(&self) -> usize {
        self.jobs.iter().map(Job::operation_count).sum()
    }

    /// # Panics
    /// If `op` is not an operation of this instance; see [`get_operation`](Self::get_operation).
    pub fn operation(&self, op: OpId) -> &Operation {
        &self.jobs[op.job].operations[op.index]
    }

    /// The operation `op` refers to, or `None` if it lies outside the instance.
    pub fn get_operation(&self, op: OpId) -> Option<&Operation> {
        self.jobs.get(op.job)?.operations.get(op.index)
    }

    pub fn machine_of(&self, op: OpId) -> usize {
        self.operation(op).machine
    }

    pub fn duration_of(&self, op: OpId) -> Time {
        self.operation(op).duration
    }

    /// The operation that must finish before `op` may start.
    pub fn predecessor_of(&self, op: OpId) -> Option<OpId> {
        (op.index > 0).then(|| OpId::new(op.job, op.index - 1))
    }

    pub fn successor_of(&self, op: OpId) -> Option<OpId> {
        (op.index + 1 < self.jobs[op.job].operations.len())
            .then(|| OpId::new(op.job, op.index + 1))
    }

    /// Total processing time of a job.
    pub fn job_work(&self, job: usize) -> Time {
        self.jobs[job].total_duration()
    }

    /// Sum of all processing times.
    pub fn total_work(&self) -> Time {
        self.total_work
    }

    /// Total processing time demanded from a machine.
    pub fn machine_work(&self, machine: usize) -> Time {
        self.jobs
            .iter()
            .flat_map(|j| j.operations.iter())
            .filter(|o| o.machine == machine)
            .map(|o| o.duration)
            .sum()
    }

    /// All operation ids in job-major order.
    pub fn op_ids(&self) -> impl Iterator<Item = OpId> + '_ {
        self.jobs.iter().enumerate().flat_map(|(j, job)| {
            (0..job.operations.len()).map(move |i| OpId::new(j, i))
        })
    }

    /// Trivial lower bound on the makespan: max of longest job and busiest machine.
    pub fn lower_bound(&self) -> Time {
        let job_bound = self.jobs.iter().map(Job::total_duration).max().unwrap_or(0);
        let machine_bound = (0..self.machine_count)
            .map(|m| self.machine_work(m))
            .max()
            .unwrap_or(0);
        job_bound.max(machine_bound)
    }
}

impl TryFrom<InstanceData> for Instance {
    type Error = Error;

    fn try_from(data: InstanceData) -> Result<Self> {
        Self::new(data)
    }
}

impl From<Instance> for InstanceData {
    fn from(instance: Instance) -> Self {
        Self {
            name: instance.name,
            machines: instance.machine_count,
            jobs: instance
                .jobs
                .into_iter()
                .map(|j| {
                    j.operations
                        .into_iter()
                        .map(|o| (o.machine, o.duration))
                        .collect()
                })
                .collect(),
        }
    }
}
