//! Schedule quality metrics (KPIs).
//!
//! Computes standard scheduling performance indicators from a
//! completed schedule and its instance.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest completion time |
//! | Lower bound | max(longest job, busiest machine) |
//! | Gap | makespan / lower bound − 1 |
//! | Total Idle | Sum over machines of (last completion − busy time) |
//! | Avg Utilization | Mean machine busyness over the makespan |
//! | Avg Flow Time | Mean job completion time (all jobs released at 0) |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};

use crate::models::{Instance, Schedule, Time};

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Makespan: latest completion time.
    pub makespan: Time,
    /// Trivial lower bound of the instance.
    pub lower_bound: Time,
    /// Relative distance to the lower bound (0.0 = provably optimal).
    pub gap: f64,
    /// Idle time machines accumulate before their last completion.
    pub total_idle: Time,
    /// Average machine utilization (0.0..1.0).
    pub avg_utilization: f64,
    /// Per-machine utilization, indexed by machine id.
    pub utilization_by_machine: Vec<f64>,
    /// Average flow time: mean job completion.
    pub avg_flow_time: f64,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its instance.
    ///
    /// # Arguments
    /// * `schedule` - The completed schedule with assignments.
    /// * `instance` - The instance it was built for.
    pub fn calculate(schedule: &Schedule, instance: &Instance) -> Self {
        let makespan = schedule.makespan();
        let lower_bound = instance.lower_bound();

        let utilization_by_machine: Vec<f64> = (0..instance.machine_count())
            .map(|m| schedule.machine_utilization(m, makespan).unwrap_or(0.0))
            .collect();
        let avg_utilization = if utilization_by_machine.is_empty() {
            0.0
        } else {
            utilization_by_machine.iter().sum::<f64>() / utilization_by_machine.len() as f64
        };

        let total_idle = (0..instance.machine_count())
            .map(|m| {
                let on_machine = schedule.assignments_for_machine(m);
                let last = on_machine.iter().map(|a| a.end).max().unwrap_or(0);
                let busy = on_machine.iter().map(|a| a.duration()).fold(0, Time::saturating_add);
                last - busy
            })
            .fold(0, Time::saturating_add);

        let completions: Vec<Time> = (0..instance.job_count())
            .filter_map(|j| schedule.job_completion_time(j))
            .collect();
        let avg_flow_time = if completions.is_empty() {
            0.0
        } else {
            completions.iter().map(|&t| t as f64).sum::<f64>() / completions.len() as f64
        };

        let gap = if lower_bound > 0 {
            makespan as f64 / lower_bound as f64 - 1.0
        } else {
            0.0
        };

        Self {
            makespan,
            lower_bound,
            gap,
            total_idle,
            avg_utilization,
            utilization_by_machine,
            avg_flow_time,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_gap: f64, min_utilization: f64) -> bool {
        self.gap <= max_gap && self.avg_utilization >= min_utilization
    }
}
