//! Input validation for job-shop instances.
//!
//! Checks structural integrity of raw instance data before an episode
//! starts. Detects:
//! - Instances without machines or jobs
//! - Empty jobs
//! - Machine references outside `0..machines`
//! - Non-positive durations
//! - Total work that does not fit in [`Time`]
//!
//! Precedence is implied by operation order, so the instance graph is a
//! set of chains and cannot contain cycles.

use crate::models::{InstanceData, Time};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// No machines or no jobs.
    EmptyInstance,
    /// A job has no operations.
    EmptyJob,
    /// An operation references a machine id that doesn't exist.
    UnknownMachine,
    /// An operation has zero or negative duration.
    NonPositiveDuration,
    /// The sum of all durations overflows [`Time`].
    HorizonOverflow,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates raw instance data.
///
/// Checks:
/// 1. At least one machine and one job
/// 2. Every job has at least one operation
/// 3. Every machine id is below `data.machines`
/// 4. Every duration is strictly positive
/// 5. The sum of all durations fits in [`Time`]
///
/// No start or finish time of an episode exceeds that sum, so passing
/// check 5 rules out arithmetic overflow during simulation.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_instance(data: &InstanceData) -> ValidationResult {
    let mut errors = Vec::new();
    let mut horizon: Option<Time> = Some(0);

    if data.machines == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyInstance,
            "Instance declares no machines",
        ));
    }
    if data.jobs.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyInstance,
            "Instance has no jobs",
        ));
    }

    for (j, job) in data.jobs.iter().enumerate() {
        if job.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyJob,
                format!("Job {j} has no operations"),
            ));
        }

        for (i, &(machine, duration)) in job.iter().enumerate() {
            if machine >= data.machines {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownMachine,
                    format!(
                        "Job {j} operation {i} references unknown machine {machine} (machines: {})",
                        data.machines
                    ),
                ));
            }
            if duration <= 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NonPositiveDuration,
                    format!("Job {j} operation {i} has non-positive duration {duration}"),
                ));
            } else {
                horizon = horizon.and_then(|h| h.checked_add(duration));
            }
        }
    }

    if horizon.is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::HorizonOverflow,
            format!("Total processing time exceeds the maximum time value {}", Time::MAX),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InstanceData {
        InstanceData::new(2)
            .with_job(vec![(0, 3), (1, 2)])
            .with_job(vec![(1, 2), (0, 4)])
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_instance(&sample()).is_ok());
    }

    #[test]
    fn test_no_machines() {
        let data = InstanceData::new(0).with_job(vec![(0, 1)]);
        let errors = validate_instance(&data).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyInstance));
    }

    #[test]
    fn test_no_jobs() {
        let errors = validate_instance(&InstanceData::new(3)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyInstance);
    }

    #[test]
    fn test_empty_job() {
        let data = sample().with_job(vec![]);
        let errors = validate_instance(&data).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyJob && e.message.contains("Job 2")));
    }

    #[test]
    fn test_unknown_machine() {
        let data = sample().with_job(vec![(0, 1), (2, 1)]);
        let errors = validate_instance(&data).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownMachine));
    }

    #[test]
    fn test_zero_duration() {
        let data = InstanceData::new(1).with_job(vec![(0, 0)]);
        let errors = validate_instance(&data).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::NonPositiveDuration);
    }

    #[test]
    fn test_negative_duration() {
        let data = InstanceData::new(1).with_job(vec![(0, -4)]);
        let errors = validate_instance(&data).unwrap_err();
        assert!(errors[0].message.contains("-4"));
    }

    #[test]
    fn test_horizon_overflow() {
        let data = InstanceData::new(1).with_job(vec![(0, Time::MAX), (0, 1)]);
        let errors = validate_instance(&data).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::HorizonOverflow);

        // split across jobs and machines
        let data = InstanceData::new(2)
            .with_job(vec![(0, Time::MAX / 2 + 1)])
            .with_job(vec![(1, Time::MAX / 2 + 1)]);
        let errors = validate_instance(&data).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::HorizonOverflow);
    }

    #[test]
    fn test_largest_horizon_accepted() {
        let data = InstanceData::new(1).with_job(vec![(0, Time::MAX - 1), (0, 1)]);
        assert!(validate_instance(&data).is_ok());
    }

    #[test]
    fn test_multiple_errors() {
        // Empty job + unknown machine + zero duration
        let data = InstanceData::new(1)
            .with_job(vec![])
            .with_job(vec![(5, 0)]);
        let errors = validate_instance(&data).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
