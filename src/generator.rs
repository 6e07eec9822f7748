//! Random instance generation.
//!
//! Taillard-style instances: every job visits every machine exactly once,
//! in a random order, with durations drawn uniformly from a range.
//!
//! # Reference
//! Taillard (1993), "Benchmarks for basic scheduling problems"

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::models::{Instance, InstanceData, Time};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Generates a random `jobs × machines` instance.
///
/// Fails with [`Error::Validation`] for an empty shape or a duration range
/// that is empty or not strictly positive.
pub fn random_instance<R: Rng + ?Sized>(
    jobs: usize,
    machines: usize,
    durations: RangeInclusive<Time>,
    rng: &mut R,
) -> Result<Instance> {
    if durations.is_empty() || *durations.start() < 1 {
        return Err(Error::Validation(vec![ValidationError::new(
            ValidationErrorKind::NonPositiveDuration,
            format!(
                "Duration range {}..={} must be non-empty and positive",
                durations.start(),
                durations.end()
            ),
        )]));
    }

    let mut data = InstanceData::new(machines);
    let mut order: Vec<usize> = (0..machines).collect();
    for _ in 0..jobs {
        order.shuffle(rng);
        let ops = order
            .iter()
            .map(|&m| (m, rng.random_range(durations.clone())))
            .collect();
        data = data.with_job(ops);
    }

    Instance::new(data)
}

/// Reproducible [`random_instance`] named `rand-{jobs}x{machines}-{seed}`.
pub fn seeded(
    jobs: usize,
    machines: usize,
    durations: RangeInclusive<Time>,
    seed: u64,
) -> Result<Instance> {
    let mut rng = StdRng::seed_from_u64(seed);
    let instance = random_instance(jobs, machines, durations, &mut rng)?;
    let data = InstanceData::from(instance).with_name(format!("rand-{jobs}x{machines}-{seed}"));
    Instance::new(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_job_visits_every_machine_once() {
        let inst = seeded(6, 4, 1..=9, 11).unwrap();
        assert_eq!(inst.job_count(), 6);
        assert_eq!(inst.machine_count(), 4);
        for j in 0..inst.job_count() {
            let mut machines: Vec<usize> = inst.operations(j).iter().map(|o| o.machine).collect();
            machines.sort_unstable();
            assert_eq!(machines, vec![0, 1, 2, 3]);
            assert!(inst.operations(j).iter().all(|o| (1..=9).contains(&o.duration)));
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = seeded(5, 3, 1..=20, 99).unwrap();
        let b = seeded(5, 3, 1..=20, 99).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name(), Some("rand-5x3-99"));
    }

    #[test]
    fn test_rejects_bad_shapes_and_ranges() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            random_instance(3, 3, 0..=5, &mut rng),
            Err(Error::Validation(_))
        ));
        #[allow(clippy::reversed_empty_ranges)]
        let empty = 5..=1;
        assert!(random_instance(3, 3, empty, &mut rng).is_err());
        assert!(random_instance(0, 3, 1..=5, &mut rng).is_err());
    }
}
