//! Action-selection policies.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::env::Observation;

/// Chooses an action index for an observation.
///
/// The returned index must be in `0..obs.num_actions()`; the no-op, when
/// legal, is index `obs.num_eligible()`.
pub trait Policy {
    /// Short name used in logs and summaries.
    fn name(&self) -> &str;

    fn act(&mut self, obs: &Observation) -> usize;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn act(&mut self, obs: &Observation) -> usize {
        (**self).act(obs)
    }
}

/// Uniformly random legal action (no-op included when legal).
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    /// Reproducible policy.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Policy seeded from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn act(&mut self, obs: &Observation) -> usize {
        match obs.num_actions() {
            0 => 0,
            n => self.rng.random_range(0..n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EligibleOp;
    use crate::models::OpId;

    fn observation(eligible: usize, can_wait: bool) -> Observation {
        Observation {
            eligible: (0..eligible)
                .map(|j| EligibleOp {
                    op: OpId::new(j, 0),
                    machine: 0,
                    duration: 1,
                    remaining_ops_after: 0,
                    next_machine: None,
                    job_remaining_work: 1,
                    job_ready_at: 0,
                })
                .collect(),
            can_wait,
            ..Default::default()
        }
    }

    #[test]
    fn test_random_stays_in_range() {
        let mut policy = RandomPolicy::seeded(7);
        let obs = observation(3, true);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let a = policy.act(&obs);
            assert!(a < 4);
            seen[a] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_random_is_reproducible() {
        let obs = observation(5, false);
        let mut a = RandomPolicy::seeded(42);
        let mut b = RandomPolicy::seeded(42);
        let xs: Vec<_> = (0..20).map(|_| a.act(&obs)).collect();
        let ys: Vec<_> = (0..20).map(|_| b.act(&obs)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_boxed_policy() {
        let mut policy: Box<dyn Policy> = Box::new(RandomPolicy::seeded(1));
        assert_eq!(policy.name(), "random");
        assert_eq!(policy.act(&observation(1, false)), 0);
    }
}
