#![allow(dead_code)]

use jssp_env::models::{Instance, InstanceData};
use jssp_env::{EnvConfig, JobShopEnv};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; `RUST_LOG=jssp_env=debug` shows
/// every decision point.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// J0: M0(3) → M1(2), J1: M1(2) → M0(4).
pub fn two_by_two() -> InstanceData {
    InstanceData::new(2)
        .with_name("two-by-two")
        .with_job(vec![(0, 3), (1, 2)])
        .with_job(vec![(1, 2), (0, 4)])
}

/// Fisher & Thompson ft06 (6 jobs × 6 machines, optimum 55).
pub fn ft06() -> InstanceData {
    InstanceData::new(6)
        .with_name("ft06")
        .with_job(vec![(2, 1), (0, 3), (1, 6), (3, 7), (5, 3), (4, 6)])
        .with_job(vec![(1, 8), (2, 5), (4, 10), (5, 10), (0, 10), (3, 4)])
        .with_job(vec![(2, 5), (3, 4), (5, 8), (0, 9), (1, 1), (4, 7)])
        .with_job(vec![(1, 5), (0, 5), (2, 5), (3, 3), (4, 8), (5, 9)])
        .with_job(vec![(2, 9), (1, 3), (4, 5), (5, 4), (0, 3), (3, 1)])
        .with_job(vec![(1, 3), (3, 3), (5, 9), (0, 10), (4, 4), (2, 1)])
}

pub fn env_with(config: EnvConfig) -> JobShopEnv {
    init_tracing();
    JobShopEnv::new(config)
}

pub fn instance(data: InstanceData) -> Instance {
    Instance::new(data).expect("fixture instance is valid")
}
