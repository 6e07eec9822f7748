//! Job-shop domain models.
//!
//! Provides the static problem description ([`Instance`]) and the
//! solution representation ([`Schedule`]).
//!
//! # Domain Mappings
//!
//! | jssp-env | Manufacturing | Computing |
//! |----------|--------------|-----------|
//! | Job | Order | Pipeline |
//! | Operation | Routing step | Task |
//! | Machine | Workstation | Worker |
//! | Schedule | Production plan | Execution trace |

mod instance;
mod schedule;

pub use instance::{Instance, InstanceData, Job, OpId, Operation, Time};
pub use schedule::{Assignment, Schedule, Violation, ViolationType};
