//! Dispatching rules and rule engine for decision points.
//!
//! Priority-based dispatching rules (SPT, MWKR, MOPNR, etc.) and a
//! composable rule engine that ranks the operations of a decision set.
//! A [`RuleEngine`] is also a [`Policy`](crate::scheduler::Policy), so it
//! can drive a [`JobShopEnv`](crate::env::JobShopEnv) episode directly.
//!
//! # Usage
//!
//! ```
//! use jssp_env::dispatching::{RuleEngine, SchedulingContext};
//! use jssp_env::dispatching::rules;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Mwkr)
//!     .with_tie_breaker(rules::Spt);
//!
//! let context = SchedulingContext::at_time(0);
//! assert!(engine.select_best(&[], &context).is_none());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::{EvaluationMode, RuleEngine, TieBreaker};

use crate::env::EligibleOp;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (scheduled first).
/// This follows the academic convention where SPT = shortest processing time first.
pub type RuleScore = f64;

/// A dispatching rule that evaluates operation priority.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules should return smaller values
/// for operations that should be scheduled first.
///
/// # Reference
/// Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SPT", "MWKR").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of an eligible operation at a decision point.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, op: &EligibleOp, context: &SchedulingContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
