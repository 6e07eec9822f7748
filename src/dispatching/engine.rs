//! Rule engine for multi-criteria dispatching.
//!
//! Composes multiple dispatching rules with configurable evaluation modes
//! and tie-breaking strategies.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::sync::Arc;

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::env::{EligibleOp, Observation};
use crate::scheduler::Policy;

/// How multiple rules are combined.
#[derive(Debug, Clone, Default)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    #[default]
    Sequential,
    /// Compute weighted sum of all rule scores.
    Weighted,
}

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default)]
pub enum TieBreaker {
    /// Keep decision-set order (stable sort).
    #[default]
    NextRule,
    /// Deterministic by operation id (job, then index).
    ById,
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn DispatchingRule>,
    weight: f64,
}

/// A composable rule engine for ranking a decision set.
///
/// Supports sequential multi-layer evaluation (primary rule → tie-breaker)
/// and weighted combination modes.
///
/// # Example
/// ```
/// use jssp_env::dispatching::{RuleEngine, SchedulingContext};
/// use jssp_env::dispatching::rules;
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Mopnr)
///     .with_tie_breaker(rules::Spt);
/// assert_eq!(engine.name(), "MOPNR");
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            tie_breaker: TieBreaker::NextRule,
            epsilon: 1e-9,
        }
    }

    /// Adds a primary rule (weight 1.0).
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 1.0,
        });
        self
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: DispatchingRule + 'static>(
        mut self,
        rule: R,
        weight: f64,
    ) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Adds a tie-breaking rule (weight 0.0, used only in Sequential mode).
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 0.0,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Name of the primary rule ("FIRST" for an empty engine).
    pub fn name(&self) -> &'static str {
        self.rules.first().map_or("FIRST", |wr| wr.rule.name())
    }

    /// Sorts operations by priority (highest priority first).
    ///
    /// Returns indices into `ops`, which are action indices when `ops` is
    /// an observation's decision set.
    pub fn sort_indices(&self, ops: &[EligibleOp], context: &SchedulingContext) -> Vec<usize> {
        if ops.is_empty() {
            return Vec::new();
        }

        let mut indices: Vec<usize> = (0..ops.len()).collect();

        match &self.mode {
            EvaluationMode::Sequential => {
                indices.sort_by(|&a, &b| self.compare_sequential(&ops[a], &ops[b], context));
            }
            EvaluationMode::Weighted => {
                let scores: Vec<f64> = ops
                    .iter()
                    .map(|op| self.weighted_score(op, context))
                    .collect();
                indices.sort_by(|&a, &b| {
                    scores[a]
                        .partial_cmp(&scores[b])
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| self.break_tie(&ops[a], &ops[b]))
                });
            }
        }

        indices
    }

    /// Returns the index of the highest-priority operation.
    pub fn select_best(&self, ops: &[EligibleOp], context: &SchedulingContext) -> Option<usize> {
        self.sort_indices(ops, context).first().copied()
    }

    /// Evaluates a single operation and returns scores from each rule.
    pub fn evaluate(&self, op: &EligibleOp, context: &SchedulingContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(op, context) * wr.weight)
            .collect()
    }

    fn compare_sequential(
        &self,
        a: &EligibleOp,
        b: &EligibleOp,
        context: &SchedulingContext,
    ) -> std::cmp::Ordering {
        for wr in &self.rules {
            let score_a = wr.rule.evaluate(a, context);
            let score_b = wr.rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a
                    .partial_cmp(&score_b)
                    .unwrap_or(std::cmp::Ordering::Equal);
            }
        }

        // All rules tied → use final tie-breaker
        self.break_tie(a, b)
    }

    fn break_tie(&self, a: &EligibleOp, b: &EligibleOp) -> std::cmp::Ordering {
        match &self.tie_breaker {
            TieBreaker::NextRule => std::cmp::Ordering::Equal,
            TieBreaker::ById => a.op.cmp(&b.op),
        }
    }

    fn weighted_score(&self, op: &EligibleOp, context: &SchedulingContext) -> f64 {
        self.evaluate(op, context).into_iter().sum()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .finish()
    }
}

impl Policy for RuleEngine {
    fn name(&self) -> &str {
        RuleEngine::name(self)
    }

    /// Picks the highest-priority operation; never chooses the no-op.
    fn act(&mut self, obs: &Observation) -> usize {
        let context = SchedulingContext::from_observation(obs);
        self.select_best(&obs.eligible, &context).unwrap_or(0)
    }
}
