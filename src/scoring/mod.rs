//! Readiness Scoring
//!
//! Turns one repository's check outcomes into scores, gate verdicts, a
//! maturity level, a fix-first list and the domain view (0-100 overall
//! score, grade, remediation). Everything here is a pure function
//! of its inputs: no clock, no filesystem, no hash-order dependence.
//!
//! # Scoring Formula
//!
//! ```text
//! contribution: PASSED = 1.0, PARTIAL = 0.5, FAILED = 0.0
//!               UNKNOWN / SKIPPED excluded from numerator and denominator
//!
//! Category = Σ(contribution × weight) / Σ(weight) × max_points   (max 2.0)
//!            empty category = max_points
//! Pillar   = Σ(contribution × weight) / Σ(weight)                (0..1)
//!            empty pillar = 1.0
//! Total    = trunc₁(clamp(Σ Category, 0, 16))
//! ```
//!
//! # Maturity Levels
//!
//! | Level | Name         | Minimum total |
//! |-------|--------------|---------------|
//! | 1     | Functional   | (always)      |
//! | 2     | Documented   | 6.0           |
//! | 3     | Standardized | 9.0           |
//! | 4     | Optimized    | 13.0          |
//! | 5     | Autonomous   | 15.0          |
//!
//! A level also requires every gate from 2 up to it to pass, so a broken
//! level-3 gate caps the result at 2 no matter how high the score is.
//!
//! # Domains and Grade
//!
//! ```text
//! Domain  = Σ(contribution × weight) / Σ(weight) × 100   (empty = 0, unweighted)
//! Overall = trunc₁(Σ Domain × w_d / Σ w_d)  over scored domains
//!
//! structure 0.15  interfaces 0.20  determinism 0.20
//! security  0.20  testing    0.15  ergonomics  0.10
//!
//! >= 90 Agent-First   >= 75 Agent-Compatible
//! >= 60 Human-First, Agent-Risky   else Agent-Hostile
//! ```

mod aggregator;
mod domains;
mod fix_first;
mod gates;
mod maturity;

pub use aggregator::{truncate_one_decimal, ScoreAggregator, ScoreBreakdown};
pub use domains::{score_domains, DomainBreakdown};
pub use fix_first::{prioritize, INDETERMINATE_SUGGESTION};
pub use gates::{evaluate_gates, gate_requirements, GateRequirements};
pub use maturity::{
    classify, level_name, ThresholdError, ThresholdTable, BASE_LEVEL, DEFAULT_THRESHOLDS,
};

use crate::checks::{CheckDescriptor, CheckRegistry};
use crate::models::{FixItem, GateResult, Outcome};
use std::collections::BTreeMap;
use tracing::debug;

/// Validated level configuration for one scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringPolicy {
    pub thresholds: ThresholdTable,
    /// Level -> check names replacing the registry-derived gate
    pub gate_overrides: BTreeMap<u8, Vec<String>>,
}

/// Everything scoring derives from one outcome set
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub scores: ScoreBreakdown,
    pub gates: BTreeMap<u8, GateResult>,
    pub maturity_level: u8,
    pub maturity_name: &'static str,
    pub fix_first: Vec<FixItem>,
    pub domains: DomainBreakdown,
}

/// Score, gate, classify and prioritize in one pass.
///
/// `descriptors` are the planned checks with overrides applied; the
/// registry supplies gate metadata and the registration-order tie-break.
pub fn evaluate(
    registry: &CheckRegistry,
    descriptors: &[CheckDescriptor],
    outcomes: &BTreeMap<String, Outcome>,
    policy: &ScoringPolicy,
) -> Verdict {
    let scores = ScoreAggregator::new(descriptors).calculate(outcomes);
    let requirements = gate_requirements(registry, &policy.gate_overrides);
    let gates = evaluate_gates(&requirements, outcomes);
    let maturity_level = classify(scores.total_score, &gates, &policy.thresholds);
    let fix_first = prioritize(registry, descriptors, outcomes, &requirements, maturity_level);
    let domains = score_domains(descriptors, outcomes);

    debug!(
        "Scored {:.1}/16, level {} ({}), {} fix-first item(s), overall {:.1} ({})",
        scores.total_score,
        maturity_level,
        level_name(maturity_level),
        fix_first.len(),
        domains.overall_score,
        domains.grade
    );

    Verdict {
        scores,
        gates,
        maturity_level,
        maturity_name: level_name(maturity_level),
        fix_first,
        domains,
    }
}
