//! Weighted category and pillar scores

use crate::checks::CheckDescriptor;
use crate::models::{Category, Outcome, Pillar, MAX_SCORE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Score breakdown for one set of outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Sum of category scores, clamped to [0, 16], truncated to one decimal
    pub total_score: f64,
    /// Category name -> points in [0, max_points]; every category is present
    pub category_scores: BTreeMap<String, f64>,
    /// Pillar name -> fraction in [0, 1]; only pillars with planned checks
    pub pillar_scores: BTreeMap<String, f64>,
}

/// Running weighted sums for one group
#[derive(Debug, Clone, Copy, Default)]
struct WeightedSum {
    numerator: f64,
    denominator: f64,
}

impl WeightedSum {
    fn add(&mut self, contribution: f64, weight: f64) {
        self.numerator += contribution * weight;
        self.denominator += weight;
    }

    /// Weighted mean, or `empty` when nothing was scored
    fn ratio_or(&self, empty: f64) -> f64 {
        if self.denominator > 0.0 {
            self.numerator / self.denominator
        } else {
            empty
        }
    }
}

/// Turns outcomes into scores using the planned descriptors' metadata
pub struct ScoreAggregator<'a> {
    descriptors: BTreeMap<&'a str, &'a CheckDescriptor>,
}

impl<'a> ScoreAggregator<'a> {
    /// `descriptors` are the planned checks, with weight overrides applied
    pub fn new(descriptors: impl IntoIterator<Item = &'a CheckDescriptor>) -> Self {
        Self {
            descriptors: descriptors
                .into_iter()
                .map(|d| (d.name.as_str(), d))
                .collect(),
        }
    }

    /// Calculate category, pillar and total scores.
    ///
    /// UNKNOWN and SKIPPED outcomes are left out of both numerator and
    /// denominator. A category with nothing scorable earns its full
    /// `max_points`; a pillar with nothing scorable reports 1.0.
    pub fn calculate(&self, outcomes: &BTreeMap<String, Outcome>) -> ScoreBreakdown {
        let mut categories: BTreeMap<Category, WeightedSum> = BTreeMap::new();
        let mut pillars: BTreeMap<Pillar, WeightedSum> = self
            .descriptors
            .values()
            .map(|d| (d.pillar, WeightedSum::default()))
            .collect();

        // BTreeMap iteration keeps summation order fixed across runs
        for (name, outcome) in outcomes {
            let Some(descriptor) = self.descriptors.get(name.as_str()) else {
                debug!("Ignoring outcome for unplanned check {}", name);
                continue;
            };
            let Some(contribution) = outcome.status.contribution() else {
                continue;
            };
            categories
                .entry(descriptor.category)
                .or_default()
                .add(contribution, descriptor.weight);
            pillars
                .entry(descriptor.pillar)
                .or_default()
                .add(contribution, descriptor.weight);
        }

        let mut category_scores = BTreeMap::new();
        let mut sum = 0.0;
        for category in Category::ALL {
            let max = category.max_points();
            let score = categories
                .get(&category)
                .map_or(max, |s| s.ratio_or(1.0) * max);
            sum += score;
            category_scores.insert(category.as_str().to_string(), score);
        }

        let pillar_scores = pillars
            .iter()
            .map(|(pillar, s)| (pillar.as_str().to_string(), s.ratio_or(1.0)))
            .collect();

        ScoreBreakdown {
            total_score: truncate_one_decimal(sum.clamp(0.0, MAX_SCORE)),
            category_scores,
            pillar_scores,
        }
    }
}

/// Truncate toward zero at one decimal place.
///
/// The epsilon absorbs representation error so 15.9999999 (a sum of
/// exact tenths) still reads 16.0.
pub fn truncate_one_decimal(value: f64) -> f64 {
    ((value * 10.0) + 1e-9).floor() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    fn descriptor(name: &str, category: Category, pillar: Pillar) -> CheckDescriptor {
        CheckDescriptor::new(name, category, pillar)
    }

    fn outcomes(entries: &[(&str, Status)]) -> BTreeMap<String, Outcome> {
        entries
            .iter()
            .map(|(name, status)| {
                let outcome = match status {
                    Status::Passed => Outcome::passed("ok"),
                    Status::Partial => Outcome::partial("half", "finish"),
                    Status::Failed => Outcome::failed("no", "fix"),
                    Status::Unknown => Outcome::unknown("boom"),
                    Status::Skipped => Outcome::skipped("ignored"),
                };
                (name.to_string(), outcome)
            })
            .collect()
    }

    #[test]
    fn test_half_passed_category() {
        let plan = vec![
            descriptor("a", Category::CiEnforcement, Pillar::VerificationTrust),
            descriptor("b", Category::CiEnforcement, Pillar::VerificationTrust),
        ];
        let scores = ScoreAggregator::new(&plan)
            .calculate(&outcomes(&[("a", Status::Passed), ("b", Status::Failed)]));
        assert_eq!(scores.category_scores["ci_enforcement"], 1.0);
        assert_eq!(scores.pillar_scores["verification_trust"], 0.5);
        // the seven other categories are empty and earn full points
        assert_eq!(scores.total_score, 15.0);
    }

    #[test]
    fn test_weights_apply() {
        let plan = vec![
            descriptor("heavy", Category::Observability, Pillar::TelemetryTracing).weight(3.0),
            descriptor("light", Category::Observability, Pillar::TelemetryTracing),
        ];
        let scores = ScoreAggregator::new(&plan)
            .calculate(&outcomes(&[("heavy", Status::Passed), ("light", Status::Failed)]));
        assert_eq!(scores.category_scores["observability"], 1.5);
    }

    #[test]
    fn test_partial_counts_half() {
        let plan = vec![descriptor("p", Category::Discoverability, Pillar::DistributionDx)];
        let scores = ScoreAggregator::new(&plan).calculate(&outcomes(&[("p", Status::Partial)]));
        assert_eq!(scores.category_scores["discoverability"], 1.0);
    }

    #[test]
    fn test_unknown_and_skipped_excluded() {
        let plan = vec![
            descriptor("ok", Category::StaticGuardrails, Pillar::FastGuardrails),
            descriptor("boom", Category::StaticGuardrails, Pillar::FastGuardrails),
            descriptor("gone", Category::StaticGuardrails, Pillar::TypeContracts),
        ];
        let scores = ScoreAggregator::new(&plan).calculate(&outcomes(&[
            ("ok", Status::Failed),
            ("boom", Status::Unknown),
            ("gone", Status::Skipped),
        ]));
        assert_eq!(scores.category_scores["static_guardrails"], 0.0);
        assert_eq!(scores.pillar_scores["fast_guardrails"], 0.0);
        // pillar with nothing scorable is neutral
        assert_eq!(scores.pillar_scores["type_contracts"], 1.0);
    }

    #[test]
    fn test_empty_category_earns_max_points() {
        let plan = vec![descriptor("s", Category::SecurityAndGovernance, Pillar::SecretHygiene)];
        let scores = ScoreAggregator::new(&plan).calculate(&outcomes(&[("s", Status::Skipped)]));
        assert_eq!(scores.category_scores["security_and_governance"], 2.0);
        assert_eq!(scores.total_score, MAX_SCORE);
    }

    #[test]
    fn test_only_planned_pillars_reported() {
        let plan = vec![descriptor("x", Category::CiEnforcement, Pillar::VerificationTrust)];
        let scores = ScoreAggregator::new(&plan).calculate(&BTreeMap::new());
        assert_eq!(scores.pillar_scores.len(), 1);
        assert_eq!(scores.category_scores.len(), Category::ALL.len());
    }

    #[test]
    fn test_deterministic() {
        let plan: Vec<_> = (0..7)
            .map(|i| {
                descriptor(&format!("c{i}"), Category::TestFeedbackLoop, Pillar::VerificationSpeed)
                    .weight(0.1 + i as f64 * 0.37)
            })
            .collect();
        let results = outcomes(&[
            ("c0", Status::Passed),
            ("c1", Status::Partial),
            ("c2", Status::Failed),
            ("c3", Status::Passed),
            ("c4", Status::Partial),
            ("c5", Status::Unknown),
            ("c6", Status::Passed),
        ]);
        let first = ScoreAggregator::new(&plan).calculate(&results);
        let reversed: Vec<_> = plan.iter().rev().cloned().collect();
        let second = ScoreAggregator::new(&reversed).calculate(&results);
        assert_eq!(first, second);
        assert_eq!(
            first.category_scores["test_feedback_loop"].to_bits(),
            second.category_scores["test_feedback_loop"].to_bits()
        );
    }

    #[test]
    fn test_truncation() {
        assert_eq!(truncate_one_decimal(12.99), 12.9);
        assert_eq!(truncate_one_decimal(15.999_999_999_999_998), 16.0);
        assert_eq!(truncate_one_decimal(0.0), 0.0);
        assert_eq!(truncate_one_decimal(7.25), 7.2);
    }
}
