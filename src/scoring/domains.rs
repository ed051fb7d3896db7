//! Domain scores, overall score, grade and domain-ordered remediation

use crate::checks::CheckDescriptor;
use crate::models::{Domain, DomainScore, Grade, Outcome, RemediationItem, Status};
use crate::scoring::aggregator::truncate_one_decimal;
use crate::scoring::fix_first::INDETERMINATE_SUGGESTION;
use std::collections::{BTreeMap, BTreeSet};

/// Domain view of one outcome set
#[derive(Debug, Clone, PartialEq)]
pub struct DomainBreakdown {
    /// Domain name -> score; every domain is present
    pub domain_scores: BTreeMap<String, DomainScore>,
    /// 0-100, truncated to one decimal
    pub overall_score: f64,
    pub grade: Grade,
    pub remediation: Vec<RemediationItem>,
}

#[derive(Debug, Default)]
struct DomainTally {
    checks: Vec<String>,
    numerator: f64,
    denominator: f64,
    passed: usize,
    scored: usize,
    evidence: Vec<String>,
    red_flags: Vec<String>,
    /// (check, suggestion) for every non-passing outcome, registry order
    fixes: Vec<(String, String)>,
}

/// Score every domain from the planned descriptors and their outcomes.
///
/// Same contributions as categories (PASSED 1, PARTIAL 0.5, FAILED 0,
/// weighted). A domain with nothing scorable reports 0 and is left out of
/// the overall score, whose weights are renormalized over the rest.
pub fn score_domains(
    descriptors: &[CheckDescriptor],
    outcomes: &BTreeMap<String, Outcome>,
) -> DomainBreakdown {
    let mut tallies: BTreeMap<Domain, DomainTally> = Domain::ALL
        .into_iter()
        .map(|d| (d, DomainTally::default()))
        .collect();

    for descriptor in descriptors {
        let tally = tallies.entry(descriptor.effective_domain()).or_default();
        tally.checks.push(descriptor.name.clone());
        let Some(outcome) = outcomes.get(&descriptor.name) else {
            continue;
        };

        if let Some(contribution) = outcome.status.contribution() {
            tally.numerator += contribution * descriptor.weight;
            tally.denominator += descriptor.weight;
            tally.scored += 1;
        }
        match outcome.status {
            Status::Passed => {
                tally.passed += 1;
                tally.evidence.push(outcome.evidence.clone());
            }
            Status::Failed | Status::Partial => {
                if let Some(suggestion) = outcome.suggestion.clone() {
                    tally.red_flags.push(suggestion.clone());
                    tally.fixes.push((descriptor.name.clone(), suggestion));
                }
            }
            Status::Unknown => tally
                .fixes
                .push((descriptor.name.clone(), INDETERMINATE_SUGGESTION.to_string())),
            Status::Skipped => {}
        }
    }

    let mut domain_scores = BTreeMap::new();
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for (domain, tally) in &tallies {
        let score = if tally.denominator > 0.0 {
            let score = tally.numerator / tally.denominator * 100.0;
            weighted_sum += score * domain.weight();
            weight_sum += domain.weight();
            score
        } else {
            0.0
        };
        domain_scores.insert(
            domain.as_str().to_string(),
            DomainScore {
                name: domain.as_str().to_string(),
                description: domain.description().to_string(),
                score,
                weight: domain.weight(),
                weighted_score: score * domain.weight(),
                checks: tally.checks.clone(),
                passed_checks: tally.passed,
                total_checks: tally.scored,
                evidence: tally.evidence.clone(),
                red_flags: tally.red_flags.clone(),
            },
        );
    }

    let overall_score = if weight_sum > 0.0 {
        truncate_one_decimal((weighted_sum / weight_sum).clamp(0.0, 100.0))
    } else {
        0.0
    };

    DomainBreakdown {
        remediation: remediation_items(&tallies, &domain_scores),
        domain_scores,
        overall_score,
        grade: Grade::from_score(overall_score),
    }
}

/// Heaviest domain first (ties keep display order), complete domains
/// skipped, a suggestion already listed never repeated.
fn remediation_items(
    tallies: &BTreeMap<Domain, DomainTally>,
    scores: &BTreeMap<String, DomainScore>,
) -> Vec<RemediationItem> {
    let mut order = Domain::ALL.to_vec();
    order.sort_by(|a, b| b.weight().total_cmp(&a.weight()));

    let mut seen = BTreeSet::new();
    let mut items = Vec::new();
    for domain in order {
        let complete = scores
            .get(domain.as_str())
            .is_some_and(|s| s.score >= 100.0);
        let Some(tally) = tallies.get(&domain) else {
            continue;
        };
        if complete {
            continue;
        }
        for (name, suggestion) in &tally.fixes {
            if seen.insert(suggestion.clone()) {
                items.push(RemediationItem {
                    domain: domain.as_str().to_string(),
                    name: name.clone(),
                    suggestion: suggestion.clone(),
                });
            }
        }
    }
    items
}
