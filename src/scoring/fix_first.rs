//! Remediation ordering for non-passing checks

use crate::checks::{CheckDescriptor, CheckRegistry, MAX_GATE_LEVEL};
use crate::models::{FixItem, Outcome, Status, MISSING_SUGGESTION};
use crate::scoring::gates::GateRequirements;
use std::collections::BTreeMap;

/// Suggestion shown for checks that ended UNKNOWN
pub const INDETERMINATE_SUGGESTION: &str =
    "Re-run the scan or investigate why this check could not complete";

/// Rank FAILED, PARTIAL and UNKNOWN checks by remediation leverage.
///
/// Order: checks the next unachieved level's gate requires come first,
/// then heavier checks, then registry order. PASSED and SKIPPED outcomes
/// never appear. At level 5 there is no next gate, so weight decides.
pub fn prioritize(
    registry: &CheckRegistry,
    descriptors: &[CheckDescriptor],
    outcomes: &BTreeMap<String, Outcome>,
    requirements: &GateRequirements,
    achieved_level: u8,
) -> Vec<FixItem> {
    let next_gate: &[String] = if achieved_level < MAX_GATE_LEVEL {
        requirements
            .get(&(achieved_level + 1))
            .map(Vec::as_slice)
            .unwrap_or_default()
    } else {
        &[]
    };

    let mut candidates: Vec<(bool, f64, usize, FixItem)> = descriptors
        .iter()
        .filter_map(|descriptor| {
            let outcome = outcomes.get(&descriptor.name)?;
            let suggestion = match outcome.status {
                Status::Passed | Status::Skipped => return None,
                Status::Unknown => INDETERMINATE_SUGGESTION.to_string(),
                Status::Failed | Status::Partial => outcome
                    .suggestion
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| MISSING_SUGGESTION.to_string()),
            };
            Some((
                next_gate.contains(&descriptor.name),
                descriptor.weight,
                registry.position(&descriptor.name).unwrap_or(usize::MAX),
                FixItem {
                    name: descriptor.name.clone(),
                    suggestion,
                },
            ))
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| b.1.total_cmp(&a.1))
            .then_with(|| a.2.cmp(&b.2))
            .then_with(|| a.3.name.cmp(&b.3.name))
    });
    candidates.into_iter().map(|(.., item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{RegistryBuilder, RepoSnapshot};
    use crate::models::{Category, Pillar};
    use crate::scoring::gates::gate_requirements;

    fn setup() -> (CheckRegistry, Vec<CheckDescriptor>) {
        let mut builder = RegistryBuilder::new();
        let specs: [(&str, f64, &[u8]); 5] = [
            ("docs", 1.0, &[2]),
            ("light", 1.0, &[]),
            ("heavy", 2.0, &[]),
            ("ci", 1.0, &[3]),
            ("lint", 1.0, &[3]),
        ];
        for (name, weight, levels) in specs {
            builder
                .register(
                    CheckDescriptor::new(name, Category::CiEnforcement, Pillar::VerificationTrust)
                        .weight(weight)
                        .gate_for(levels),
                    |_: &RepoSnapshot| -> anyhow::Result<Outcome> { Ok(Outcome::passed("ok")) },
                )
                .unwrap();
        }
        let registry = builder.freeze();
        let descriptors = registry.all().cloned().collect();
        (registry, descriptors)
    }

    fn names(items: &[FixItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_next_gate_first_then_weight_then_order() {
        let (registry, descriptors) = setup();
        let reqs = gate_requirements(&registry, &BTreeMap::new());
        let outcomes: BTreeMap<String, Outcome> = [
            ("docs", Outcome::passed("ok")),
            ("light", Outcome::failed("no", "add light")),
            ("heavy", Outcome::failed("no", "add heavy")),
            ("ci", Outcome::partial("some", "finish ci")),
            ("lint", Outcome::failed("no", "add lint")),
        ]
        .into_iter()
        .map(|(n, o)| (n.to_string(), o))
        .collect();

        let items = prioritize(&registry, &descriptors, &outcomes, &reqs, 2);
        assert_eq!(names(&items), vec!["ci", "lint", "heavy", "light"]);
        assert_eq!(items[0].suggestion, "finish ci");
    }

    #[test]
    fn test_excludes_passed_and_skipped() {
        let (registry, descriptors) = setup();
        let reqs = gate_requirements(&registry, &BTreeMap::new());
        let outcomes: BTreeMap<String, Outcome> = [
            ("docs", Outcome::skipped("ignored")),
            ("light", Outcome::passed("ok")),
            ("heavy", Outcome::unknown("timed out")),
        ]
        .into_iter()
        .map(|(n, o)| (n.to_string(), o))
        .collect();

        let items = prioritize(&registry, &descriptors, &outcomes, &reqs, 1);
        assert_eq!(names(&items), vec!["heavy"]);
        assert_eq!(items[0].suggestion, INDETERMINATE_SUGGESTION);
    }

    #[test]
    fn test_top_level_sorts_by_weight() {
        let (registry, descriptors) = setup();
        let reqs = gate_requirements(&registry, &BTreeMap::new());
        let outcomes: BTreeMap<String, Outcome> = descriptors
            .iter()
            .map(|d| (d.name.clone(), Outcome::failed("no", "fix")))
            .collect();
        let items = prioritize(&registry, &descriptors, &outcomes, &reqs, 5);
        assert_eq!(names(&items), vec!["heavy", "docs", "light", "ci", "lint"]);
    }
}
