//! Per-level gate evaluation
//!
//! A gate passes only when every required check has a PASSED outcome.
//! Missing outcomes (disabled, ignored or unregistered checks) fail the
//! gate, so a gate cannot be bypassed by switching its own checks off.

use crate::checks::{CheckRegistry, MAX_GATE_LEVEL, MIN_GATE_LEVEL};
use crate::models::{GateResult, Outcome, Status};
use std::collections::BTreeMap;

/// Required check names per level (2..=5)
pub type GateRequirements = BTreeMap<u8, Vec<String>>;

/// Resolve which checks each level requires.
///
/// A level listed in `overrides` uses exactly those names; other levels
/// take the registry's gate metadata. Names come out in registry order,
/// with names the registry does not know appended in their given order.
pub fn gate_requirements(
    registry: &CheckRegistry,
    overrides: &BTreeMap<u8, Vec<String>>,
) -> GateRequirements {
    (MIN_GATE_LEVEL..=MAX_GATE_LEVEL)
        .map(|level| {
            let names = match overrides.get(&level) {
                Some(names) => registry_order(registry, names),
                None => registry
                    .by_gate_level(level)
                    .map(|d| d.name.clone())
                    .collect(),
            };
            (level, names)
        })
        .collect()
}

fn registry_order(registry: &CheckRegistry, names: &[String]) -> Vec<String> {
    let mut known: Vec<(usize, &String)> = Vec::new();
    let mut unknown: Vec<&String> = Vec::new();
    for name in names {
        if known.iter().any(|(_, n)| *n == name) || unknown.contains(&name) {
            continue;
        }
        match registry.position(name) {
            Some(pos) => known.push((pos, name)),
            None => unknown.push(name),
        }
    }
    known.sort_by_key(|(pos, _)| *pos);
    known
        .into_iter()
        .map(|(_, n)| n.clone())
        .chain(unknown.into_iter().cloned())
        .collect()
}

/// Evaluate every level's gate against the outcome set
pub fn evaluate_gates(
    requirements: &GateRequirements,
    outcomes: &BTreeMap<String, Outcome>,
) -> BTreeMap<u8, GateResult> {
    requirements
        .iter()
        .map(|(&level, required)| {
            let failing: Vec<String> = required
                .iter()
                .filter(|name| {
                    outcomes
                        .get(name.as_str())
                        .map_or(true, |o| o.status != Status::Passed)
                })
                .cloned()
                .collect();
            let result = GateResult {
                passed: failing.is_empty(),
                required_checks: required.clone(),
                failing_checks: failing,
            };
            (level, result)
        })
        .collect()
}
