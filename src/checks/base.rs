//! Base check trait and descriptor types
//!
//! This module defines the core abstractions the audit engine consumes:
//! - `Check` trait, the evaluation capability a descriptor is registered with
//! - `CheckDescriptor`, the immutable metadata of a registered check
//! - `RegistryError`, raised when registration metadata is unusable

use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Domain, Outcome, Pillar};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

/// Lowest maturity level that can carry a gate (level 1 is unconditional)
pub const MIN_GATE_LEVEL: u8 = 2;
/// Highest maturity level
pub const MAX_GATE_LEVEL: u8 = 5;

/// Errors raised while building a registry. Fatal at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Check '{0}' is already registered")]
    DuplicateCheck(String),

    #[error("Invalid descriptor for check '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },
}

impl RegistryError {
    fn invalid(name: &str, reason: impl Into<String>) -> Self {
        RegistryError::InvalidDescriptor {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Trait for all readiness checks
///
/// A check is a pure, read-only function of the repository snapshot. It
/// must not execute code from the repository, touch the network or write
/// files. Returning `Err` (or panicking) is a fault: the engine records
/// the check as UNKNOWN and the scan carries on.
///
/// # Example Implementation
///
/// ```ignore
/// fn check_readme(repo: &RepoSnapshot) -> Result<Outcome> {
///     match repo.find_file(&["README.md"]) {
///         Some(found) => Ok(Outcome::passed(format!("Found {found}"))),
///         None => Ok(Outcome::failed("No README", "Add a README.md")),
///     }
/// }
///
/// registry.register(
///     CheckDescriptor::new("readme_exists", Category::Discoverability, Pillar::DistributionDx),
///     check_readme,
/// )?;
/// ```
pub trait Check: Send + Sync {
    /// Evaluate the check against one repository snapshot
    fn evaluate(&self, repo: &RepoSnapshot) -> Result<Outcome>;
}

impl<F> Check for F
where
    F: Fn(&RepoSnapshot) -> Result<Outcome> + Send + Sync,
{
    fn evaluate(&self, repo: &RepoSnapshot) -> Result<Outcome> {
        self(repo)
    }
}

/// Static metadata for one check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckDescriptor {
    /// Unique identifier (snake_case by convention)
    pub name: String,
    /// Human-readable summary of what the check looks for
    pub description: String,
    /// Points-bearing group
    pub category: Category,
    /// Capability tag
    pub pillar: Pillar,
    /// Relative weight inside its category and pillar (> 0)
    pub weight: f64,
    /// Maturity levels this check gates (empty if not a gate)
    pub gate_levels: BTreeSet<u8>,
    /// Explicit domain; None falls back to the pillar's domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    /// Disabled checks are never executed nor scored
    pub enabled: bool,
}

impl CheckDescriptor {
    /// Create a descriptor with weight 1.0, no gates, enabled
    pub fn new(name: impl Into<String>, category: Category, pillar: Pillar) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category,
            pillar,
            weight: 1.0,
            gate_levels: BTreeSet::new(),
            domain: None,
            enabled: true,
        }
    }

    /// Build a descriptor from string-typed group and pillar names
    pub fn from_parts(name: &str, group: &str, pillar: &str) -> Result<Self, RegistryError> {
        let category = group
            .parse::<Category>()
            .map_err(|_| RegistryError::invalid(name, format!("unknown group '{group}'")))?;
        let pillar = pillar
            .parse::<Pillar>()
            .map_err(|_| RegistryError::invalid(name, format!("unknown pillar '{pillar}'")))?;
        Ok(Self::new(name, category, pillar))
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Mark this check as a gate requirement for the given levels
    pub fn gate_for(mut self, levels: &[u8]) -> Self {
        self.gate_levels.extend(levels.iter().copied());
        self
    }

    /// Score this check in `domain` instead of its pillar's
    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Domain this check is scored in
    pub fn effective_domain(&self) -> Domain {
        self.domain.unwrap_or_else(|| self.pillar.domain())
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_gate_for(&self, level: u8) -> bool {
        self.gate_levels.contains(&level)
    }

    /// Check the descriptor's invariants
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::invalid(&self.name, "name must not be empty"));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(RegistryError::invalid(&self.name, "name must not contain whitespace"));
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(RegistryError::invalid(
                &self.name,
                format!("weight must be a positive number, got {}", self.weight),
            ));
        }
        if let Some(level) = self
            .gate_levels
            .iter()
            .find(|l| !(MIN_GATE_LEVEL..=MAX_GATE_LEVEL).contains(*l))
        {
            return Err(RegistryError::invalid(
                &self.name,
                format!("gate level {level} is outside {MIN_GATE_LEVEL}..={MAX_GATE_LEVEL}"),
            ));
        }
        Ok(())
    }
}

/// Progress callback for check execution: (check name, completed, total)
pub type ProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults() {
        let d = CheckDescriptor::new("readme_exists", Category::Discoverability, Pillar::DistributionDx);
        assert_eq!(d.weight, 1.0);
        assert!(d.enabled);
        assert!(d.gate_levels.is_empty());
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_descriptor_builder() {
        let d = CheckDescriptor::new("typed", Category::StaticGuardrails, Pillar::TypeContracts)
            .weight(1.5)
            .gate_for(&[4, 5])
            .describe("Type hints");
        assert_eq!(d.weight, 1.5);
        assert!(d.is_gate_for(4));
        assert!(d.is_gate_for(5));
        assert!(!d.is_gate_for(3));
        assert_eq!(d.description, "Type hints");
    }

    #[test]
    fn test_domain_falls_back_to_pillar() {
        let d = CheckDescriptor::new("typed", Category::StaticGuardrails, Pillar::TypeContracts);
        assert_eq!(d.domain, None);
        assert_eq!(d.effective_domain(), Domain::Interfaces);

        let d = d.domain(Domain::Ergonomics);
        assert_eq!(d.effective_domain(), Domain::Ergonomics);
    }

    #[test]
    fn test_invalid_weight_rejected() {
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let d = CheckDescriptor::new("w", Category::Observability, Pillar::TelemetryTracing)
                .weight(weight);
            assert!(matches!(
                d.validate(),
                Err(RegistryError::InvalidDescriptor { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_gate_level_rejected() {
        let d = CheckDescriptor::new("g", Category::CiEnforcement, Pillar::VerificationTrust)
            .gate_for(&[1]);
        assert!(d.validate().is_err());
        let d = CheckDescriptor::new("g", Category::CiEnforcement, Pillar::VerificationTrust)
            .gate_for(&[6]);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_from_parts_checks_vocabulary() {
        let d = CheckDescriptor::from_parts("ok", "ci_enforcement", "verification_trust").unwrap();
        assert_eq!(d.category, Category::CiEnforcement);

        let err = CheckDescriptor::from_parts("bad", "docs", "verification_trust").unwrap_err();
        assert!(err.to_string().contains("unknown group"));

        let err = CheckDescriptor::from_parts("bad", "ci_enforcement", "speed").unwrap_err();
        assert!(err.to_string().contains("unknown pillar"));
    }

    #[test]
    fn test_closure_is_a_check() {
        let check = |_: &RepoSnapshot| -> Result<Outcome> { Ok(Outcome::passed("always")) };
        let repo = RepoSnapshot::new(".");
        let outcome = check.evaluate(&repo).unwrap();
        assert_eq!(outcome.evidence, "always");
    }
}
