//! Check descriptor registry
//!
//! Lifecycle is construct -> populate -> freeze -> query:
//!
//! ```ignore
//! let mut builder = RegistryBuilder::new();
//! builder.register(descriptor, check_fn)?;
//! let registry = builder.freeze();
//! for d in registry.by_gate_level(3) { ... }
//! ```
//!
//! There is no process-wide instance. Every scan (and every test) owns the
//! registry it builds, so registrations never leak between them.

use crate::checks::base::{Check, CheckDescriptor, RegistryError};
use crate::models::Category;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A descriptor paired with its evaluation capability
#[derive(Clone)]
pub struct RegisteredCheck {
    pub descriptor: CheckDescriptor,
    pub check: Arc<dyn Check>,
}

impl std::fmt::Debug for RegisteredCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredCheck")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Mutable, append-only registry under construction
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<RegisteredCheck>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check
    ///
    /// Fails with `DuplicateCheck` if the name is taken and with
    /// `InvalidDescriptor` if the metadata breaks an invariant.
    pub fn register(
        &mut self,
        descriptor: CheckDescriptor,
        check: impl Check + 'static,
    ) -> Result<(), RegistryError> {
        self.register_arc(descriptor, Arc::new(check))
    }

    /// Register a check whose capability is already shared
    pub fn register_arc(
        &mut self,
        descriptor: CheckDescriptor,
        check: Arc<dyn Check>,
    ) -> Result<(), RegistryError> {
        descriptor.validate()?;
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateCheck(descriptor.name));
        }
        debug!("Registering check: {}", descriptor.name);
        self.index
            .insert(descriptor.name.clone(), self.entries.len());
        self.entries.push(RegisteredCheck { descriptor, check });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish registration. The returned registry is read-only.
    pub fn freeze(self) -> CheckRegistry {
        CheckRegistry {
            entries: self.entries,
            index: self.index,
        }
    }
}

/// Frozen registry: single source of truth for which checks exist
#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    entries: Vec<RegisteredCheck>,
    index: HashMap<String, usize>,
}

impl CheckRegistry {
    /// Every descriptor in registration order. Call again to restart.
    pub fn all(&self) -> impl Iterator<Item = &CheckDescriptor> + Clone + '_ {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// Descriptors paired with their checks, in registration order
    pub fn entries(&self) -> &[RegisteredCheck] {
        &self.entries
    }

    /// Descriptors of one category, in registration order
    pub fn by_group(&self, group: Category) -> impl Iterator<Item = &CheckDescriptor> + Clone + '_ {
        self.all().filter(move |d| d.category == group)
    }

    /// Descriptors gating one maturity level, in registration order
    pub fn by_gate_level(&self, level: u8) -> impl Iterator<Item = &CheckDescriptor> + Clone + '_ {
        self.all().filter(move |d| d.is_gate_for(level))
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredCheck> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn descriptor(&self, name: &str) -> Option<&CheckDescriptor> {
        self.get(name).map(|e| &e.descriptor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registration index of a check, used as the stable tie-break
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::snapshot::RepoSnapshot;
    use crate::models::{Outcome, Pillar};

    fn pass(_: &RepoSnapshot) -> anyhow::Result<Outcome> {
        Ok(Outcome::passed("ok"))
    }

    fn descriptor(name: &str, category: Category) -> CheckDescriptor {
        CheckDescriptor::new(name, category, Pillar::VerificationTrust)
    }

    fn sample() -> CheckRegistry {
        let mut builder = RegistryBuilder::new();
        builder
            .register(descriptor("c", Category::CiEnforcement).gate_for(&[3]), pass)
            .unwrap();
        builder
            .register(descriptor("a", Category::Discoverability).gate_for(&[2, 3]), pass)
            .unwrap();
        builder
            .register(descriptor("b", Category::CiEnforcement), pass)
            .unwrap();
        builder.freeze()
    }

    #[test]
    fn test_registration_order_preserved() {
        let registry = sample();
        let names: Vec<_> = registry.all().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(registry.position("a"), Some(1));
    }

    #[test]
    fn test_all_is_restartable() {
        let registry = sample();
        let first: Vec<_> = registry.all().collect();
        let second: Vec<_> = registry.all().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_filtered_views_keep_order() {
        let registry = sample();
        let ci: Vec<_> = registry
            .by_group(Category::CiEnforcement)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(ci, vec!["c", "b"]);

        let gate3: Vec<_> = registry.by_gate_level(3).map(|d| d.name.as_str()).collect();
        assert_eq!(gate3, vec!["c", "a"]);
        assert_eq!(registry.by_gate_level(5).count(), 0);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(descriptor("dup", Category::Observability), pass)
            .unwrap();
        let err = builder
            .register(descriptor("dup", Category::Discoverability), pass)
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateCheck("dup".into()));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_invalid_descriptor_rejected() {
        let mut builder = RegistryBuilder::new();
        let err = builder
            .register(descriptor("zero", Category::Observability).weight(0.0), pass)
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDescriptor { .. }));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_isolated_instances() {
        let mut one = RegistryBuilder::new();
        one.register(descriptor("only_here", Category::Observability), pass)
            .unwrap();
        let one = one.freeze();
        let two = RegistryBuilder::new().freeze();
        assert!(one.contains("only_here"));
        assert!(!two.contains("only_here"));
    }

    #[test]
    fn test_debug_output_summarizes_entries() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(descriptor("shown", Category::Observability), pass)
            .unwrap();
        assert_eq!(format!("{builder:?}"), "RegistryBuilder { entries: 1 }");

        let registry = builder.freeze();
        let rendered = format!("{registry:?}");
        assert!(rendered.contains("shown"));
        assert!(!rendered.contains("check:"));
    }
}
