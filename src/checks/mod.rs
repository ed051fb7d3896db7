//! Readiness checks
//!
//! This module provides the check framework and the built-in catalog of
//! repository readiness checks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CheckRegistry                           │
//! │  - construct -> populate -> freeze -> query                 │
//! │  - one owned instance per scan (no global state)            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CheckEngine                            │
//! │  - Runs enabled checks in parallel (rayon)                  │
//! │  - Ignored checks / pillars recorded as SKIPPED             │
//! │  - Errors, panics and timeouts recorded as UNKNOWN          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Check Trait                            │
//! │  - evaluate(&RepoSnapshot) -> Result<Outcome>               │
//! │  - read-only, bounded file access through the snapshot      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Built-in catalog
//!
//! | Category                | Module            |
//! |-------------------------|-------------------|
//! | discoverability         | `discoverability` |
//! | deterministic_setup     | `setup`           |
//! | build_and_run           | `setup`           |
//! | test_feedback_loop      | `testing`         |
//! | static_guardrails       | `guardrails`      |
//! | observability           | `observability`   |
//! | ci_enforcement          | `ci`              |
//! | security_and_governance | `security`        |
//!
//! Domain-focused families follow, each scored mainly in one domain:
//!
//! | Domain       | Module        |
//! |--------------|---------------|
//! | structure    | `structure`   |
//! | interfaces   | `interfaces`  |
//! | determinism  | `determinism` |
//! | security     | `secrets`     |
//! | testing      | `validation`  |
//! | ergonomics   | `ergonomics`  |
//!
//! # Usage
//!
//! ```ignore
//! use ara::checks::{default_registry, CheckEngineBuilder, IgnorePolicy, RepoSnapshot};
//!
//! let registry = default_registry()?;
//! let engine = CheckEngineBuilder::new().workers(4).build();
//! let outcomes = engine.run(registry.entries(), &RepoSnapshot::new("."), &IgnorePolicy::default());
//! ```

mod base;
mod ci;
mod determinism;
mod discoverability;
mod engine;
mod ergonomics;
mod guardrails;
mod interfaces;
mod observability;
mod registry;
mod secrets;
mod security;
mod setup;
mod snapshot;
mod structure;
mod testing;
mod validation;

pub use base::{
    Check, CheckDescriptor, ProgressCallback, RegistryError, MAX_GATE_LEVEL, MIN_GATE_LEVEL,
};
pub use engine::{CheckEngine, CheckEngineBuilder, IgnorePolicy};
pub use registry::{CheckRegistry, RegisteredCheck, RegistryBuilder};
pub use snapshot::{PathFilter, RepoSnapshot, MAX_READ_BYTES};

/// Build the registry holding every built-in check, in catalog order
pub fn default_registry() -> Result<CheckRegistry, RegistryError> {
    let mut builder = RegistryBuilder::new();
    discoverability::register(&mut builder)?;
    setup::register(&mut builder)?;
    testing::register(&mut builder)?;
    guardrails::register(&mut builder)?;
    observability::register(&mut builder)?;
    ci::register(&mut builder)?;
    security::register(&mut builder)?;
    structure::register(&mut builder)?;
    interfaces::register(&mut builder)?;
    determinism::register(&mut builder)?;
    secrets::register(&mut builder)?;
    validation::register(&mut builder)?;
    ergonomics::register(&mut builder)?;
    Ok(builder.freeze())
}
