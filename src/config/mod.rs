//! Configuration module for ARA
//!
//! This module handles:
//! - `.ara.toml` discovery and parsing
//! - Validation against the check registry
//! - Check enablement, weights, ignore policy, level thresholds and gates
//! - Engine defaults (workers, per-check timeout)

mod audit_config;

pub use audit_config::{
    discover_config, generate_default_config, load_config, AuditConfig, CheckOverride,
    ConfigError, EngineConfig, IgnoreConfig, LevelsConfig, LoadedConfig, ScanSettings,
    ScoringConfig, CONFIG_FILE_NAME, DEFAULT_CHECK_TIMEOUT_MS, DEFAULT_MINIMUM_PASSING_SCORE,
};
