//! Audit configuration support
//!
//! Loads `.ara.toml` and validates it against a check registry before any
//! check runs. A scan under a broken configuration is refused outright.
//!
//! # Configuration Format
//!
//! ```toml
//! # .ara.toml
//!
//! enabled_checks = []   # empty = every registered check
//!
//! [scoring]
//! minimum_passing_score = 10.0
//!
//! [checks.ci_workflow_present]
//! enabled = true
//! weight = 2.0
//!
//! [ignore]
//! checks = ["security_policy_present_or_baseline"]
//! pillars = ["golden_datasets"]
//! paths = ["vendor/**"]
//!
//! [levels.thresholds]
//! 2 = 6.0
//!
//! [levels.gates]
//! 3 = ["readme_has_test_instructions", "ci_workflow_present"]
//!
//! [engine]
//! workers = 0
//! check_timeout_ms = 10000
//! ```

use crate::checks::{
    CheckRegistry, IgnorePolicy, PathFilter, RegisteredCheck, MAX_GATE_LEVEL, MIN_GATE_LEVEL,
};
use crate::models::{Pillar, MAX_SCORE};
use crate::scoring::{ScoringPolicy, ThresholdError, ThresholdTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// File name looked up during discovery
pub const CONFIG_FILE_NAME: &str = ".ara.toml";

/// Default `--strict` bar on the 0-16 scale
pub const DEFAULT_MINIMUM_PASSING_SCORE: f64 = 10.0;

/// Default per-check wall-clock limit
pub const DEFAULT_CHECK_TIMEOUT_MS: u64 = 10_000;

/// Invalid configuration. Fatal: reported before any check runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown check '{name}' in {section}")]
    UnknownCheck { section: &'static str, name: String },

    #[error("Invalid weight for check '{name}': {value} (must be a positive, finite number)")]
    InvalidWeight { name: String, value: f64 },

    #[error("Unknown pillar '{0}' in ignore.pillars")]
    UnknownPillar(String),

    #[error("Invalid level '{key}' in {section} (expected 2..=5)")]
    InvalidLevel { section: &'static str, key: String },

    #[error("Invalid level thresholds: {0}")]
    Thresholds(#[from] ThresholdError),

    #[error("Invalid ignore.paths pattern: {0}")]
    InvalidGlob(#[from] globset::Error),

    #[error("Invalid scoring.minimum_passing_score {0} (must be within 0..=16)")]
    InvalidMinimumScore(f64),
}

/// Raw `.ara.toml` contents
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Allow-list of checks to run (empty = all)
    #[serde(default)]
    pub enabled_checks: Vec<String>,

    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Per-check overrides
    #[serde(default)]
    pub checks: BTreeMap<String, CheckOverride>,

    #[serde(default)]
    pub ignore: IgnoreConfig,

    #[serde(default)]
    pub levels: LevelsConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScoringConfig {
    #[serde(default = "default_minimum_passing_score")]
    pub minimum_passing_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            minimum_passing_score: default_minimum_passing_score(),
        }
    }
}

fn default_minimum_passing_score() -> f64 {
    DEFAULT_MINIMUM_PASSING_SCORE
}

/// Override for a single check
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CheckOverride {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct IgnoreConfig {
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub pillars: Vec<String>,
    /// Repo-relative globs hidden from every check
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Level tables keyed by level number ("2".."5")
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct LevelsConfig {
    #[serde(default)]
    pub thresholds: BTreeMap<String, f64>,
    #[serde(default)]
    pub gates: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EngineConfig {
    /// 0 = one worker per core
    #[serde(default)]
    pub workers: usize,
    /// 0 disables the per-check timeout
    #[serde(default = "default_check_timeout_ms")]
    pub check_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            check_timeout_ms: default_check_timeout_ms(),
        }
    }
}

fn default_check_timeout_ms() -> u64 {
    DEFAULT_CHECK_TIMEOUT_MS
}

/// A parsed config and where it came from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: AuditConfig,
    /// None when built-in defaults are in effect
    pub source: Option<PathBuf>,
}

/// Validated settings for one scan
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Allow-list; None runs every enabled registry check
    pub enabled_checks: Option<BTreeSet<String>>,
    /// Checks switched off through `checks.NAME.enabled = false`
    pub disabled_checks: BTreeSet<String>,
    /// Checks switched on through `checks.NAME.enabled = true`, including
    /// ones registered as off by default
    pub force_enabled: BTreeSet<String>,
    pub weight_overrides: BTreeMap<String, f64>,
    pub ignore: IgnorePolicy,
    pub scoring: ScoringPolicy,
    pub minimum_passing_score: f64,
    pub workers: usize,
    pub check_timeout: Option<Duration>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            enabled_checks: None,
            disabled_checks: BTreeSet::new(),
            force_enabled: BTreeSet::new(),
            weight_overrides: BTreeMap::new(),
            ignore: IgnorePolicy::default(),
            scoring: ScoringPolicy::default(),
            minimum_passing_score: DEFAULT_MINIMUM_PASSING_SCORE,
            workers: 0,
            check_timeout: Some(Duration::from_millis(DEFAULT_CHECK_TIMEOUT_MS)),
        }
    }
}

impl ScanSettings {
    /// Registry entries with enablement and weight overrides applied,
    /// in registry order. Disabled entries stay in the list so the engine
    /// can account for them; it never runs them.
    ///
    /// An explicit disable always wins. Naming a check in the allow-list or
    /// setting `enabled = true` turns on a check registered as off.
    pub fn plan(&self, registry: &CheckRegistry) -> Vec<RegisteredCheck> {
        registry
            .entries()
            .iter()
            .map(|entry| {
                let mut planned = entry.clone();
                let name = entry.descriptor.name.as_str();
                let listed = self
                    .enabled_checks
                    .as_ref()
                    .map(|set| set.contains(name));
                if listed == Some(false) || self.disabled_checks.contains(name) {
                    planned.descriptor.enabled = false;
                } else if listed == Some(true) || self.force_enabled.contains(name) {
                    planned.descriptor.enabled = true;
                }
                if let Some(&weight) = self.weight_overrides.get(name) {
                    planned.descriptor.weight = weight;
                }
                planned
            })
            .collect()
    }
}

impl AuditConfig {
    /// Parse a config from TOML text
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate against a registry and produce the settings for a scan
    pub fn resolve(&self, registry: &CheckRegistry) -> Result<ScanSettings, ConfigError> {
        let known = |section: &'static str, name: &str| -> Result<String, ConfigError> {
            if registry.contains(name) {
                Ok(name.to_string())
            } else {
                Err(ConfigError::UnknownCheck {
                    section,
                    name: name.to_string(),
                })
            }
        };

        let enabled_checks = if self.enabled_checks.is_empty() {
            None
        } else {
            Some(
                self.enabled_checks
                    .iter()
                    .map(|name| known("enabled_checks", name))
                    .collect::<Result<BTreeSet<_>, _>>()?,
            )
        };

        let mut disabled_checks = BTreeSet::new();
        let mut force_enabled = BTreeSet::new();
        let mut weight_overrides = BTreeMap::new();
        for (name, check) in &self.checks {
            let name = known("checks", name)?;
            if let Some(weight) = check.weight {
                if !weight.is_finite() || weight <= 0.0 {
                    return Err(ConfigError::InvalidWeight { name, value: weight });
                }
                weight_overrides.insert(name.clone(), weight);
            }
            match check.enabled {
                Some(false) => {
                    disabled_checks.insert(name);
                }
                Some(true) => {
                    force_enabled.insert(name);
                }
                None => {}
            }
        }

        let ignored_checks = self
            .ignore
            .checks
            .iter()
            .map(|name| known("ignore.checks", name))
            .collect::<Result<BTreeSet<_>, _>>()?;
        let ignored_pillars = self
            .ignore
            .pillars
            .iter()
            .map(|p| {
                p.parse::<Pillar>()
                    .map_err(|_| ConfigError::UnknownPillar(p.clone()))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        let paths = PathFilter::new(&self.ignore.paths)?;

        let mut threshold_overrides = BTreeMap::new();
        for (key, &value) in &self.levels.thresholds {
            threshold_overrides.insert(parse_level("levels.thresholds", key)?, value);
        }
        let thresholds = ThresholdTable::from_overrides(&threshold_overrides)?;

        let mut gate_overrides = BTreeMap::new();
        for (key, names) in &self.levels.gates {
            let level = parse_level("levels.gates", key)?;
            for name in names.iter().filter(|n| !registry.contains(n)) {
                warn!(
                    "Gate for level {} requires unregistered check '{}'; the gate cannot pass",
                    level, name
                );
            }
            gate_overrides.insert(level, names.clone());
        }

        let minimum = self.scoring.minimum_passing_score;
        if !minimum.is_finite() || !(0.0..=MAX_SCORE).contains(&minimum) {
            return Err(ConfigError::InvalidMinimumScore(minimum));
        }

        let check_timeout = match self.engine.check_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        debug!(
            "Resolved config: {} override(s), {} ignored check(s), {} ignored pillar(s), {} ignored path(s)",
            self.checks.len(),
            ignored_checks.len(),
            ignored_pillars.len(),
            paths.patterns().len()
        );

        Ok(ScanSettings {
            enabled_checks,
            disabled_checks,
            force_enabled,
            weight_overrides,
            ignore: IgnorePolicy {
                checks: ignored_checks,
                pillars: ignored_pillars,
                paths,
            },
            scoring: ScoringPolicy {
                thresholds,
                gate_overrides,
            },
            minimum_passing_score: minimum,
            workers: self.engine.workers,
            check_timeout,
        })
    }
}

fn parse_level(section: &'static str, key: &str) -> Result<u8, ConfigError> {
    key.trim()
        .parse::<u8>()
        .ok()
        .filter(|l| (MIN_GATE_LEVEL..=MAX_GATE_LEVEL).contains(l))
        .ok_or_else(|| ConfigError::InvalidLevel {
            section,
            key: key.to_string(),
        })
}

/// Find `.ara.toml` for a scan starting at `start`.
///
/// Searches `start` and each parent directory, then the home directory.
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
        .or_else(|| {
            dirs::home_dir()
                .map(|home| home.join(CONFIG_FILE_NAME))
                .filter(|candidate| candidate.is_file())
        })
}

/// Load the configuration for a scan.
///
/// An explicit path must exist. Without one, discovery runs from `start`;
/// finding nothing means built-in defaults.
pub fn load_config(explicit: Option<&Path>, start: &Path) -> Result<LoadedConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match discover_config(start) {
            Some(path) => path,
            None => {
                debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                return Ok(LoadedConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = AuditConfig::from_toml(&content, &path)?;
    debug!("Loaded config from {}", path.display());
    Ok(LoadedConfig {
        config,
        source: Some(path),
    })
}

/// Commented starter file written by `ara init-config`
pub fn generate_default_config() -> String {
    format!(
        r#"# Agent readiness audit configuration
# Place this file at the repository root (or any parent directory) as {name}.

# Run only these checks. Leave empty to run every registered check.
enabled_checks = []

[scoring]
# `ara scan --strict` fails when a repository scores below this (0-16).
minimum_passing_score = {minimum:.1}

# Per-check overrides. Weights must be positive.
# [checks.ci_workflow_present]
# enabled = true
# weight = 2.0

[ignore]
# Ignored checks and pillars are reported as skipped and never scored.
checks = []
pillars = []
# Globs relative to the repository root, hidden from every check.
paths = []

[levels.thresholds]
# Minimum total score per maturity level.
# 2 = 6.0
# 3 = 9.0
# 4 = 13.0
# 5 = 15.0

[levels.gates]
# Replace the checks a level requires. Every listed check must pass.
# 3 = ["readme_has_test_instructions", "ci_workflow_present"]

[engine]
# 0 = one worker per core
workers = 0
# Per-check timeout; 0 disables it.
check_timeout_ms = {timeout}
"#,
        name = CONFIG_FILE_NAME,
        minimum = DEFAULT_MINIMUM_PASSING_SCORE,
        timeout = DEFAULT_CHECK_TIMEOUT_MS,
    )
}
