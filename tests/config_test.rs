//! Configuration contract tests
//!
//! Every invalid configuration must be rejected before a single check
//! runs; valid overrides must reach the scan.

use ara::checks::{default_registry, CheckDescriptor, RegistryBuilder, RepoSnapshot};
use ara::config::{load_config, AuditConfig, ConfigError, ScanSettings, CONFIG_FILE_NAME};
use ara::models::{Category, Outcome, Pillar, Status};
use ara::scanner::Scanner;
use ara::scoring::ThresholdError;
use std::path::Path;

fn resolve(toml: &str) -> Result<ScanSettings, ConfigError> {
    let registry = default_registry().unwrap();
    AuditConfig::from_toml(toml, Path::new(CONFIG_FILE_NAME))?.resolve(&registry)
}

#[test]
fn test_unknown_check_names_rejected_in_every_section() {
    let cases = [
        r#"enabled_checks = ["readme_exists", "no_such_check"]"#,
        "[checks.no_such_check]\nweight = 2.0",
        "[ignore]\nchecks = [\"no_such_check\"]",
    ];
    for toml in cases {
        match resolve(toml) {
            Err(ConfigError::UnknownCheck { name, .. }) => assert_eq!(name, "no_such_check"),
            other => panic!("expected UnknownCheck for {toml:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_bad_values_rejected() {
    assert!(matches!(
        resolve("[checks.readme_exists]\nweight = 0.0"),
        Err(ConfigError::InvalidWeight { .. })
    ));
    assert!(matches!(
        resolve("[checks.readme_exists]\nweight = -1.5"),
        Err(ConfigError::InvalidWeight { .. })
    ));
    assert!(matches!(
        resolve("[ignore]\npillars = [\"speed\"]"),
        Err(ConfigError::UnknownPillar(p)) if p == "speed"
    ));
    assert!(matches!(
        resolve("[ignore]\npaths = [\"vendor/[\"]"),
        Err(ConfigError::InvalidGlob(_))
    ));
    assert!(matches!(
        resolve("[scoring]\nminimum_passing_score = 17.0"),
        Err(ConfigError::InvalidMinimumScore(_))
    ));
}

#[test]
fn test_threshold_table_must_increase() {
    let err = resolve("[levels.thresholds]\n3 = 5.0").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Thresholds(ThresholdError::NotIncreasing { level: 3, .. })
    ));

    let err = resolve("[levels.thresholds]\n5 = 20.0").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Thresholds(ThresholdError::OutOfScale { level: 5, .. })
    ));

    let err = resolve("[levels.thresholds]\n1 = 2.0").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidLevel { .. }));

    let err = resolve("[levels.gates]\nsix = [\"readme_exists\"]").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidLevel { .. }));
}

#[test]
fn test_unknown_keys_and_broken_toml_rejected() {
    assert!(matches!(
        resolve("colour = true"),
        Err(ConfigError::Parse { .. })
    ));
    let err = resolve("[scoring\nminimum_passing_score = 1").unwrap_err();
    assert!(err.to_string().contains(CONFIG_FILE_NAME));
}

#[test]
fn test_valid_overrides_resolve() {
    let settings = resolve(
        r#"
[scoring]
minimum_passing_score = 12.5

[checks.ci_workflow_present]
weight = 3.0

[checks.test_splitting]
enabled = false

[ignore]
checks = ["eval_framework_detect"]
pillars = ["telemetry_tracing"]
paths = ["vendor/**"]

[levels.thresholds]
2 = 5.0
5 = 15.5

[levels.gates]
3 = ["ci_workflow_present", "readme_exists"]

[engine]
workers = 3
check_timeout_ms = 0
"#,
    )
    .unwrap();

    assert_eq!(settings.minimum_passing_score, 12.5);
    assert_eq!(settings.weight_overrides["ci_workflow_present"], 3.0);
    assert!(settings.disabled_checks.contains("test_splitting"));
    assert!(settings.ignore.checks.contains("eval_framework_detect"));
    assert_eq!(settings.ignore.pillars.len(), 1);
    assert!(settings.ignore.paths.is_match(Path::new("vendor/lib/a.py")));
    assert_eq!(settings.scoring.thresholds.minimum(2), Some(5.0));
    assert_eq!(settings.scoring.thresholds.minimum(3), Some(9.0));
    assert_eq!(settings.scoring.thresholds.minimum(5), Some(15.5));
    assert_eq!(settings.scoring.gate_overrides[&3].len(), 2);
    assert_eq!(settings.workers, 3);
    assert!(settings.check_timeout.is_none());
}

#[test]
fn test_config_reaches_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
enabled_checks = ["readme_exists", "gitignore_present", "lockfile_exists"]

[ignore]
checks = ["lockfile_exists"]
"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("README.md"), "# Demo\n").unwrap();

    let registry = default_registry().unwrap();
    let loaded = load_config(None, dir.path()).unwrap();
    assert!(loaded.source.is_some());
    let settings = loaded.config.resolve(&registry).unwrap();
    let report = Scanner::new(registry, settings).scan_repo(dir.path()).unwrap();

    assert_eq!(report.checks.len(), 3);
    assert_eq!(report.checks["readme_exists"].status, Status::Passed);
    assert_eq!(report.checks["gitignore_present"].status, Status::Failed);
    assert_eq!(report.checks["lockfile_exists"].status, Status::Skipped);
}

#[test]
fn test_explicit_missing_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = load_config(Some(&missing), dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn test_config_can_switch_on_an_opt_in_check() {
    let mut builder = RegistryBuilder::new();
    builder
        .register(
            CheckDescriptor::new("always_on", Category::Discoverability, Pillar::DocumentationStructure),
            |_: &RepoSnapshot| -> anyhow::Result<Outcome> { Ok(Outcome::passed("on")) },
        )
        .unwrap();
    builder
        .register(
            CheckDescriptor::new("opt_in", Category::Discoverability, Pillar::DocumentationStructure)
                .enabled(false),
            |_: &RepoSnapshot| -> anyhow::Result<Outcome> { Ok(Outcome::passed("opted in")) },
        )
        .unwrap();
    let registry = builder.freeze();
    let dir = tempfile::tempdir().unwrap();

    // Off by default
    let settings = AuditConfig::default().resolve(&registry).unwrap();
    let report = Scanner::new(registry.clone(), settings).scan_repo(dir.path()).unwrap();
    assert!(!report.checks.contains_key("opt_in"));

    // Named in the allow-list
    let config = AuditConfig::from_toml(
        r#"enabled_checks = ["opt_in"]"#,
        Path::new(CONFIG_FILE_NAME),
    )
    .unwrap();
    let settings = config.resolve(&registry).unwrap();
    let report = Scanner::new(registry.clone(), settings).scan_repo(dir.path()).unwrap();
    assert_eq!(report.checks["opt_in"].status, Status::Passed);
    assert!(!report.checks.contains_key("always_on"));

    // Switched on through its override, alongside the allow-list
    let config = AuditConfig::from_toml(
        "enabled_checks = [\"opt_in\"]\n\n[checks.opt_in]\nenabled = true\n",
        Path::new(CONFIG_FILE_NAME),
    )
    .unwrap();
    let settings = config.resolve(&registry).unwrap();
    assert!(settings.force_enabled.contains("opt_in"));
    let report = Scanner::new(registry.clone(), settings).scan_repo(dir.path()).unwrap();
    assert_eq!(report.checks["opt_in"].status, Status::Passed);

    // Override alone keeps every default check as well
    let config = AuditConfig::from_toml(
        "[checks.opt_in]\nenabled = true\n",
        Path::new(CONFIG_FILE_NAME),
    )
    .unwrap();
    let settings = config.resolve(&registry).unwrap();
    let report = Scanner::new(registry.clone(), settings).scan_repo(dir.path()).unwrap();
    assert_eq!(report.checks.len(), 2);

    // An explicit disable beats the allow-list
    let config = AuditConfig::from_toml(
        "enabled_checks = [\"opt_in\", \"always_on\"]\n\n[checks.always_on]\nenabled = false\n",
        Path::new(CONFIG_FILE_NAME),
    )
    .unwrap();
    let settings = config.resolve(&registry).unwrap();
    let report = Scanner::new(registry, settings).scan_repo(dir.path()).unwrap();
    assert!(report.checks.contains_key("opt_in"));
    assert!(!report.checks.contains_key("always_on"));
}
