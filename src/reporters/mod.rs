//! Output reporters for ARA scan results
//!
//! Supports multiple output formats:
//! - `table` - Terminal output with colors
//! - `json` - Machine-readable JSON (round-trips through `ara report`)
//! - `markdown` - GitHub-flavored Markdown
//!
//! Every reporter reads the values already stored in the summary. None of
//! them recompute a score, a gate or a level.

mod artifacts;
mod json;
mod markdown;
mod text;

pub use artifacts::{slugify, write_artifacts};

use crate::models::ScanSummary;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Number of fix-first items shown per repository
pub const FIX_FIRST_LIMIT: usize = 7;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" | "terminal" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: table, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render a scan summary in the given format.
///
/// `color` only affects the table format.
pub fn render(summary: &ScanSummary, format: OutputFormat, color: bool) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(text::render(summary, color)),
        OutputFormat::Json => json::render(summary),
        OutputFormat::Markdown => Ok(markdown::render(summary)),
    }
}

/// Parse a summary previously written by the JSON reporter
pub fn load_summary(content: &str) -> Result<ScanSummary> {
    json::parse(content)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{DomainScore, FixItem, GateResult, Grade, Outcome, RemediationItem, ScanReport};
    use chrono::Local;
    use std::collections::BTreeMap;

    fn domain_score(name: &str, score: f64, weight: f64, red_flags: &[&str]) -> DomainScore {
        DomainScore {
            name: name.into(),
            description: format!("{name} domain"),
            score,
            weight,
            weighted_score: score * weight,
            checks: vec![],
            passed_checks: 1,
            total_checks: 1 + red_flags.len(),
            evidence: vec![],
            red_flags: red_flags.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A two-check report at level 2 with a failing level-3 gate
    pub(crate) fn test_report() -> ScanReport {
        let checks = BTreeMap::from([
            ("readme_exists".to_string(), Outcome::passed("Found README.md")),
            (
                "ci_workflow_present".to_string(),
                Outcome::failed(
                    "No CI workflow configuration found",
                    "Add CI configuration (e.g., .github/workflows/ci.yml for GitHub Actions).",
                ),
            ),
            ("gitignore_present".to_string(), Outcome::skipped("Ignored by configuration")),
        ]);
        let gates = BTreeMap::from([
            (
                2,
                GateResult {
                    passed: true,
                    required_checks: vec!["readme_exists".into()],
                    failing_checks: vec![],
                },
            ),
            (
                3,
                GateResult {
                    passed: false,
                    required_checks: vec!["ci_workflow_present".into()],
                    failing_checks: vec!["ci_workflow_present".into()],
                },
            ),
            (4, GateResult { passed: true, ..Default::default() }),
            (5, GateResult { passed: true, ..Default::default() }),
        ]);
        ScanReport {
            repo_name: "demo".into(),
            repo_path: "/work/demo".into(),
            scanned_at: Local::now(),
            total_score: 14.0,
            max_score: 16.0,
            category_scores: BTreeMap::from([
                ("ci_enforcement".to_string(), 0.0),
                ("discoverability".to_string(), 2.0),
            ]),
            pillar_scores: BTreeMap::from([
                ("distribution_dx".to_string(), 1.0),
                ("verification_trust".to_string(), 0.0),
            ]),
            gates,
            maturity_level: 2,
            maturity_name: "Documented".into(),
            fix_first: vec![FixItem {
                name: "ci_workflow_present".into(),
                suggestion: "Add CI configuration (e.g., .github/workflows/ci.yml for GitHub Actions).".into(),
            }],
            domain_scores: BTreeMap::from([
                ("structure".to_string(), domain_score("structure", 100.0, 0.15, &[])),
                (
                    "testing".to_string(),
                    domain_score("testing", 50.0, 0.15, &["Add CI configuration."]),
                ),
            ]),
            overall_score: 80.0,
            grade: Grade::AgentCompatible,
            grade_description: Grade::AgentCompatible.description().into(),
            remediation: vec![RemediationItem {
                domain: "testing".into(),
                name: "ci_workflow_present".into(),
                suggestion: "Add CI configuration.".into(),
            }],
            checks,
        }
    }

    pub(crate) fn test_summary() -> ScanSummary {
        ScanSummary::from_reports(vec![test_report()], Some("/work/.ara.toml".into()))
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("table").unwrap(), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("md").unwrap(), OutputFormat::Markdown);
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_format_display_round_trips() {
        for format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Markdown] {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_render_every_format() {
        let summary = test_summary();
        for format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Markdown] {
            let out = render(&summary, format, false).unwrap();
            assert!(out.contains("demo"), "{format} output lacks repo name");
        }
    }
}
