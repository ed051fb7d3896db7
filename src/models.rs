//! Core data models for ARA
//!
//! Outcomes, the closed category/pillar/domain vocabularies, and the
//! report objects handed to renderers. Everything here is plain data; scoring
//! lives in [`crate::scoring`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Ceiling of the legacy points scale (8 categories x 2 points)
pub const MAX_SCORE: f64 = 16.0;

/// Substituted when a check returns a scored status without evidence
pub const MISSING_EVIDENCE: &str = "Check completed without reporting evidence";

/// Substituted when a check fails without telling the user what to do
pub const MISSING_SUGGESTION: &str = "Review the evidence for this check and close the gap";

/// Status of one check in one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Partial,
    Failed,
    Unknown,
    Skipped,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Passed,
        Status::Partial,
        Status::Failed,
        Status::Unknown,
        Status::Skipped,
    ];

    /// Numeric contribution to weighted scores.
    ///
    /// `None` means the outcome is excluded from both numerator and
    /// denominator (UNKNOWN and SKIPPED neither credit nor penalize).
    pub fn contribution(&self) -> Option<f64> {
        match self {
            Status::Passed => Some(1.0),
            Status::Partial => Some(0.5),
            Status::Failed => Some(0.0),
            Status::Unknown | Status::Skipped => None,
        }
    }

    /// Whether this status carries a score contribution
    pub fn is_scored(&self) -> bool {
        self.contribution().is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Partial => "partial",
            Status::Failed => "failed",
            Status::Unknown => "unknown",
            Status::Skipped => "skipped",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Unknown status '{}'", s))
    }
}

/// How much a heuristic check trusts its own verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// The result every check produces, once per scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: Status,
    #[serde(default)]
    pub evidence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl Outcome {
    pub fn passed(evidence: impl Into<String>) -> Self {
        Self {
            status: Status::Passed,
            evidence: evidence.into(),
            suggestion: None,
            confidence: None,
        }
    }

    pub fn partial(evidence: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            status: Status::Partial,
            evidence: evidence.into(),
            suggestion: Some(suggestion.into()),
            confidence: None,
        }
    }

    pub fn failed(evidence: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            evidence: evidence.into(),
            suggestion: Some(suggestion.into()),
            confidence: None,
        }
    }

    /// Indeterminate result. Faults carry no suggestion of their own.
    pub fn unknown(evidence: impl Into<String>) -> Self {
        Self {
            status: Status::Unknown,
            evidence: evidence.into(),
            suggestion: None,
            confidence: None,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: Status::Skipped,
            evidence: reason.into(),
            suggestion: None,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Repair contract violations instead of rejecting them.
    ///
    /// Scored statuses get generic evidence when empty, and FAILED/PARTIAL
    /// get a generic suggestion when none was given. Blank suggestions on
    /// PASSED/SKIPPED are dropped.
    pub fn normalized(mut self) -> Self {
        if self.status.is_scored() && self.evidence.trim().is_empty() {
            self.evidence = MISSING_EVIDENCE.to_string();
        }
        let blank_suggestion = self
            .suggestion
            .as_deref()
            .map_or(true, |s| s.trim().is_empty());
        match self.status {
            Status::Failed | Status::Partial if blank_suggestion => {
                self.suggestion = Some(MISSING_SUGGESTION.to_string());
            }
            _ if blank_suggestion => self.suggestion = None,
            _ => {}
        }
        self
    }
}

/// Coarse, points-bearing grouping used for the 0-16 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Discoverability,
    DeterministicSetup,
    BuildAndRun,
    TestFeedbackLoop,
    StaticGuardrails,
    Observability,
    CiEnforcement,
    SecurityAndGovernance,
}

impl Category {
    /// Display order for every report
    pub const ALL: [Category; 8] = [
        Category::Discoverability,
        Category::DeterministicSetup,
        Category::BuildAndRun,
        Category::TestFeedbackLoop,
        Category::StaticGuardrails,
        Category::Observability,
        Category::CiEnforcement,
        Category::SecurityAndGovernance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Discoverability => "discoverability",
            Category::DeterministicSetup => "deterministic_setup",
            Category::BuildAndRun => "build_and_run",
            Category::TestFeedbackLoop => "test_feedback_loop",
            Category::StaticGuardrails => "static_guardrails",
            Category::Observability => "observability",
            Category::CiEnforcement => "ci_enforcement",
            Category::SecurityAndGovernance => "security_and_governance",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Discoverability => "README presence and basic onboarding clarity",
            Category::DeterministicSetup => "Reproducible dependency setup and pinning",
            Category::BuildAndRun => "Standard commands exist for build/test/lint/format",
            Category::TestFeedbackLoop => "Tests exist and are runnable with reasonable defaults",
            Category::StaticGuardrails => "Linters, formatters and types reduce ambiguity",
            Category::Observability => "Logging and tracing help validate behavior changes",
            Category::CiEnforcement => "CI exists and validates changes",
            Category::SecurityAndGovernance => "Baseline hygiene around secrets and policy",
        }
    }

    /// Points ceiling on the legacy scale
    pub fn max_points(&self) -> f64 {
        2.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown category '{}'", s))
    }
}

/// Fine-grained capability grouping. Pillars carry no point ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    EnvironmentDeterminism,
    FastGuardrails,
    TypeContracts,
    VerificationTrust,
    VerificationSpeed,
    DocumentationStructure,
    InlineDocumentation,
    ContributionContract,
    AgenticSecurity,
    SecretHygiene,
    TelemetryTracing,
    StructuredLoggingCost,
    EvalFrameworks,
    GoldenDatasets,
    DistributionDx,
}

impl Pillar {
    pub const ALL: [Pillar; 15] = [
        Pillar::EnvironmentDeterminism,
        Pillar::FastGuardrails,
        Pillar::TypeContracts,
        Pillar::VerificationTrust,
        Pillar::VerificationSpeed,
        Pillar::DocumentationStructure,
        Pillar::InlineDocumentation,
        Pillar::ContributionContract,
        Pillar::AgenticSecurity,
        Pillar::SecretHygiene,
        Pillar::TelemetryTracing,
        Pillar::StructuredLoggingCost,
        Pillar::EvalFrameworks,
        Pillar::GoldenDatasets,
        Pillar::DistributionDx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pillar::EnvironmentDeterminism => "environment_determinism",
            Pillar::FastGuardrails => "fast_guardrails",
            Pillar::TypeContracts => "type_contracts",
            Pillar::VerificationTrust => "verification_trust",
            Pillar::VerificationSpeed => "verification_speed",
            Pillar::DocumentationStructure => "documentation_structure",
            Pillar::InlineDocumentation => "inline_documentation",
            Pillar::ContributionContract => "contribution_contract",
            Pillar::AgenticSecurity => "agentic_security",
            Pillar::SecretHygiene => "secret_hygiene",
            Pillar::TelemetryTracing => "telemetry_tracing",
            Pillar::StructuredLoggingCost => "structured_logging_cost",
            Pillar::EvalFrameworks => "eval_frameworks",
            Pillar::GoldenDatasets => "golden_datasets",
            Pillar::DistributionDx => "distribution_dx",
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pillar {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pillar::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown pillar '{}'", s))
    }
}

impl Pillar {
    /// Domain a check lands in when its descriptor names none
    pub fn domain(&self) -> Domain {
        match self {
            Pillar::DocumentationStructure | Pillar::DistributionDx => Domain::Structure,
            Pillar::TypeContracts | Pillar::InlineDocumentation => Domain::Interfaces,
            Pillar::EnvironmentDeterminism => Domain::Determinism,
            Pillar::AgenticSecurity | Pillar::SecretHygiene => Domain::Security,
            Pillar::VerificationTrust
            | Pillar::VerificationSpeed
            | Pillar::EvalFrameworks
            | Pillar::GoldenDatasets => Domain::Testing,
            Pillar::FastGuardrails
            | Pillar::ContributionContract
            | Pillar::TelemetryTracing
            | Pillar::StructuredLoggingCost => Domain::Ergonomics,
        }
    }
}

/// Weighted readiness domain. Domain weights sum to 1.0 and drive the
/// 0-100 overall score and the grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Structure,
    Interfaces,
    Determinism,
    Security,
    Testing,
    Ergonomics,
}

impl Domain {
    /// Display order for every report
    pub const ALL: [Domain; 6] = [
        Domain::Structure,
        Domain::Interfaces,
        Domain::Determinism,
        Domain::Security,
        Domain::Testing,
        Domain::Ergonomics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Structure => "structure",
            Domain::Interfaces => "interfaces",
            Domain::Determinism => "determinism",
            Domain::Security => "security",
            Domain::Testing => "testing",
            Domain::Ergonomics => "ergonomics",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Domain::Structure => "An agent can find its way around: purpose, layout and entry points",
            Domain::Interfaces => "Inputs, outputs and contracts are typed and machine-checkable",
            Domain::Determinism => "Setup and behavior are reproducible run to run",
            Domain::Security => "Secrets stay out of the tree and boundaries are explicit",
            Domain::Testing => "An agent can verify its own changes offline",
            Domain::Ergonomics => "Commands, configs and errors are easy for an agent to use",
        }
    }

    /// Share of the overall score
    pub fn weight(&self) -> f64 {
        match self {
            Domain::Structure => 0.15,
            Domain::Interfaces => 0.20,
            Domain::Determinism => 0.20,
            Domain::Security => 0.20,
            Domain::Testing => 0.15,
            Domain::Ergonomics => 0.10,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown domain '{}'", s))
    }
}

/// Agent-compatibility grade derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "Agent-First")]
    AgentFirst,
    #[serde(rename = "Agent-Compatible")]
    AgentCompatible,
    #[serde(rename = "Human-First, Agent-Risky")]
    HumanFirstAgentRisky,
    #[serde(rename = "Agent-Hostile")]
    AgentHostile,
}

impl Grade {
    pub const ALL: [Grade; 4] = [
        Grade::AgentFirst,
        Grade::AgentCompatible,
        Grade::HumanFirstAgentRisky,
        Grade::AgentHostile,
    ];

    /// Grade for an overall score on the 0-100 scale
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::AgentFirst
        } else if score >= 75.0 {
            Grade::AgentCompatible
        } else if score >= 60.0 {
            Grade::HumanFirstAgentRisky
        } else {
            Grade::AgentHostile
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::AgentFirst => "Agent-First",
            Grade::AgentCompatible => "Agent-Compatible",
            Grade::HumanFirstAgentRisky => "Human-First, Agent-Risky",
            Grade::AgentHostile => "Agent-Hostile",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Grade::AgentFirst => {
                "Optimized for autonomous agents: agents can work here with little supervision"
            }
            Grade::AgentCompatible => {
                "Agents can work effectively here with minor friction"
            }
            Grade::HumanFirstAgentRisky => {
                "Built for humans; agents run a real risk of mistakes without human review"
            }
            Grade::AgentHostile => {
                "Unsuitable for agents: missing structure and guardrails make autonomous work hostile"
            }
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score for one domain on the 0-100 scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub name: String,
    pub description: String,
    /// Weighted pass ratio x 100; 0 when nothing in the domain was scored
    pub score: f64,
    pub weight: f64,
    /// `score x weight`
    pub weighted_score: f64,
    /// Checks planned into this domain, in registry order
    #[serde(default)]
    pub checks: Vec<String>,
    pub passed_checks: usize,
    /// Outcomes that carried a score (UNKNOWN and SKIPPED excluded)
    pub total_checks: usize,
    /// Evidence of the passing checks
    #[serde(default)]
    pub evidence: Vec<String>,
    /// Suggestions of the failing and partial checks
    #[serde(default)]
    pub red_flags: Vec<String>,
}

/// One entry of the domain-ordered remediation list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationItem {
    pub domain: String,
    pub name: String,
    pub suggestion: String,
}

/// Gate verdict for one maturity level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GateResult {
    pub passed: bool,
    /// Checks the level requires, in registry order
    #[serde(default)]
    pub required_checks: Vec<String>,
    /// Required checks without a PASSED outcome, in registry order
    #[serde(default)]
    pub failing_checks: Vec<String>,
}

/// One entry of the fix-first list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixItem {
    pub name: String,
    pub suggestion: String,
}

/// Audit result for a single repository.
///
/// Built once by the scanner and never mutated afterwards. Renderers read
/// these values as-is and must not recompute scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(default)]
    pub repo_name: String,
    #[serde(default)]
    pub repo_path: String,
    pub scanned_at: DateTime<Local>,
    pub total_score: f64,
    pub max_score: f64,
    /// Category name -> points in [0, category max]
    pub category_scores: BTreeMap<String, f64>,
    /// Pillar name -> fraction in [0, 1]
    pub pillar_scores: BTreeMap<String, f64>,
    /// Maturity level (2..=5) -> gate verdict
    pub gates: BTreeMap<u8, GateResult>,
    pub maturity_level: u8,
    pub maturity_name: String,
    pub fix_first: Vec<FixItem>,
    /// Domain name -> score on the 0-100 scale
    #[serde(default)]
    pub domain_scores: BTreeMap<String, DomainScore>,
    /// Weighted domain average on the 0-100 scale
    #[serde(default)]
    pub overall_score: f64,
    pub grade: Grade,
    #[serde(default)]
    pub grade_description: String,
    /// Fixes grouped by domain, heaviest domain first
    #[serde(default)]
    pub remediation: Vec<RemediationItem>,
    /// Check name -> outcome
    pub checks: BTreeMap<String, Outcome>,
}

impl ScanReport {
    /// Names of checks with the given status, alphabetically
    pub fn checks_with_status(&self, status: Status) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|(_, outcome)| outcome.status == status)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Count of outcomes per status
    pub fn status_counts(&self) -> BTreeMap<Status, usize> {
        let mut counts = BTreeMap::new();
        for outcome in self.checks.values() {
            *counts.entry(outcome.status).or_insert(0) += 1;
        }
        counts
    }
}

/// Results across every repository of one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub generated_at: DateTime<Local>,
    #[serde(default)]
    pub config_source: Option<String>,
    pub total_repos: usize,
    pub average_score: f64,
    /// Maturity name -> number of repos at that level
    #[serde(default)]
    pub level_distribution: BTreeMap<String, usize>,
    #[serde(default)]
    pub average_overall_score: f64,
    /// Grade name -> number of repos with that grade
    #[serde(default)]
    pub grade_distribution: BTreeMap<String, usize>,
    pub repos: Vec<ScanReport>,
}

impl ScanSummary {
    pub fn from_reports(repos: Vec<ScanReport>, config_source: Option<String>) -> Self {
        let total_repos = repos.len();
        let mean = |value: fn(&ScanReport) -> f64| {
            if total_repos == 0 {
                0.0
            } else {
                repos.iter().map(value).sum::<f64>() / total_repos as f64
            }
        };
        let average_score = mean(|r| r.total_score);
        let average_overall_score = mean(|r| r.overall_score);

        let mut level_distribution = BTreeMap::new();
        let mut grade_distribution = BTreeMap::new();
        for repo in &repos {
            *level_distribution
                .entry(repo.maturity_name.clone())
                .or_insert(0) += 1;
            *grade_distribution
                .entry(repo.grade.as_str().to_string())
                .or_insert(0) += 1;
        }

        Self {
            generated_at: Local::now(),
            config_source,
            total_repos,
            average_score,
            level_distribution,
            average_overall_score,
            grade_distribution,
            repos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_contribution() {
        assert_eq!(Status::Passed.contribution(), Some(1.0));
        assert_eq!(Status::Partial.contribution(), Some(0.5));
        assert_eq!(Status::Failed.contribution(), Some(0.0));
        assert_eq!(Status::Unknown.contribution(), None);
        assert_eq!(Status::Skipped.contribution(), None);
    }

    #[test]
    fn test_status_wire_mapping() {
        for status in Status::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        assert_eq!("PASSED".parse::<Status>().unwrap(), Status::Passed);
        assert!("green".parse::<Status>().is_err());
    }

    #[test]
    fn test_normalize_fills_missing_evidence() {
        let outcome = Outcome::passed("   ").normalized();
        assert_eq!(outcome.evidence, MISSING_EVIDENCE);
        assert!(outcome.suggestion.is_none());
    }

    #[test]
    fn test_normalize_fills_missing_suggestion() {
        let mut outcome = Outcome::failed("no README", "");
        outcome = outcome.normalized();
        assert_eq!(outcome.suggestion.as_deref(), Some(MISSING_SUGGESTION));

        let mut partial = Outcome::partial("half there", "x");
        partial.suggestion = None;
        assert_eq!(
            partial.normalized().suggestion.as_deref(),
            Some(MISSING_SUGGESTION)
        );
    }

    #[test]
    fn test_normalize_keeps_unknown_and_skipped_evidence() {
        let skipped = Outcome::skipped("").normalized();
        assert_eq!(skipped.evidence, "");
        let unknown = Outcome::unknown("boom").normalized();
        assert_eq!(unknown.evidence, "boom");
        assert!(unknown.suggestion.is_none());
    }

    #[test]
    fn test_vocabularies_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        for pillar in Pillar::ALL {
            assert_eq!(pillar.as_str().parse::<Pillar>().unwrap(), pillar);
        }
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), domain);
        }
        assert!("docs".parse::<Category>().is_err());
        assert!("speed".parse::<Pillar>().is_err());
        assert!("style".parse::<Domain>().is_err());
    }

    #[test]
    fn test_domain_weights_sum_to_one() {
        let total: f64 = Domain::ALL.iter().map(|d| d.weight()).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(Domain::Interfaces.weight(), 0.20);
        assert_eq!(Domain::Ergonomics.weight(), 0.10);
    }

    #[test]
    fn test_every_domain_reachable_from_a_pillar() {
        for domain in Domain::ALL {
            assert!(
                Pillar::ALL.iter().any(|p| p.domain() == domain),
                "no pillar maps to {domain}"
            );
        }
        assert_eq!(Pillar::SecretHygiene.domain(), Domain::Security);
        assert_eq!(Pillar::DistributionDx.domain(), Domain::Structure);
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(100.0), Grade::AgentFirst);
        assert_eq!(Grade::from_score(90.0), Grade::AgentFirst);
        assert_eq!(Grade::from_score(89.9), Grade::AgentCompatible);
        assert_eq!(Grade::from_score(75.0), Grade::AgentCompatible);
        assert_eq!(Grade::from_score(74.9), Grade::HumanFirstAgentRisky);
        assert_eq!(Grade::from_score(60.0), Grade::HumanFirstAgentRisky);
        assert_eq!(Grade::from_score(59.9), Grade::AgentHostile);
        assert_eq!(Grade::from_score(0.0), Grade::AgentHostile);
    }

    #[test]
    fn test_grade_wire_names() {
        for grade in Grade::ALL {
            let json = serde_json::to_string(&grade).unwrap();
            assert_eq!(json, format!("\"{}\"", grade.as_str()));
            assert!(!grade.description().is_empty());
        }
    }

    #[test]
    fn test_category_points_sum_to_scale() {
        let total: f64 = Category::ALL.iter().map(|c| c.max_points()).sum();
        assert_eq!(total, MAX_SCORE);
    }

    #[test]
    fn test_outcome_json_omits_empty_optionals() {
        let json = serde_json::to_value(Outcome::passed("found README.md")).unwrap();
        assert_eq!(json["status"], "passed");
        assert!(json.get("suggestion").is_none());
        assert!(json.get("confidence").is_none());

        let json = serde_json::to_value(
            Outcome::failed("nope", "add one").with_confidence(Confidence::Medium),
        )
        .unwrap();
        assert_eq!(json["suggestion"], "add one");
        assert_eq!(json["confidence"], "medium");
    }
}
