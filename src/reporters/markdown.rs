//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - Pull request comments
//! - Committed audit snapshots
//! - Per-repository remediation plans

use crate::models::{Category, Domain, ScanReport, ScanSummary, Status};
use crate::reporters::FIX_FIRST_LIMIT;

/// Red flags listed per domain in a remediation plan
const RED_FLAG_LIMIT: usize = 5;

/// Render the whole summary as GitHub-flavored Markdown
pub fn render(summary: &ScanSummary) -> String {
    let mut md = String::new();

    md.push_str(&render_header(summary));
    md.push('\n');

    if summary.total_repos > 1 {
        md.push_str(&render_overview(summary));
        md.push('\n');
    }

    for report in &summary.repos {
        md.push_str(&render_repo(report));
        md.push('\n');
    }

    md.push_str(&render_footer());
    md
}

fn render_header(summary: &ScanSummary) -> String {
    let config = summary
        .config_source
        .as_deref()
        .unwrap_or("built-in defaults");
    format!(
        r#"# Agent Readiness Audit

Generated: {}
Configuration: `{}`
"#,
        summary.generated_at.format("%Y-%m-%d %H:%M:%S"),
        config
    )
}

fn render_overview(summary: &ScanSummary) -> String {
    let mut md = String::from(
        "## Overview\n\n| Repository | Score | Level | Overall | Grade |\n|------------|-------|-------|---------|-------|\n",
    );
    for report in &summary.repos {
        md.push_str(&format!(
            "| {} | {:.1}/{:.0} | {} ({}) | {:.1}% | {} |\n",
            report.repo_name,
            report.total_score,
            report.max_score,
            report.maturity_level,
            report.maturity_name,
            report.overall_score,
            report.grade
        ));
    }
    md.push_str(&format!(
        "\n**Average score:** {:.1}/16 across {} repositories\n",
        summary.average_score, summary.total_repos
    ));
    md.push_str(&format!(
        "**Average Overall Score:** {:.1}%\n\n### Grade Distribution\n\n",
        summary.average_overall_score
    ));
    for (grade, count) in &summary.grade_distribution {
        md.push_str(&format!("- **{}**: {}\n", grade, count));
    }
    md
}

/// ✅ at Agent-Compatible or better, ⚠️ at Agent-Risky, ❌ below
fn domain_status(score: f64) -> &'static str {
    if score >= 75.0 {
        "✅"
    } else if score >= 60.0 {
        "⚠️"
    } else {
        "❌"
    }
}

/// Full section for one repository
pub fn render_repo(report: &ScanReport) -> String {
    let mut md = format!(
        r#"## {}

| Metric | Value |
|--------|-------|
| **Score** | {:.1}/{:.0} |
| **Maturity** | Level {} ({}) |
| **Overall Score** | {:.1}% |
| **Grade** | {} |
| **Path** | `{}` |

"#,
        report.repo_name,
        report.total_score,
        report.max_score,
        report.maturity_level,
        report.maturity_name,
        report.overall_score,
        report.grade,
        report.repo_path
    );
    if !report.grade_description.is_empty() {
        md.push_str(&format!("> {}\n\n", report.grade_description));
    }

    if !report.domain_scores.is_empty() {
        md.push_str(
            "### Domain Scores\n\n| Domain | Score | Weight | Weighted | Status |\n|--------|-------|--------|----------|--------|\n",
        );
        for domain in Domain::ALL {
            if let Some(ds) = report.domain_scores.get(domain.as_str()) {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.0}% | {:.1} | {} |\n",
                    ds.name,
                    ds.score,
                    ds.weight * 100.0,
                    ds.weighted_score,
                    domain_status(ds.score)
                ));
            }
        }
        md.push('\n');
    }

    md.push_str("### Category Scores\n\n| Category | Score |\n|----------|-------|\n");
    for category in Category::ALL {
        if let Some(score) = report.category_scores.get(category.as_str()) {
            md.push_str(&format!(
                "| {} | {:.1}/{:.0} |\n",
                category,
                score,
                category.max_points()
            ));
        }
    }
    md.push('\n');

    if !report.pillar_scores.is_empty() {
        md.push_str("### Pillars\n\n| Pillar | Score |\n|--------|-------|\n");
        for (name, fraction) in &report.pillar_scores {
            md.push_str(&format!("| {} | {:.0}% |\n", name, fraction * 100.0));
        }
        md.push('\n');
    }

    md.push_str("### Gates\n\n| Level | Status | Failing checks |\n|-------|--------|----------------|\n");
    for (level, gate) in &report.gates {
        let failing = if gate.failing_checks.is_empty() {
            "-".to_string()
        } else {
            gate.failing_checks
                .iter()
                .map(|c| format!("`{c}`"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            level,
            if gate.passed { "passed" } else { "failed" },
            failing
        ));
    }
    md.push('\n');

    md.push_str(&render_fix_first(report, FIX_FIRST_LIMIT));

    md.push_str("### Checks\n\n| Check | Status | Evidence |\n|-------|--------|----------|\n");
    for (name, outcome) in &report.checks {
        md.push_str(&format!(
            "| `{}` | {} | {} |\n",
            name,
            outcome.status,
            escape_cell(&outcome.evidence)
        ));
    }
    md
}

fn render_fix_first(report: &ScanReport, limit: usize) -> String {
    if report.fix_first.is_empty() {
        return String::new();
    }
    let mut md = String::from("### Fix First\n\n");
    for (i, item) in report.fix_first.iter().take(limit).enumerate() {
        md.push_str(&format!("{}. **{}**: {}\n", i + 1, item.name, item.suggestion));
    }
    md.push('\n');
    md
}

/// Remediation plan: every non-passing check, grouped by status
pub fn render_remediation(report: &ScanReport) -> String {
    let mut md = format!(
        "# Remediation plan: {}\n\nCurrent level: {} ({}), score {:.1}/{:.0}\n\n",
        report.repo_name,
        report.maturity_level,
        report.maturity_name,
        report.total_score,
        report.max_score
    );

    let next = report.maturity_level + 1;
    if let Some(gate) = report.gates.get(&next) {
        if gate.passed {
            md.push_str(&format!("The level {} gate already passes.\n\n", next));
        } else {
            md.push_str(&format!(
                "To unlock level {}, these checks must pass: {}\n\n",
                next,
                gate.failing_checks
                    .iter()
                    .map(|c| format!("`{c}`"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
    }

    md.push_str(&render_domain_breakdown(report));

    if report.fix_first.is_empty() {
        md.push_str("Nothing to fix.\n");
        return md;
    }

    md.push_str("## Ordered fixes\n\n");
    for (i, item) in report.fix_first.iter().enumerate() {
        let status = report
            .checks
            .get(&item.name)
            .map_or(Status::Unknown, |o| o.status);
        md.push_str(&format!(
            "{}. **{}** ({})\n   {}\n",
            i + 1,
            item.name,
            status,
            item.suggestion
        ));
        if let Some(outcome) = report.checks.get(&item.name) {
            md.push_str(&format!("   Evidence: {}\n", outcome.evidence));
        }
    }
    md
}

fn render_domain_breakdown(report: &ScanReport) -> String {
    let mut md = format!(
        "Overall score {:.1}% ({})\n\n",
        report.overall_score, report.grade
    );
    if !report.domain_scores.is_empty() {
        md.push_str("## Domain Breakdown\n\n");
        for domain in Domain::ALL {
            let Some(ds) = report.domain_scores.get(domain.as_str()) else {
                continue;
            };
            md.push_str(&format!(
                "### {} {} ({:.1}%)\n\n{}\n\n",
                domain_status(ds.score),
                ds.name,
                ds.score,
                ds.description
            ));
            for flag in ds.red_flags.iter().take(RED_FLAG_LIMIT) {
                md.push_str(&format!("- {}\n", flag));
            }
            if !ds.red_flags.is_empty() {
                md.push('\n');
            }
        }
    }

    md.push_str("## Remediation by domain\n\n");
    if report.remediation.is_empty() {
        md.push_str("No remediation items - repository is agent-ready!\n\n");
        return md;
    }
    for (i, item) in report.remediation.iter().enumerate() {
        md.push_str(&format!(
            "{}. [{}] **{}**: {}\n",
            i + 1,
            item.domain,
            item.name,
            item.suggestion
        ));
    }
    md.push('\n');
    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn render_footer() -> String {
    "---\n\n*Generated by ara*\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{test_report, test_summary};

    #[test]
    fn test_markdown_sections() {
        let md = render(&test_summary());
        assert!(md.starts_with("# Agent Readiness Audit"));
        assert!(md.contains("Configuration: `/work/.ara.toml`"));
        assert!(md.contains("## demo"));
        assert!(md.contains("| **Maturity** | Level 2 (Documented) |"));
        assert!(md.contains("| 3 | failed | `ci_workflow_present` |"));
        assert!(md.contains("1. **ci_workflow_present**"));
        assert!(!md.contains("## Overview"));
        assert!(md.contains("| **Overall Score** | 80.0% |"));
        assert!(md.contains("| **Grade** | Agent-Compatible |"));
        assert!(md.contains("> Agents can work effectively"));
        assert!(md.contains("| structure | 100.0% | 15% | 15.0 | ✅ |"));
        assert!(md.contains("| testing | 50.0% | 15% | 7.5 | ❌ |"));
    }

    #[test]
    fn test_categories_follow_display_order_with_their_ceiling() {
        let md = render_repo(&test_report());
        // Alphabetical order would put ci_enforcement first
        let discoverability = md.find("| discoverability | 2.0/2 |").unwrap();
        let ci = md.find("| ci_enforcement | 0.0/2 |").unwrap();
        assert!(discoverability < ci);
    }

    #[test]
    fn test_overview_reports_grades() {
        let mut second = test_report();
        second.repo_name = "other".into();
        second.overall_score = 40.0;
        second.grade = crate::models::Grade::AgentHostile;
        let md = render(&ScanSummary::from_reports(vec![test_report(), second], None));
        assert!(md.contains("## Overview"));
        assert!(md.contains("| other | 14.0/16 | 2 (Documented) | 40.0% | Agent-Hostile |"));
        assert!(md.contains("**Average Overall Score:** 60.0%"));
        assert!(md.contains("- **Agent-Compatible**: 1"));
        assert!(md.contains("- **Agent-Hostile**: 1"));
    }

    #[test]
    fn test_escapes_pipes_in_evidence() {
        let mut report = test_report();
        report
            .checks
            .get_mut("readme_exists")
            .unwrap()
            .evidence = "a | b".into();
        assert!(render_repo(&report).contains("a \\| b"));
    }

    #[test]
    fn test_remediation_plan() {
        let md = render_remediation(&test_report());
        assert!(md.contains("To unlock level 3"));
        assert!(md.contains("**ci_workflow_present** (failed)"));
        assert!(md.contains("Evidence: No CI workflow configuration found"));
        assert!(md.contains("## Domain Breakdown"));
        assert!(md.contains("### ❌ testing (50.0%)"));
        assert!(md.contains("1. [testing] **ci_workflow_present**: Add CI configuration."));
    }

    #[test]
    fn test_remediation_caps_red_flags_and_celebrates_empty_list() {
        let mut report = test_report();
        let testing = report.domain_scores.get_mut("testing").unwrap();
        testing.red_flags = (0..8).map(|i| format!("flag {i}")).collect();
        report.remediation.clear();
        let md = render_remediation(&report);
        assert!(md.contains("- flag 4"));
        assert!(!md.contains("- flag 5"));
        assert!(md.contains("No remediation items - repository is agent-ready!"));
    }
}
