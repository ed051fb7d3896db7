//! Text (terminal) reporter with colors and formatting

use crate::models::{Category, Domain, ScanReport, ScanSummary, Status};
use crate::reporters::FIX_FIRST_LIMIT;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RED: &str = "\x1b[31m";
const GRAY: &str = "\x1b[90m";

/// Escape codes, or nothing when color is off
struct Palette {
    enabled: bool,
}

impl Palette {
    fn paint(&self, code: &str, text: impl std::fmt::Display) -> String {
        if self.enabled {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

fn status_color(status: Status) -> &'static str {
    match status {
        Status::Passed => GREEN,
        Status::Partial => YELLOW,
        Status::Failed => RED,
        Status::Unknown | Status::Skipped => GRAY,
    }
}

fn status_tag(status: Status) -> &'static str {
    match status {
        Status::Passed => "[PASS]",
        Status::Partial => "[PART]",
        Status::Failed => "[FAIL]",
        Status::Unknown => "[ ?? ]",
        Status::Skipped => "[SKIP]",
    }
}

/// Render summary as formatted terminal output
pub fn render(summary: &ScanSummary, color: bool) -> String {
    let p = Palette { enabled: color };
    let mut out = String::new();

    for report in &summary.repos {
        render_repo(&mut out, report, &p);
    }

    if summary.total_repos > 1 {
        out.push_str(&format!("{}\n", p.paint(BOLD, "SUMMARY")));
        out.push_str(&format!(
            "  Repositories: {}  Average score: {:.1}/16\n",
            summary.total_repos, summary.average_score
        ));
        for (level, count) in &summary.level_distribution {
            out.push_str(&format!("  {:<14} {}\n", level, count));
        }
        out.push_str(&format!(
            "  Average overall score: {}\n",
            p.paint(
                overall_color(summary.average_overall_score),
                format!("{:.1}/100", summary.average_overall_score)
            )
        ));
        for (grade, count) in &summary.grade_distribution {
            out.push_str(&format!("  {:<26} {}\n", grade, count));
        }
        out.push('\n');
    }
    if summary.repos.is_empty() {
        out.push_str("No repositories scanned.\n");
    }
    out
}

fn render_repo(out: &mut String, report: &ScanReport, p: &Palette) {
    out.push_str(&format!("\n{}\n", p.paint(BOLD, format!("ARA: {}", report.repo_name))));
    out.push_str(&format!("{}\n", p.paint(DIM, &report.repo_path)));
    out.push_str(&format!(
        "{}\n",
        p.paint(DIM, "──────────────────────────────────────")
    ));
    out.push_str(&format!(
        "Score: {}  Level: {}\n\n",
        p.paint(BOLD, format!("{:.1}/{:.0}", report.total_score, report.max_score)),
        p.paint(BOLD, format!("{} ({})", report.maturity_level, report.maturity_name))
    ));
    out.push_str(&format!(
        "Overall: {}  Grade: {}\n",
        p.paint(
            overall_color(report.overall_score),
            format!("{:.1}/100", report.overall_score)
        ),
        p.paint(BOLD, report.grade)
    ));
    if !report.grade_description.is_empty() {
        out.push_str(&format!("{}\n", p.paint(DIM, &report.grade_description)));
    }
    out.push('\n');

    if !report.domain_scores.is_empty() {
        out.push_str(&format!("{}\n", p.paint(BOLD, "DOMAINS")));
        for domain in Domain::ALL {
            if let Some(ds) = report.domain_scores.get(domain.as_str()) {
                out.push_str(&format!(
                    "  {:<26} {}  {}\n",
                    ds.name,
                    p.paint(overall_color(ds.score), format!("{:>5.1}%", ds.score)),
                    p.paint(DIM, format!("weight {:.0}%", ds.weight * 100.0))
                ));
            }
        }
        out.push('\n');
    }

    out.push_str(&format!("{}\n", p.paint(BOLD, "CATEGORIES")));
    for category in Category::ALL {
        if let Some(score) = report.category_scores.get(category.as_str()) {
            out.push_str(&format!(
                "  {:<26} {}\n",
                category.as_str(),
                format_points(*score, category.max_points(), p)
            ));
        }
    }
    out.push('\n');

    if !report.pillar_scores.is_empty() {
        out.push_str(&format!("{}\n", p.paint(BOLD, "PILLARS")));
        for (name, fraction) in &report.pillar_scores {
            out.push_str(&format!("  {:<26} {:>3.0}%\n", name, fraction * 100.0));
        }
        out.push('\n');
    }

    out.push_str(&format!("{}\n", p.paint(BOLD, "GATES")));
    for (level, gate) in &report.gates {
        let verdict = if gate.passed {
            p.paint(GREEN, "pass")
        } else {
            p.paint(RED, "fail")
        };
        out.push_str(&format!("  Level {}  {}", level, verdict));
        if !gate.failing_checks.is_empty() {
            out.push_str(&format!(
                "  {}",
                p.paint(DIM, format!("missing: {}", gate.failing_checks.join(", ")))
            ));
        }
        out.push('\n');
    }
    out.push('\n');

    out.push_str(&format!("{}\n", p.paint(BOLD, "CHECKS")));
    for (name, outcome) in &report.checks {
        // Evidence is single-line by construction, but keep the table tidy
        let evidence: String = outcome.evidence.chars().take(60).collect();
        out.push_str(&format!(
            "  {}  {:<40} {}\n",
            p.paint(status_color(outcome.status), status_tag(outcome.status)),
            name,
            p.paint(DIM, evidence)
        ));
    }
    out.push('\n');

    if !report.fix_first.is_empty() {
        out.push_str(&format!("{}\n", p.paint(BOLD, "FIX FIRST")));
        for (i, item) in report.fix_first.iter().take(FIX_FIRST_LIMIT).enumerate() {
            out.push_str(&format!("  {:>2}. {}\n", i + 1, item.name));
            out.push_str(&format!("      {}\n", p.paint(DIM, &item.suggestion)));
        }
        let remaining = report.fix_first.len().saturating_sub(FIX_FIRST_LIMIT);
        if remaining > 0 {
            out.push_str(&format!(
                "  {}\n",
                p.paint(DIM, format!("...and {} more (see --format markdown)", remaining))
            ));
        }
        out.push('\n');
    }
}

fn format_points(score: f64, max: f64, p: &Palette) -> String {
    let ratio = if max > 0.0 { score / max } else { 0.0 };
    let color = if ratio >= 0.75 {
        GREEN
    } else if ratio >= 0.5 {
        YELLOW
    } else {
        RED
    };
    p.paint(color, format!("{:.1}/{:.0}", score, max))
}

/// Color for a 0-100 score, on the grade boundaries
fn overall_color(score: f64) -> &'static str {
    if score >= 90.0 {
        GREEN
    } else if score >= 75.0 {
        CYAN
    } else if score >= 60.0 {
        YELLOW
    } else {
        RED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FixItem, ScanSummary};
    use crate::reporters::tests::{test_report, test_summary};

    #[test]
    fn test_plain_output_has_no_escapes() {
        let out = render(&test_summary(), false);
        assert!(!out.contains('\x1b'));
        assert!(out.contains("Score: 14.0/16"));
        assert!(out.contains("Level: 2 (Documented)"));
        assert!(out.contains("missing: ci_workflow_present"));
        assert!(out.contains("[SKIP]  gitignore_present"));
        assert!(out.contains("Overall: 80.0/100  Grade: Agent-Compatible"));
        assert!(out.contains("DOMAINS"));
    }

    #[test]
    fn test_sections_follow_display_order() {
        let out = render(&test_summary(), false);
        let discoverability = out.find("discoverability").unwrap();
        let ci = out.find("ci_enforcement").unwrap();
        assert!(discoverability < ci);
        assert!(out.contains("0.0/2"));
        let structure = out.find("structure ").unwrap();
        let testing = out.find("testing ").unwrap();
        assert!(structure < testing);
        assert!(out.contains(" 50.0%  weight 15%"));
    }

    #[test]
    fn test_overall_colors_track_grades() {
        assert_eq!(overall_color(95.0), GREEN);
        assert_eq!(overall_color(80.0), CYAN);
        assert_eq!(overall_color(60.0), YELLOW);
        assert_eq!(overall_color(59.9), RED);
    }

    #[test]
    fn test_colored_output() {
        let out = render(&test_summary(), true);
        assert!(out.contains(GREEN));
        assert!(out.contains(RED));
    }

    #[test]
    fn test_fix_first_is_capped() {
        let mut report = test_report();
        report.fix_first = (0..10)
            .map(|i| FixItem {
                name: format!("check_{i}"),
                suggestion: "do it".into(),
            })
            .collect();
        let out = render(&ScanSummary::from_reports(vec![report], None), false);
        assert!(out.contains("check_6"));
        assert!(!out.contains("check_7"));
        assert!(out.contains("...and 3 more"));
    }

    #[test]
    fn test_multi_repo_summary() {
        let mut second = test_report();
        second.repo_name = "other".into();
        let summary = ScanSummary::from_reports(vec![test_report(), second], None);
        let out = render(&summary, false);
        assert!(out.contains("Repositories: 2"));
        assert!(out.contains("Documented"));
        assert!(out.contains("Average overall score: 80.0/100"));
        assert!(out.contains("Agent-Compatible"));
    }
}
