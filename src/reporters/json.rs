//! JSON reporter
//!
//! Outputs the full ScanSummary as pretty-printed JSON. The output is the
//! lossless form of the report: `ara report --input` reads it back.

use crate::models::ScanSummary;
use anyhow::{Context, Result};

/// Render summary as JSON
pub fn render(summary: &ScanSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Read a summary back from JSON
pub fn parse(content: &str) -> Result<ScanSummary> {
    serde_json::from_str(content).context("Input is not a valid ARA summary")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_summary;

    #[test]
    fn test_json_render_valid() {
        let json_str = render(&test_summary()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["total_repos"], 1);
        let repo = &parsed["repos"][0];
        assert_eq!(repo["maturity_level"], 2);
        assert_eq!(repo["checks"]["ci_workflow_present"]["status"], "failed");
        assert_eq!(repo["gates"]["3"]["failing_checks"][0], "ci_workflow_present");
    }

    #[test]
    fn test_json_reads_back() {
        let summary = test_summary();
        let restored = parse(&render(&summary).unwrap()).expect("parse summary");
        assert_eq!(restored.repos[0].checks, summary.repos[0].checks);
        assert_eq!(restored.repos[0].gates, summary.repos[0].gates);
        assert_eq!(restored.repos[0].fix_first, summary.repos[0].fix_first);
        assert_eq!(restored.average_score, summary.average_score);
    }

    #[test]
    fn test_rejects_foreign_json() {
        assert!(parse("{\"grade\": \"B\"}").is_err());
    }
}
