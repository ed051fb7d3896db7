//! Report files written by `ara scan --out DIR`

use crate::models::ScanSummary;
use crate::reporters::{json, markdown};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

fn slug_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"))
}

/// File-name-safe form of a repository name
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let slug = slug_regex().replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "repo".to_string()
    } else {
        slug.to_string()
    }
}

/// File stems written once per output directory
const SUMMARY_STEM: &str = "summary";

const REMEDIATION_SUFFIX: &str = "-remediation";

/// Pick the first free stem for a repository, counting up from `-2`.
/// A stem claims itself and its remediation file name.
fn claim_stem(base: &str, taken: &mut BTreeSet<String>) -> String {
    let mut n = 1;
    loop {
        let candidate = if n == 1 {
            base.to_string()
        } else {
            format!("{base}-{n}")
        };
        let remediation = format!("{candidate}{REMEDIATION_SUFFIX}");
        if !taken.contains(&candidate) && !taken.contains(&remediation) {
            taken.insert(candidate.clone());
            taken.insert(remediation);
            return candidate;
        }
        n += 1;
    }
}

fn write(path: PathBuf, content: &str, written: &mut Vec<PathBuf>) -> Result<()> {
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    written.push(path);
    Ok(())
}

/// Write summary and per-repository reports into `dir`.
///
/// Produces `summary.json`, `summary.md` and, per repository,
/// `<slug>.json`, `<slug>.md` and `<slug>-remediation.md`. A repository
/// whose slug is already in use (by another repository or by the summary
/// files) gets a numeric suffix. Returns the paths written.
pub fn write_artifacts(summary: &ScanSummary, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    write(dir.join(format!("{SUMMARY_STEM}.json")), &json::render(summary)?, &mut written)?;
    write(dir.join(format!("{SUMMARY_STEM}.md")), &markdown::render(summary), &mut written)?;

    let mut taken = BTreeSet::from([SUMMARY_STEM.to_string()]);
    for report in &summary.repos {
        let slug = claim_stem(&slugify(&report.repo_name), &mut taken);

        let repo_json = serde_json::to_string_pretty(report)?;
        write(dir.join(format!("{slug}.json")), &repo_json, &mut written)?;
        write(dir.join(format!("{slug}.md")), &markdown::render_repo(report), &mut written)?;
        write(
            dir.join(format!("{slug}{REMEDIATION_SUFFIX}.md")),
            &markdown::render_remediation(report),
            &mut written,
        )?;
    }

    info!("Wrote {} report file(s) to {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My Service"), "my-service");
        assert_eq!(slugify("api_v2.core"), "api-v2-core");
        assert_eq!(slugify("--weird--"), "weird");
        assert_eq!(slugify("***"), "repo");
    }

    #[test]
    fn test_write_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let summary = ScanSummary::from_reports(vec![test_report(), test_report()], None);
        let written = write_artifacts(&summary, &out).unwrap();

        assert_eq!(written.len(), 8);
        for name in [
            "summary.json",
            "summary.md",
            "demo.json",
            "demo.md",
            "demo-remediation.md",
            "demo-2.json",
        ] {
            assert!(out.join(name).is_file(), "missing {name}");
        }
        let repo: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("demo.json")).unwrap()).unwrap();
        assert_eq!(repo["maturity_name"], "Documented");
    }

    #[test]
    fn test_repo_named_summary_keeps_summary_intact() {
        let dir = tempfile::tempdir().unwrap();
        let mut clash = test_report();
        clash.repo_name = "Summary".to_string();
        let summary = ScanSummary::from_reports(vec![clash, test_report()], None);
        let written = write_artifacts(&summary, dir.path()).unwrap();
        assert_eq!(written.len(), 8);

        let content = std::fs::read_to_string(dir.path().join("summary.json")).unwrap();
        let loaded = crate::reporters::load_summary(&content).unwrap();
        assert_eq!(loaded.total_repos, 2);
        assert!(dir.path().join("summary-2.json").is_file());
        assert!(dir.path().join("summary-2-remediation.md").is_file());
        assert!(dir.path().join("demo.json").is_file());
    }

    #[test]
    fn test_stems_never_collide_with_remediation_files() {
        let mut taken = BTreeSet::from([SUMMARY_STEM.to_string()]);
        assert_eq!(claim_stem("demo", &mut taken), "demo");
        assert_eq!(claim_stem("demo-remediation", &mut taken), "demo-remediation-2");
        assert_eq!(claim_stem("demo", &mut taken), "demo-2");
        assert_eq!(claim_stem("demo-2", &mut taken), "demo-2-2");
    }
}
