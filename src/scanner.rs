//! Scan orchestration
//!
//! Glues the pieces together for one or many repositories:
//! plan checks -> run engine -> score -> build the immutable report.

use crate::checks::{
    CheckEngine, CheckEngineBuilder, CheckRegistry, ProgressCallback, RepoSnapshot,
};
use crate::config::ScanSettings;
use crate::models::{ScanReport, ScanSummary, MAX_SCORE};
use crate::scoring;
use anyhow::{bail, Context, Result};
use chrono::Local;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Runs the registry against repositories under one set of settings
pub struct Scanner {
    registry: CheckRegistry,
    settings: ScanSettings,
    engine: CheckEngine,
}

impl Scanner {
    pub fn new(registry: CheckRegistry, settings: ScanSettings) -> Self {
        let engine = engine_for(&settings, None);
        Self {
            registry,
            settings,
            engine,
        }
    }

    /// Report each finished check as (name, completed, total)
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.engine = engine_for(&self.settings, Some(callback));
        self
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Audit a single repository
    pub fn scan_repo(&self, path: &Path) -> Result<ScanReport> {
        if !path.is_dir() {
            bail!("Repository path is not a directory: {}", path.display());
        }
        let root = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        let snapshot = RepoSnapshot::new(&root);
        info!("Scanning {}", root.display());

        let plan = self.settings.plan(&self.registry);
        let outcomes = self.engine.run(&plan, &snapshot, &self.settings.ignore);
        let descriptors: Vec<_> = plan
            .into_iter()
            .filter(|c| c.descriptor.enabled)
            .map(|c| c.descriptor)
            .collect();
        let verdict = scoring::evaluate(
            &self.registry,
            &descriptors,
            &outcomes,
            &self.settings.scoring,
        );

        info!(
            "{}: {:.1}/{} ({})",
            snapshot.name(),
            verdict.scores.total_score,
            MAX_SCORE,
            verdict.maturity_name
        );

        Ok(ScanReport {
            repo_name: snapshot.name(),
            repo_path: root.display().to_string(),
            scanned_at: Local::now(),
            total_score: verdict.scores.total_score,
            max_score: MAX_SCORE,
            category_scores: verdict.scores.category_scores,
            pillar_scores: verdict.scores.pillar_scores,
            gates: verdict.gates,
            maturity_level: verdict.maturity_level,
            maturity_name: verdict.maturity_name.to_string(),
            fix_first: verdict.fix_first,
            domain_scores: verdict.domains.domain_scores,
            overall_score: verdict.domains.overall_score,
            grade: verdict.domains.grade,
            grade_description: verdict.domains.grade.description().to_string(),
            remediation: verdict.domains.remediation,
            checks: outcomes,
        })
    }

    /// Audit several repositories, in the order given
    pub fn scan_repos(&self, paths: &[PathBuf], config_source: Option<String>) -> Result<ScanSummary> {
        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            reports.push(self.scan_repo(path)?);
        }
        Ok(ScanSummary::from_reports(reports, config_source))
    }

    /// True when every report reaches the configured minimum score
    pub fn meets_minimum(&self, summary: &ScanSummary) -> bool {
        summary
            .repos
            .iter()
            .all(|r| r.total_score >= self.settings.minimum_passing_score)
    }
}

fn engine_for(settings: &ScanSettings, callback: Option<ProgressCallback>) -> CheckEngine {
    let mut builder = CheckEngineBuilder::new().workers(settings.workers);
    if let Some(timeout) = settings.check_timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(callback) = callback {
        builder = builder.on_progress(callback);
    }
    builder.build()
}

fn compile_globs(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid pattern '{pattern}'"))?);
    }
    Ok(Some(builder.build()?))
}

/// True when `dir` holds a `.git` directory or worktree file
pub fn is_repo(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// Find git repositories under `root`, at most `depth` levels down.
///
/// Hidden directories are skipped and repositories are not searched for
/// nested repositories. `include`/`exclude` globs match the directory
/// name. Results are sorted.
pub fn find_repos(
    root: &Path,
    depth: usize,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("Root path is not a directory: {}", root.display());
    }
    let include = compile_globs(include)?;
    let exclude = compile_globs(exclude)?;
    let wanted = |dir: &Path| {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        include.as_ref().map_or(true, |set| set.is_match(&name))
            && !exclude.as_ref().is_some_and(|set| set.is_match(&name))
    };

    let mut repos = Vec::new();
    let mut queue = VecDeque::from([(root.to_path_buf(), 0usize)]);
    while let Some((dir, level)) = queue.pop_front() {
        if is_repo(&dir) {
            if wanted(&dir) {
                repos.push(dir);
            } else {
                debug!("Skipping filtered repository {}", dir.display());
            }
            continue;
        }
        if level >= depth {
            continue;
        }
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read {}: {}", dir.display(), e);
                continue;
            }
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !hidden && path.is_dir() {
                queue.push_back((path, level + 1));
            }
        }
    }

    repos.sort();
    info!("Found {} repositories under {}", repos.len(), root.display());
    Ok(repos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::default_registry;
    use crate::models::Status;
    use std::fs;

    fn make_repo(path: &Path) {
        fs::create_dir_all(path.join(".git")).unwrap();
    }

    #[test]
    fn test_find_repos_respects_depth_and_nesting() {
        let dir = tempfile::tempdir().unwrap();
        make_repo(&dir.path().join("alpha"));
        make_repo(&dir.path().join("group/beta"));
        make_repo(&dir.path().join("alpha/nested"));
        make_repo(&dir.path().join(".hidden/gamma"));

        let shallow = find_repos(dir.path(), 1, &[], &[]).unwrap();
        assert_eq!(shallow, vec![dir.path().join("alpha")]);

        let deep = find_repos(dir.path(), 2, &[], &[]).unwrap();
        assert_eq!(
            deep,
            vec![dir.path().join("alpha"), dir.path().join("group/beta")]
        );
    }

    #[test]
    fn test_find_repos_filters_by_name() {
        let dir = tempfile::tempdir().unwrap();
        make_repo(&dir.path().join("api-service"));
        make_repo(&dir.path().join("web-app"));
        make_repo(&dir.path().join("api-legacy"));

        let found = find_repos(
            dir.path(),
            1,
            &["api-*".to_string()],
            &["*legacy".to_string()],
        )
        .unwrap();
        assert_eq!(found, vec![dir.path().join("api-service")]);
    }

    #[test]
    fn test_root_repo_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        make_repo(dir.path());
        assert_eq!(find_repos(dir.path(), 3, &[], &[]).unwrap(), vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn test_scan_empty_repo() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = Scanner::new(default_registry().unwrap(), ScanSettings::default());
        let report = scanner.scan_repo(dir.path()).unwrap();

        assert_eq!(report.checks.len(), 70);
        assert_eq!(report.maturity_level, 1);
        assert_eq!(report.maturity_name, "Functional");
        assert_eq!(report.checks["readme_exists"].status, Status::Failed);
        assert!(report.total_score < MAX_SCORE);
        assert!(!report.fix_first.is_empty());
        // level 2 gate checks lead the list
        assert_eq!(report.fix_first[0].name, "readme_exists");
    }

    #[test]
    fn test_scan_missing_path_fails() {
        let scanner = Scanner::new(default_registry().unwrap(), ScanSettings::default());
        assert!(scanner.scan_repo(Path::new("/definitely/not/here")).is_err());
    }
}
