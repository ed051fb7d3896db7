//! Scan command - audit one repository or a directory of repositories

use crate::checks::default_registry;
use crate::config::load_config;
use crate::models::MAX_SCORE;
use crate::reporters::{render, write_artifacts, OutputFormat};
use crate::scanner::{find_repos, is_repo, Scanner};
use anyhow::{bail, Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolved `ara scan` arguments
#[derive(Debug)]
pub struct ScanOptions {
    pub repo: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub depth: usize,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    pub out: Option<PathBuf>,
    pub strict: bool,
    pub min_score: Option<f64>,
    pub timeout_ms: Option<u64>,
    pub workers: Option<usize>,
    pub color: bool,
}

/// Create spinner progress style
fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Run the scan command
pub fn run(options: ScanOptions) -> Result<()> {
    // Phase 1: work out what to scan
    let (start, repos) = match &options.root {
        Some(root) => {
            let repos = find_repos(root, options.depth, &options.include, &options.exclude)?;
            if repos.is_empty() {
                bail!(
                    "No git repositories found under {} (depth {})",
                    root.display(),
                    options.depth
                );
            }
            (root.clone(), repos)
        }
        None => {
            let repo = options.repo.clone().unwrap_or_else(|| PathBuf::from("."));
            // Still scanned; a plain directory is a legitimate target
            if repo.is_dir() && !is_repo(&repo) {
                warn!("{} does not appear to be a git repository", repo.display());
            }
            (repo.clone(), vec![repo])
        }
    };

    // Phase 2: configuration is validated before any check runs
    let registry = default_registry()?;
    let loaded = load_config(options.config.as_deref(), &start)?;
    let mut settings = loaded.config.resolve(&registry)?;
    if let Some(workers) = options.workers {
        settings.workers = workers;
    }
    if let Some(ms) = options.timeout_ms {
        settings.check_timeout = (ms > 0).then(|| Duration::from_millis(ms));
    }
    if let Some(min) = options.min_score {
        if !min.is_finite() || !(0.0..=MAX_SCORE).contains(&min) {
            bail!("--min-score must be within 0..=16, got {}", min);
        }
        settings.minimum_passing_score = min;
    }
    let config_source = loaded.source.map(|p| p.display().to_string());
    debug!(
        "Scanning {} repo(s) with config {}",
        repos.len(),
        config_source.as_deref().unwrap_or("defaults")
    );

    // Phase 3: run
    let spinner = (options.format == OutputFormat::Table).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(create_spinner_style());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Running checks...");
        pb
    });

    let mut scanner = Scanner::new(registry, settings);
    if let Some(pb) = &spinner {
        let pb = pb.clone();
        scanner = scanner.with_progress(Box::new(move |name: &str, done: usize, total: usize| {
            pb.set_message(format!("[{done}/{total}] {name}"));
        }));
    }
    let result = scanner.scan_repos(&repos, config_source);
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }
    let summary = result?;

    // Phase 4: output
    print!("{}", render(&summary, options.format, options.color)?);

    if let Some(dir) = &options.out {
        let written = write_artifacts(&summary, dir)
            .with_context(|| format!("Failed to write reports to {}", dir.display()))?;
        eprintln!(
            "{} Wrote {} file(s) to {}",
            style("✓").green(),
            written.len(),
            style(dir.display()).cyan()
        );
    }

    if options.strict && !scanner.meets_minimum(&summary) {
        let minimum = scanner.settings().minimum_passing_score;
        for report in summary.repos.iter().filter(|r| r.total_score < minimum) {
            eprintln!(
                "{} {} scored {:.1}, below the minimum of {:.1}",
                style("✗").red(),
                report.repo_name,
                report.total_score,
                minimum
            );
        }
        std::io::stdout().flush()?;
        std::process::exit(1);
    }

    Ok(())
}
