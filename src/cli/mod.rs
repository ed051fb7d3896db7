//! CLI command definitions and handlers

mod checks;
mod init;
mod report;
mod scan;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// ARA - Agent readiness audit
///
/// Read-only: checks never execute code from the scanned repository.
#[derive(Parser, Debug)]
#[command(name = "ara")]
#[command(
    version,
    about = "Agent readiness audit: score how well an AI coding agent can set up, test and change a repository",
    long_about = "ARA inspects a repository checkout with a catalog of small, read-only checks \
(README, lockfiles, tests, linters, CI, observability, security hygiene), scores it on a \
0-16 scale and assigns a maturity level from 1 (Functional) to 5 (Autonomous). \
Each level also requires its gate checks to pass.",
    after_help = "\
Examples:
  ara scan                                Audit the current directory
  ara scan --repo ../service --format md  Markdown report for one repo
  ara scan --root ~/src --depth 2         Audit every git repo under ~/src
  ara scan --strict --min-score 12        Exit 1 if any repo scores below 12
  ara report --input out/summary.json     Re-render a saved summary
  ara init-config                         Write a starter .ara.toml
  ara checks                              List the check catalog"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel check workers (1-64, default: one per core)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Disable colored output (also honored: NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit one repository, or every repository under a root directory
    Scan {
        /// Repository to scan (default: current directory)
        #[arg(long, conflicts_with = "root")]
        repo: Option<PathBuf>,

        /// Scan every git repository found under this directory
        #[arg(long)]
        root: Option<PathBuf>,

        /// How many directory levels below --root to search
        #[arg(long, default_value = "2")]
        depth: usize,

        /// Only scan repositories whose directory name matches (glob, repeatable)
        #[arg(long, requires = "root")]
        include: Vec<String>,

        /// Skip repositories whose directory name matches (glob, repeatable)
        #[arg(long, requires = "root")]
        exclude: Vec<String>,

        /// Config file (default: nearest .ara.toml, then ~/.ara.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format: table, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "table", value_parser = ["table", "json", "markdown", "md"])]
        format: String,

        /// Also write summary and per-repo reports into this directory
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Exit with code 1 if any repository scores below the minimum
        #[arg(long)]
        strict: bool,

        /// Minimum passing score for --strict (overrides the config)
        #[arg(long)]
        min_score: Option<f64>,

        /// Per-check timeout in milliseconds, 0 disables (overrides the config)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Render a summary previously saved as JSON
    Report {
        /// summary.json written by `ara scan --format json` or `--out`
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Output format: table, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "markdown", value_parser = ["table", "json", "markdown", "md"])]
        format: String,
    },

    /// Write a commented starter .ara.toml
    InitConfig {
        /// Destination file
        #[arg(long, short = 'o', default_value = ".ara.toml")]
        out: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List every registered check with its category, pillar, weight and gates
    Checks,
}

/// Whether table output should carry ANSI colors
fn color_enabled(no_color: bool) -> bool {
    let enabled = !no_color
        && std::env::var_os("NO_COLOR").is_none()
        && console::Term::stdout().features().colors_supported();
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
    enabled
}

pub fn run(cli: Cli) -> Result<()> {
    let color = color_enabled(cli.no_color);

    match cli.command {
        Commands::Scan {
            repo,
            root,
            depth,
            include,
            exclude,
            config,
            format,
            out,
            strict,
            min_score,
            timeout_ms,
        } => scan::run(scan::ScanOptions {
            repo,
            root,
            depth,
            include,
            exclude,
            config,
            format: format.parse()?,
            out,
            strict,
            min_score,
            timeout_ms,
            workers: cli.workers,
            color,
        }),

        Commands::Report { input, format } => report::run(&input, format.parse()?, color),

        Commands::InitConfig { out, force } => init::run(&out, force),

        Commands::Checks => checks::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_workers() {
        assert_eq!(parse_workers("4"), Ok(4));
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("65").is_err());
        assert!(parse_workers("many").is_err());
    }

    #[test]
    fn test_repo_conflicts_with_root() {
        let parsed = Cli::try_parse_from(["ara", "scan", "--repo", "a", "--root", "b"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::try_parse_from(["ara", "scan"]).unwrap();
        assert_eq!(cli.log_level, "warn");
        assert!(cli.workers.is_none());
        match cli.command {
            Commands::Scan { format, depth, strict, .. } => {
                assert_eq!(format, "table");
                assert_eq!(depth, 2);
                assert!(!strict);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
