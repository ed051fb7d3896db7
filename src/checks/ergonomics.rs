//! Agent ergonomics: how pleasant the repo is to drive without a human

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::ci::GITHUB_WORKFLOWS;
use crate::checks::registry::RegistryBuilder;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Domain, Outcome, Pillar};
use anyhow::Result;

const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];
/// Root files looked at per extension
const CONFIGS_PER_EXTENSION: usize = 5;
const KNOWN_CONFIGS: &[&str] = &[
    "settings.yaml",
    "config.yaml",
    "app.yaml",
    "tsconfig.json",
    "package.json",
];

const MAKE_TARGETS: &[&str] = &["build", "test", "lint", "format", "install"];
const COMMAND_RUNNERS: &[&str] = &["Taskfile.yml", "justfile", "tox.ini", "noxfile.py"];

const SOURCE_LIMIT: usize = 30;

const CONTRIBUTING_FILES: &[&str] = &[
    "CONTRIBUTING.md",
    "CONTRIBUTING.rst",
    ".github/CONTRIBUTING.md",
];
const PR_TEMPLATES: &[&str] = &[
    ".github/PULL_REQUEST_TEMPLATE.md",
    ".github/pull_request_template.md",
];
const CONTRIBUTING_HEADINGS: &[&str] = &[
    "## contributing",
    "## development",
    "## developer",
    "how to contribute",
];

/// Instruction files read by coding agents; some are directories
const AGENT_MANIFESTS: &[&str] = &[
    "CLAUDE.md",
    ".claude",
    ".cursorrules",
    ".cursor",
    ".github/copilot-instructions.md",
    ".aider",
    "AGENTS.md",
    ".ai",
    "ai-instructions.md",
];

const CONTAINER_FILES: &[&str] = &["Dockerfile", "docker-compose.yml", "docker-compose.yaml"];
const DEVCONTAINER_FILES: &[&str] = &[".devcontainer/devcontainer.json", ".devcontainer.json"];
const NIX_FILES: &[&str] = &["flake.nix", "shell.nix", "default.nix"];
const REPRODUCIBLE_LOCKFILES: &[&str] = &["uv.lock", "poetry.lock", "package-lock.json", "Cargo.lock"];

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    builder.register(
        CheckDescriptor::new(
            "machine_readable_configs",
            Category::Observability,
            Pillar::DistributionDx,
        )
        .describe("Configuration lives in TOML, YAML or JSON")
        .domain(Domain::Ergonomics),
        machine_readable_configs,
    )?;
    builder.register(
        CheckDescriptor::new(
            "deterministic_commands",
            Category::BuildAndRun,
            Pillar::DistributionDx,
        )
        .describe("Build and test commands sit behind one command interface")
        .domain(Domain::Ergonomics),
        deterministic_commands,
    )?;
    builder.register(
        CheckDescriptor::new(
            "clear_error_messages",
            Category::Observability,
            Pillar::StructuredLoggingCost,
        )
        .describe("Errors carry custom types, logging and formatted messages")
        .domain(Domain::Ergonomics),
        clear_error_messages,
    )?;
    builder.register(
        CheckDescriptor::new(
            "contribution_rules_explicit",
            Category::SecurityAndGovernance,
            Pillar::ContributionContract,
        )
        .describe("Contribution guidelines are written down")
        .domain(Domain::Ergonomics),
        contribution_rules_explicit,
    )?;
    builder.register(
        CheckDescriptor::new(
            "agent_manifest_present",
            Category::Observability,
            Pillar::ContributionContract,
        )
        .describe("An agent instruction file such as AGENTS.md exists")
        .domain(Domain::Ergonomics),
        agent_manifest_present,
    )?;
    builder.register(
        CheckDescriptor::new(
            "command_reproducibility",
            Category::BuildAndRun,
            Pillar::EnvironmentDeterminism,
        )
        .describe("Commands produce the same result locally and in CI")
        .domain(Domain::Ergonomics),
        command_reproducibility,
    )?;
    Ok(())
}

fn exists(repo: &RepoSnapshot, relative: &str) -> bool {
    repo.has_file(relative) || repo.has_dir(relative)
}

fn machine_readable_configs(repo: &RepoSnapshot) -> Result<Outcome> {
    let mut found = Vec::new();
    if repo.has_file("pyproject.toml") {
        found.push("pyproject.toml".to_string());
    }

    let root = repo.list_dir("");
    for extension in CONFIG_EXTENSIONS {
        let suffix = format!(".{extension}");
        let candidates = root
            .iter()
            .filter(|name| !name.starts_with('.') && name.ends_with(&suffix))
            .filter(|name| repo.has_file(name))
            .take(CONFIGS_PER_EXTENSION);
        for name in candidates {
            if name.to_lowercase().contains("config") || KNOWN_CONFIGS.contains(&name.as_str()) {
                found.push(name.clone());
            }
        }
    }

    if !found.is_empty() {
        let shown: Vec<_> = found.iter().take(3).cloned().collect();
        return Ok(Outcome::passed(format!(
            "Machine-readable configs: {}",
            shown.join(", ")
        )));
    }
    if repo.find_file(&[".env.example", ".env.sample"]).is_some() {
        return Ok(Outcome::partial(
            "Environment variable configuration only",
            "Move configuration into a TOML, YAML, or JSON file.",
        ));
    }
    Ok(Outcome::failed(
        "No machine-readable configuration files found",
        "Use TOML, YAML, or JSON for configuration instead of ad-hoc formats.",
    ))
}

fn deterministic_commands(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(makefile) = repo.read("Makefile") {
        let targets: Vec<&str> = MAKE_TARGETS
            .iter()
            .copied()
            .filter(|t| makefile.contains(&format!("{t}:")))
            .collect();
        if targets.len() >= 2 {
            return Ok(Outcome::passed(format!(
                "Makefile with targets: {}",
                targets.join(", ")
            )));
        }
    }
    if repo
        .read("package.json")
        .is_some_and(|c| c.contains("\"scripts\""))
    {
        return Ok(Outcome::passed("package.json with npm scripts"));
    }
    if let Some(runner) = repo.find_file(COMMAND_RUNNERS) {
        return Ok(Outcome::passed(format!("Task runner found: {runner}")));
    }
    if repo
        .read("pyproject.toml")
        .is_some_and(|c| c.contains("[tool.hatch"))
    {
        return Ok(Outcome::passed("Hatch task runner configured"));
    }
    Ok(Outcome::failed(
        "No deterministic command interface found",
        "Add a Makefile or task runner with build, test, lint targets.",
    ))
}

fn clear_error_messages(repo: &RepoSnapshot) -> Result<Outcome> {
    let mut custom_exceptions = false;
    let mut logging = false;
    let mut formatted = false;

    for file in repo.walk(&["py"], SOURCE_LIMIT) {
        if repo.relative(&file).to_lowercase().contains("test") {
            continue;
        }
        let Some(content) = repo.read_path(&file) else {
            continue;
        };
        custom_exceptions |= content.contains("class ") && content.contains("Exception");
        logging |= content.contains("import logging") || content.contains("from loguru");
        formatted |= content.contains("raise ")
            && (content.contains("f\"") || content.contains("f'"));
    }

    let findings: Vec<&str> = [
        (custom_exceptions, "custom exceptions"),
        (logging, "logging"),
        (formatted, "formatted error messages"),
    ]
    .into_iter()
    .filter_map(|(present, label)| present.then_some(label))
    .collect();

    match findings.len() {
        0 => Ok(Outcome::failed(
            "No structured error handling detected",
            "Add custom exceptions and logging for clear error messages.",
        )),
        1 => Ok(Outcome::partial(
            format!("Partial error handling: {}", findings[0]),
            "Add custom exceptions and logging for clear error messages.",
        )),
        _ => Ok(Outcome::passed(format!(
            "Good error handling: {}",
            findings.join(", ")
        ))),
    }
}

fn contribution_rules_explicit(repo: &RepoSnapshot) -> Result<Outcome> {
    if repo.find_file(CONTRIBUTING_FILES).is_some() {
        return Ok(Outcome::passed("CONTRIBUTING.md found"));
    }
    if repo.find_file(PR_TEMPLATES).is_some() {
        return Ok(Outcome::passed("PR template found"));
    }
    if let Some(readme) = repo.find_file(&["README.md", "README.rst"]) {
        if repo.contains(readme, CONTRIBUTING_HEADINGS).is_some() {
            return Ok(Outcome::passed("README contains contribution guidelines"));
        }
    }
    Ok(Outcome::failed(
        "No contribution guidelines found",
        "Add CONTRIBUTING.md or a Contributing section in README.",
    ))
}

fn agent_manifest_present(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(manifest) = AGENT_MANIFESTS.iter().find(|m| exists(repo, m)) {
        return Ok(Outcome::passed(format!("Agent manifest found: {manifest}")));
    }
    Ok(Outcome::failed(
        "No agent-readiness manifest found",
        "Add AGENTS.md or a similar agent instructions file for better agent compatibility.",
    ))
}

fn command_reproducibility(repo: &RepoSnapshot) -> Result<Outcome> {
    if repo.has_file("Makefile") {
        let ci_uses_make = repo
            .files_in(GITHUB_WORKFLOWS, &["yml"])
            .iter()
            .any(|workflow| repo.read_path(workflow).is_some_and(|c| c.contains("make ")));
        if ci_uses_make {
            return Ok(Outcome::passed(
                "CI uses same Makefile commands as local development",
            ));
        }
    }
    if repo.find_file(CONTAINER_FILES).is_some() {
        return Ok(Outcome::passed(
            "Docker configuration ensures reproducible environment",
        ));
    }
    if repo.find_file(DEVCONTAINER_FILES).is_some() {
        return Ok(Outcome::passed("Dev container ensures reproducible environment"));
    }
    if repo.find_file(NIX_FILES).is_some() {
        return Ok(Outcome::passed("Nix configuration ensures reproducible builds"));
    }
    if let Some(lock) = repo.find_file(REPRODUCIBLE_LOCKFILES) {
        return Ok(Outcome::partial(
            format!("Lock file ({lock}) provides partial reproducibility"),
            "Use Docker, devcontainer, or ensure CI mirrors local commands.",
        ));
    }
    Ok(Outcome::failed(
        "No reproducibility guarantees detected",
        "Use Docker, devcontainer, or ensure CI mirrors local commands.",
    ))
}
