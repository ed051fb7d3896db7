//! Deterministic setup and build/run checks

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::discoverability::README_FILES;
use crate::checks::registry::RegistryBuilder;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Outcome, Pillar};
use anyhow::Result;

pub(crate) const MANIFESTS: &[&str] = &[
    "pyproject.toml",
    "setup.py",
    "setup.cfg",
    "requirements.txt",
    "Pipfile",
    "package.json",
    "Cargo.toml",
    "go.mod",
    "Gemfile",
];

const LOCKFILES: &[&str] = &[
    "uv.lock",
    "poetry.lock",
    "Pipfile.lock",
    "requirements.lock",
    "requirements-lock.txt",
    "pdm.lock",
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "bun.lockb",
    "Cargo.lock",
    "go.sum",
    "Gemfile.lock",
];

pub(crate) const TASK_RUNNERS: &[&str] = &[
    "Makefile",
    "makefile",
    "GNUmakefile",
    "Taskfile.yml",
    "Taskfile.yaml",
    "justfile",
    "Justfile",
    "magefile.go",
    "tox.ini",
    "noxfile.py",
    "invoke.yaml",
    "tasks.py",
    "Rakefile",
    "build.gradle",
    "build.gradle.kts",
    "pom.xml",
];

pub(crate) const MAKEFILES: &[&str] = &["Makefile", "makefile", "GNUmakefile"];

const README_COMMANDS: &[&str] = &[
    "make ", "npm run", "yarn ", "pnpm ", "cargo ", "go ", "pytest", "python ", "uv run", "./",
    "task ", "just ",
];

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let setup = Category::DeterministicSetup;
    let env = Pillar::EnvironmentDeterminism;

    builder.register(
        CheckDescriptor::new("dependency_manifest_exists", setup, env)
            .describe("A dependency manifest file exists"),
        dependency_manifest_exists,
    )?;
    builder.register(
        CheckDescriptor::new("lockfile_exists", setup, env)
            .describe("A dependency lock file pins versions for reproducible builds"),
        lockfile_exists,
    )?;
    builder.register(
        CheckDescriptor::new("runtime_version_declared", setup, env)
            .describe("The runtime or language version is declared explicitly"),
        runtime_version_declared,
    )?;

    let build = Category::BuildAndRun;
    builder.register(
        CheckDescriptor::new("make_or_task_runner_exists", build, Pillar::FastGuardrails)
            .describe("A task runner (Makefile, Taskfile, justfile...) exists"),
        make_or_task_runner_exists,
    )?;
    builder.register(
        CheckDescriptor::new("package_scripts_or_equivalent", build, Pillar::FastGuardrails)
            .describe("Package scripts or equivalent automation exist"),
        package_scripts_or_equivalent,
    )?;
    builder.register(
        CheckDescriptor::new("documented_commands_present", build, Pillar::DistributionDx)
            .describe("Common commands are documented or discoverable"),
        documented_commands_present,
    )?;
    Ok(())
}

fn dependency_manifest_exists(repo: &RepoSnapshot) -> Result<Outcome> {
    Ok(match repo.find_file(MANIFESTS) {
        Some(manifest) => Outcome::passed(format!("Found dependency manifest: {manifest}")),
        None => Outcome::failed(
            "No dependency manifest found",
            "Add a dependency manifest (e.g., pyproject.toml, package.json, Cargo.toml).",
        ),
    })
}

fn lockfile_exists(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(lockfile) = repo.find_file(LOCKFILES) {
        return Ok(Outcome::passed(format!("Found lock file: {lockfile}")));
    }
    Ok(match repo.find_file(MANIFESTS) {
        Some(manifest) => Outcome::failed(
            format!("Found manifest ({manifest}) but no lock file"),
            "Generate a lock file to ensure reproducible builds (e.g., uv lock, npm install, cargo build).",
        ),
        None => Outcome::failed(
            "No lock file found",
            "Add a lock file for reproducible dependency installation.",
        ),
    })
}

fn runtime_version_declared(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(found) = repo.find_file(&[".python-version", ".tool-versions"]) {
        return Ok(Outcome::passed(format!("Found version file: {found}")));
    }
    if repo
        .contains("pyproject.toml", &["requires-python", "python_requires"])
        .is_some()
    {
        return Ok(Outcome::passed(
            "Found Python version requirement in pyproject.toml",
        ));
    }
    if repo.contains("package.json", &["\"engines\"", "\"node\""]).is_some() {
        return Ok(Outcome::passed(
            "Found Node.js version requirement in package.json",
        ));
    }
    if repo.find_file(&[".nvmrc", ".node-version"]).is_some() {
        return Ok(Outcome::passed("Found Node.js version file"));
    }
    if repo
        .find_file(&["rust-toolchain", "rust-toolchain.toml"])
        .is_some()
    {
        return Ok(Outcome::passed("Found Rust toolchain file"));
    }
    if repo.contains("go.mod", &["go 1."]).is_some() {
        return Ok(Outcome::passed("Found Go version in go.mod"));
    }
    Ok(Outcome::failed(
        "No runtime version declaration found",
        "Declare your runtime version (e.g., .python-version, .nvmrc, requires-python in pyproject.toml).",
    ))
}

fn make_or_task_runner_exists(repo: &RepoSnapshot) -> Result<Outcome> {
    Ok(match repo.find_file(TASK_RUNNERS) {
        Some(runner) => Outcome::passed(format!("Found task runner: {runner}")),
        None => Outcome::failed(
            "No task runner found",
            "Add a Makefile, Taskfile.yml, or justfile with common tasks (build, test, lint, format).",
        ),
    })
}

fn package_scripts_or_equivalent(repo: &RepoSnapshot) -> Result<Outcome> {
    if repo.contains("package.json", &["\"scripts\""]).is_some() {
        return Ok(Outcome::passed("Found scripts section in package.json"));
    }
    if repo
        .contains(
            "pyproject.toml",
            &["[project.scripts]", "[tool.poetry.scripts]", "[tool.hatch.envs"],
        )
        .is_some()
    {
        return Ok(Outcome::passed("Found scripts/commands in pyproject.toml"));
    }
    if repo.contains("Cargo.toml", &["[[bin]]", "[package]"]).is_some() {
        return Ok(Outcome::passed(
            "Found binary/package definition in Cargo.toml",
        ));
    }
    if let Some(runner) = repo.find_file(TASK_RUNNERS) {
        return Ok(Outcome::passed(format!(
            "Found task runner as alternative: {runner}"
        )));
    }
    Ok(Outcome::failed(
        "No package scripts or task runner found",
        "Add scripts to your package manifest or create a task runner file.",
    ))
}

fn documented_commands_present(repo: &RepoSnapshot) -> Result<Outcome> {
    for readme in README_FILES {
        if let Some(found) = repo.contains(readme, README_COMMANDS) {
            return Ok(Outcome::passed(format!(
                "Found command documentation in README: '{found}'"
            )));
        }
    }
    if let Some(makefile) = repo.find_file(MAKEFILES) {
        if repo.contains(makefile, &[".PHONY", "help:"]).is_some() {
            return Ok(Outcome::passed(
                "Found Makefile with targets (likely self-documenting)",
            ));
        }
    }
    if let Some(found) = repo.contains(
        "CONTRIBUTING.md",
        &["make ", "npm ", "pytest", "cargo ", "go "],
    ) {
        return Ok(Outcome::passed(format!(
            "Found command documentation in CONTRIBUTING.md: '{found}'"
        )));
    }
    Ok(Outcome::failed(
        "No documented commands found",
        "Document common commands (build, test, lint) in README or add a Makefile with help target.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use std::fs;

    #[test]
    fn test_manifest_without_lockfile() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(dependency_manifest_exists(&repo).unwrap().status, Status::Passed);
        let lock = lockfile_exists(&repo).unwrap();
        assert_eq!(lock.status, Status::Failed);
        assert!(lock.evidence.contains("package.json"));
    }

    #[test]
    fn test_runtime_version_sources() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(runtime_version_declared(&repo).unwrap().status, Status::Failed);

        fs::write(dir.path().join("go.mod"), "module x\n\ngo 1.22\n").unwrap();
        let outcome = runtime_version_declared(&repo).unwrap();
        assert_eq!(outcome.status, Status::Passed);
        assert!(outcome.evidence.contains("go.mod"));
    }

    #[test]
    fn test_cargo_package_counts_as_scripts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"x\"\n").unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(package_scripts_or_equivalent(&repo).unwrap().status, Status::Passed);
        assert_eq!(make_or_task_runner_exists(&repo).unwrap().status, Status::Failed);
    }

    #[test]
    fn test_documented_commands_from_makefile() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Makefile"), ".PHONY: test\ntest:\n\tpytest\n").unwrap();
        let repo = RepoSnapshot::new(dir.path());
        let outcome = documented_commands_present(&repo).unwrap();
        assert_eq!(outcome.status, Status::Passed);
        assert!(outcome.evidence.contains("Makefile"));
    }
}
