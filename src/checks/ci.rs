//! CI enforcement checks

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::registry::RegistryBuilder;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Outcome, Pillar};
use anyhow::Result;

pub(crate) const GITHUB_WORKFLOWS: &str = ".github/workflows";
pub(crate) const WORKFLOW_EXTENSIONS: &[&str] = &["yml", "yaml"];

const CI_CONFIGS: &[&str] = &[
    ".gitlab-ci.yml",
    ".gitlab-ci.yaml",
    "azure-pipelines.yml",
    "azure-pipelines.yaml",
    "bitbucket-pipelines.yml",
    ".circleci/config.yml",
    ".circleci/config.yaml",
    "Jenkinsfile",
    ".travis.yml",
    ".travis.yaml",
    "appveyor.yml",
    ".drone.yml",
    ".buildkite/pipeline.yml",
];

const WORKFLOW_COMMANDS: &[&str] = &[
    "pytest",
    "npm test",
    "yarn test",
    "pnpm test",
    "cargo test",
    "go test",
    "make test",
    "uv run pytest",
    "ruff",
    "eslint",
    "mypy",
    "flake8",
    "black --check",
    "prettier --check",
    "lint",
    "typecheck",
];

const OTHER_CI_FILES: &[&str] = &[
    "azure-pipelines.yml",
    "bitbucket-pipelines.yml",
    ".circleci/config.yml",
    ".travis.yml",
];

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let group = Category::CiEnforcement;
    let pillar = Pillar::VerificationTrust;

    builder.register(
        CheckDescriptor::new("ci_workflow_present", group, pillar)
            .describe("A CI workflow configuration exists")
            .gate_for(&[3]),
        ci_workflow_present,
    )?;
    builder.register(
        CheckDescriptor::new("ci_runs_tests_or_lint", group, pillar)
            .describe("CI runs the tests or the linters"),
        ci_runs_tests_or_lint,
    )?;
    Ok(())
}

/// Where CI is configured, if anywhere
fn ci_location(repo: &RepoSnapshot) -> Option<String> {
    let workflows = repo.files_in(GITHUB_WORKFLOWS, WORKFLOW_EXTENSIONS);
    if !workflows.is_empty() {
        return Some(format!(
            "GitHub Actions workflows: {} file(s)",
            workflows.len()
        ));
    }
    repo.find_file(CI_CONFIGS)
        .map(|config| format!("CI configuration: {config}"))
}

fn ci_workflow_present(repo: &RepoSnapshot) -> Result<Outcome> {
    Ok(match ci_location(repo) {
        Some(location) => Outcome::passed(format!("Found {location}")),
        None => Outcome::failed(
            "No CI workflow configuration found",
            "Add CI configuration (e.g., .github/workflows/ci.yml for GitHub Actions).",
        ),
    })
}

fn ci_runs_tests_or_lint(repo: &RepoSnapshot) -> Result<Outcome> {
    for workflow in repo.files_in(GITHUB_WORKFLOWS, WORKFLOW_EXTENSIONS) {
        if let Some(found) = repo.path_contains(&workflow, WORKFLOW_COMMANDS) {
            let name = workflow
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            return Ok(Outcome::passed(format!(
                "Found test/lint command in {name}: '{found}'"
            )));
        }
    }

    if let Some(gitlab) = repo.find_file(&[".gitlab-ci.yml", ".gitlab-ci.yaml"]) {
        if let Some(found) = repo.contains(
            gitlab,
            &["pytest", "npm test", "cargo test", "go test", "lint", "test"],
        ) {
            return Ok(Outcome::passed(format!(
                "Found test/lint command in GitLab CI: '{found}'"
            )));
        }
    }

    for file in OTHER_CI_FILES {
        if let Some(found) =
            repo.contains(file, &["test", "lint", "pytest", "npm test", "cargo test"])
        {
            return Ok(Outcome::passed(format!(
                "Found test/lint command in {file}: '{found}'"
            )));
        }
    }

    if ci_location(repo).is_some() {
        return Ok(Outcome::failed(
            "CI configuration exists but no test/lint commands detected",
            "Add test and lint steps to your CI workflow.",
        ));
    }
    Ok(Outcome::failed(
        "No CI configuration with test/lint commands found",
        "Add CI configuration that runs tests and linting on PRs.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use std::fs;

    fn with_workflow(body: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let workflows = dir.path().join(".github/workflows");
        fs::create_dir_all(&workflows).unwrap();
        fs::write(workflows.join("ci.yml"), body).unwrap();
        dir
    }

    #[test]
    fn test_github_workflow_detected() {
        let dir = with_workflow("on: push\njobs:\n  test:\n    steps:\n      - run: cargo test\n");
        let repo = RepoSnapshot::new(dir.path());
        let present = ci_workflow_present(&repo).unwrap();
        assert_eq!(present.status, Status::Passed);
        assert!(present.evidence.contains("1 file(s)"));

        let runs = ci_runs_tests_or_lint(&repo).unwrap();
        assert_eq!(runs.status, Status::Passed);
        assert!(runs.evidence.contains("ci.yml"));
    }

    #[test]
    fn test_ci_without_commands() {
        let dir = with_workflow("on: push\njobs:\n  deploy:\n    steps:\n      - run: ./release.sh\n");
        let repo = RepoSnapshot::new(dir.path());
        let outcome = ci_runs_tests_or_lint(&repo).unwrap();
        assert_eq!(outcome.status, Status::Failed);
        assert!(outcome.evidence.starts_with("CI configuration exists"));
    }

    #[test]
    fn test_no_ci() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(ci_workflow_present(&repo).unwrap().status, Status::Failed);
        assert_eq!(ci_runs_tests_or_lint(&repo).unwrap().status, Status::Failed);
    }
}
