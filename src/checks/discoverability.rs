//! Discoverability checks: README presence and quality

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::registry::RegistryBuilder;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Outcome, Pillar};
use anyhow::Result;

pub(crate) const README_FILES: &[&str] =
    &["README.md", "README.MD", "README", "readme.md", "Readme.md"];

const SETUP_PATTERNS: &[&str] = &[
    "## installation",
    "## setup",
    "## getting started",
    "## quick start",
    "## quickstart",
    "### installation",
    "### setup",
    "### getting started",
    "# installation",
    "# setup",
    "pip install",
    "npm install",
    "yarn add",
    "pnpm add",
    "uv add",
    "cargo install",
    "go install",
    "brew install",
];

const TEST_PATTERNS: &[&str] = &[
    "## testing",
    "## tests",
    "## running tests",
    "### testing",
    "### tests",
    "### running tests",
    "# testing",
    "# tests",
    "pytest",
    "npm test",
    "yarn test",
    "pnpm test",
    "cargo test",
    "go test",
    "make test",
    "uv run pytest",
];

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let group = Category::Discoverability;
    let pillar = Pillar::DistributionDx;

    builder.register(
        CheckDescriptor::new("readme_exists", group, pillar)
            .describe("A README file exists in the repository root")
            .gate_for(&[2]),
        readme_exists,
    )?;
    builder.register(
        CheckDescriptor::new("readme_has_setup_section", group, pillar)
            .describe("README contains setup or installation instructions")
            .gate_for(&[2]),
        readme_has_setup_section,
    )?;
    builder.register(
        CheckDescriptor::new("readme_has_test_instructions", group, pillar)
            .describe("README explains how to run the tests")
            .gate_for(&[3]),
        readme_has_test_instructions,
    )?;
    Ok(())
}

fn readme_exists(repo: &RepoSnapshot) -> Result<Outcome> {
    Ok(match repo.find_file(README_FILES) {
        Some(readme) => Outcome::passed(format!("Found README at: {readme}")),
        None => Outcome::failed(
            "No README file found in repository root",
            "Add a README.md file with project overview, setup instructions, and usage examples.",
        ),
    })
}

fn readme_has_setup_section(repo: &RepoSnapshot) -> Result<Outcome> {
    let Some(readme) = repo.find_file(README_FILES) else {
        return Ok(Outcome::failed(
            "No README file found",
            "Add a README.md file with setup instructions.",
        ));
    };
    Ok(match repo.contains(readme, SETUP_PATTERNS) {
        Some(found) => Outcome::passed(format!("Found setup-related content: '{found}'")),
        None => Outcome::failed(
            "No setup/installation section found in README",
            "Add an 'Installation' or 'Getting Started' section to your README.",
        ),
    })
}

fn readme_has_test_instructions(repo: &RepoSnapshot) -> Result<Outcome> {
    let Some(readme) = repo.find_file(README_FILES) else {
        return Ok(Outcome::failed(
            "No README file found",
            "Add a README.md file with test instructions.",
        ));
    };
    Ok(match repo.contains(readme, TEST_PATTERNS) {
        Some(found) => Outcome::passed(format!("Found test-related content: '{found}'")),
        None => Outcome::failed(
            "No test instructions found in README",
            "Add a 'Testing' section to your README explaining how to run tests.",
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use std::fs;

    #[test]
    fn test_missing_readme_fails_all() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(readme_exists(&repo).unwrap().status, Status::Failed);
        assert_eq!(readme_has_setup_section(&repo).unwrap().status, Status::Failed);
        assert_eq!(readme_has_test_instructions(&repo).unwrap().status, Status::Failed);
    }

    #[test]
    fn test_readme_sections_detected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("README.md"),
            "# Tool\n\n## Getting Started\n\nRun `cargo test` to verify.\n",
        )
        .unwrap();
        let repo = RepoSnapshot::new(dir.path());

        let setup = readme_has_setup_section(&repo).unwrap();
        assert_eq!(setup.status, Status::Passed);
        assert!(setup.evidence.contains("getting started"));
        assert_eq!(readme_has_test_instructions(&repo).unwrap().status, Status::Passed);
    }

    #[test]
    fn test_readme_without_sections() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README"), "just a name\n").unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(readme_exists(&repo).unwrap().status, Status::Passed);
        let outcome = readme_has_setup_section(&repo).unwrap();
        assert_eq!(outcome.status, Status::Failed);
        assert!(outcome.suggestion.is_some());
    }
}
