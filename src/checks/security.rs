//! Security and governance checks

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::discoverability::README_FILES;
use crate::checks::registry::RegistryBuilder;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Outcome, Pillar};
use anyhow::Result;

const ENV_TEMPLATES: &[&str] = &[
    ".env.example",
    ".env.sample",
    ".env.template",
    "env.example",
    ".env.local.example",
];

const SECRETS_DOCS: &[&str] = &[
    "docs/secrets.md",
    "docs/configuration.md",
    "docs/environment.md",
    "docs/env.md",
    "SECRETS.md",
    "CONFIGURATION.md",
];

const README_ENV_PATTERNS: &[&str] = &[
    "environment variable",
    "env var",
    ".env",
    "configuration",
    "API_KEY",
    "SECRET",
];

const SECURITY_POLICIES: &[&str] = &[
    "SECURITY.md",
    "security.md",
    ".github/SECURITY.md",
    "docs/SECURITY.md",
    "docs/security.md",
];

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let group = Category::SecurityAndGovernance;
    let pillar = Pillar::SecretHygiene;

    builder.register(
        CheckDescriptor::new("gitignore_present", group, pillar)
            .describe("A .gitignore keeps artifacts and secrets out of version control"),
        gitignore_present,
    )?;
    builder.register(
        CheckDescriptor::new("env_example_or_secrets_docs_present", group, pillar)
            .describe("Required environment variables are documented"),
        env_example_or_secrets_docs_present,
    )?;
    builder.register(
        CheckDescriptor::new("security_policy_present_or_baseline", group, pillar)
            .describe("A security policy or baseline exists"),
        security_policy_present_or_baseline,
    )?;
    Ok(())
}

fn gitignore_present(repo: &RepoSnapshot) -> Result<Outcome> {
    let Some(content) = repo.read(".gitignore") else {
        return Ok(Outcome::failed(
            "No .gitignore file found",
            "Add a .gitignore file to exclude build artifacts, dependencies, and sensitive files.",
        ));
    };
    let patterns = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .count();
    Ok(if patterns > 0 {
        Outcome::passed(format!("Found .gitignore with {patterns} pattern(s)"))
    } else {
        Outcome::passed("Found .gitignore (appears to be empty or only comments)")
    })
}

fn env_example_or_secrets_docs_present(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(template) = repo.find_file(ENV_TEMPLATES) {
        return Ok(Outcome::passed(format!(
            "Found environment template: {template}"
        )));
    }
    if let Some(doc) = repo.find_file(SECRETS_DOCS) {
        return Ok(Outcome::passed(format!(
            "Found configuration documentation: {doc}"
        )));
    }
    for readme in README_FILES {
        if let Some(found) = repo.contains(readme, README_ENV_PATTERNS) {
            return Ok(Outcome::passed(format!(
                "Found environment documentation in README: '{found}'"
            )));
        }
    }

    let uses_env = repo
        .contains("pyproject.toml", &["python-dotenv", "environs", "pydantic-settings"])
        .is_some()
        || repo.contains("package.json", &["dotenv", "env"]).is_some();
    if uses_env {
        return Ok(Outcome::failed(
            "Project uses environment variables but no .env.example found",
            "Add a .env.example file documenting required environment variables.",
        ));
    }
    Ok(Outcome::passed(
        "No environment variable usage detected (or documentation not required)",
    ))
}

fn security_policy_present_or_baseline(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(policy) = repo.find_file(SECURITY_POLICIES) {
        return Ok(Outcome::passed(format!("Found security policy: {policy}")));
    }
    if repo
        .contains(
            "CONTRIBUTING.md",
            &["security", "vulnerability", "responsible disclosure"],
        )
        .is_some()
    {
        return Ok(Outcome::passed("Found security guidance in CONTRIBUTING.md"));
    }
    for readme in README_FILES {
        if repo
            .contains(readme, &["## security", "### security", "# security"])
            .is_some()
        {
            return Ok(Outcome::passed("Found security section in README"));
        }
    }
    if repo
        .find_file(&[".github/dependabot.yml", ".github/dependabot.yaml"])
        .is_some()
    {
        return Ok(Outcome::passed(
            "Found Dependabot configuration (security baseline)",
        ));
    }
    Ok(Outcome::failed(
        "No security policy or baseline documentation found",
        "Add a SECURITY.md file with vulnerability reporting instructions.",
    ))
}
