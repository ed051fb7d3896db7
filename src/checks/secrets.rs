//! Secret handling checks: hardcoded credentials, sensitive files, prompt hygiene

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::registry::RegistryBuilder;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Domain, Outcome, Pillar};
use anyhow::Result;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Source files scanned per extension
const FILES_PER_EXTENSION: usize = 30;
const SCANNED_EXTENSIONS: &[&str] = &["py", "js", "ts", "yaml", "yml"];
const MAX_SECRET_FINDINGS: usize = 5;

/// Never meant to be committed, even by accident
const SENSITIVE_FILES: &[&str] = &[
    ".env",
    ".env.local",
    ".env.production",
    "credentials.json",
    "service-account.json",
    "secrets.yaml",
    "secrets.yml",
    ".netrc",
    "id_rsa",
    "id_ed25519",
];

const GITIGNORE_PATTERNS: &[&str] = &[".env", "*.pem", "*.key"];

const ENV_TEMPLATES: &[&str] = &[
    ".env.example",
    ".env.sample",
    ".env.template",
    "env.example",
    ".env.development.example",
];

const README_VARIANTS: &[&str] = &["README.md", "README.rst", "README.txt", "README"];
const ENV_DOC_PATTERNS: &[&str] = &["environment variable", "env var", ".env", "configuration"];

const ENV_CONFIGS: &[&str] = &[
    "config/production.py",
    "config/development.py",
    "config/test.py",
    "settings/production.py",
    "settings/test.py",
    ".env.production",
    ".env.test",
    "config.production.yaml",
    "config.test.yaml",
];

const ENV_SWITCHES: &[&str] = &[
    "os.getenv('ENV'",
    "os.environ.get('ENVIRONMENT'",
    "os.getenv('APP_ENV'",
    "os.environ['ENV']",
    "settings_module",
    "DJANGO_SETTINGS_MODULE",
];

const PROMPTFOO_CONFIGS: &[&str] = &[
    "promptfooconfig.yaml",
    "promptfooconfig.yml",
    "promptfoo.yaml",
    "promptfoo.yml",
    ".promptfoo.yaml",
    ".promptfoo.yml",
];

const SECRET_SCANNERS: &[(&[&str], &str)] = &[
    (&[".gitleaks.toml", "gitleaks.toml"], "gitleaks"),
    (&[".trufflehog.yml", "trufflehog.yml"], "trufflehog"),
];

const PROMPT_DIRS: &[&str] = &["prompt", "prompts", "templates", "prompt_templates"];
const PROMPT_GLOBS: &[&str] = &["prompt/**", "prompts/**", "templates/**", "prompt_templates/**"];
const BINARY_SUFFIXES: &[&str] = &["pyc", "pyo", "so", "dll"];
const PROMPT_FILE_LIMIT: usize = 500;

/// (pattern, kind) for credentials assigned in source
fn secret_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r#"(?i)(api[_-]?key|apikey)\s*[=:]\s*["'][^"']{10,}["']"#, "API key"),
            (r#"(?i)(secret[_-]?key|secretkey)\s*[=:]\s*["'][^"']{10,}["']"#, "Secret key"),
            (r#"(?i)(password|passwd)\s*[=:]\s*["'][^"']{4,}["']"#, "Password"),
            (r#"(?i)(token)\s*[=:]\s*["'][^"']{10,}["']"#, "Token"),
            (
                r#"(?i)(aws[_-]?access[_-]?key[_-]?id)\s*[=:]\s*["'][A-Z0-9]{16,}["']"#,
                "AWS key",
            ),
            (r"sk-[a-zA-Z0-9]{32,}", "OpenAI API key"),
            (r"ghp_[a-zA-Z0-9]{36}", "GitHub personal access token"),
            (r"gho_[a-zA-Z0-9]{36}", "GitHub OAuth token"),
        ]
        .into_iter()
        .map(|(pattern, kind)| (Regex::new(pattern).expect("valid regex"), kind))
        .collect()
    })
}

/// Looser patterns for prompt templates, where values are often unquoted
fn prompt_secret_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r#"(?i)api[_-]?key\s*[=:]\s*["']?[a-zA-Z0-9_-]{20,}"#,
            r#"(?i)secret[_-]?key\s*[=:]\s*["']?[a-zA-Z0-9_-]{20,}"#,
            r#"(?i)password\s*[=:]\s*["']?[^\s"']{8,}"#,
            r#"(?i)token\s*[=:]\s*["']?[a-zA-Z0-9_-]{20,}"#,
            r"(?i)sk-[a-zA-Z0-9]{32,}",
            r"(?i)xox[baprs]-[a-zA-Z0-9-]+",
            r"(?i)ghp_[a-zA-Z0-9]{36}",
            r"(?i)gho_[a-zA-Z0-9]{36}",
        ]
        .into_iter()
        .map(|pattern| Regex::new(pattern).expect("valid regex"))
        .collect()
    })
}

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let group = Category::SecurityAndGovernance;
    let pillar = Pillar::SecretHygiene;

    builder.register(
        CheckDescriptor::new("no_hardcoded_secrets", group, pillar)
            .describe("No credentials are hardcoded in source")
            .domain(Domain::Security),
        no_hardcoded_secrets,
    )?;
    builder.register(
        CheckDescriptor::new("sensitive_files_gitignored", group, pillar)
            .describe(".gitignore covers .env files and keys")
            .domain(Domain::Security),
        sensitive_files_gitignored,
    )?;
    builder.register(
        CheckDescriptor::new("env_example_exists", group, pillar)
            .describe("Required environment variables are documented")
            .domain(Domain::Security),
        env_example_exists,
    )?;
    builder.register(
        CheckDescriptor::new("prod_test_boundary", group, pillar)
            .describe("Production and test configuration are separated")
            .domain(Domain::Security),
        prod_test_boundary,
    )?;
    builder.register(
        CheckDescriptor::new("no_sensitive_files_committed", group, pillar)
            .describe("Credential files are not part of the checkout")
            .domain(Domain::Security),
        no_sensitive_files_committed,
    )?;
    builder.register(
        CheckDescriptor::new("promptfoo_present", group, Pillar::AgenticSecurity)
            .describe("promptfoo red-teams prompts and agent behavior"),
        promptfoo_present,
    )?;
    builder.register(
        CheckDescriptor::new("prompt_secret_scanning", group, pillar)
            .describe("Prompt templates carry no secrets"),
        prompt_secret_scanning,
    )?;
    Ok(())
}

fn is_test_path(relative: &str) -> bool {
    let lower = relative.to_lowercase();
    lower.contains("test") || lower.contains("fixture")
}

fn no_hardcoded_secrets(repo: &RepoSnapshot) -> Result<Outcome> {
    let mut findings = Vec::new();
    let mut scanned = 0;

    'scan: for extension in SCANNED_EXTENSIONS {
        for file in repo.walk(&[*extension], FILES_PER_EXTENSION) {
            let relative = repo.relative(&file);
            if is_test_path(&relative) {
                continue;
            }
            let Some(content) = repo.read_path(&file) else {
                continue;
            };
            scanned += 1;
            for (pattern, kind) in secret_patterns() {
                if pattern.is_match(&content) {
                    findings.push(format!("{relative}: potential {kind}"));
                }
            }
            if findings.len() >= MAX_SECRET_FINDINGS {
                break 'scan;
            }
        }
    }

    if findings.is_empty() {
        return Ok(Outcome::passed(format!(
            "Scanned {scanned} files, no hardcoded secrets detected"
        )));
    }
    let shown: Vec<_> = findings.iter().take(3).cloned().collect();
    Ok(Outcome::failed(
        format!(
            "Found {} potential secrets: {}",
            findings.len(),
            shown.join(", ")
        ),
        "Remove hardcoded secrets and use environment variables or a secret manager.",
    ))
}

fn sensitive_files_gitignored(repo: &RepoSnapshot) -> Result<Outcome> {
    if !repo.has_file(".gitignore") {
        return Ok(Outcome::failed(
            "No .gitignore file found",
            "Add a .gitignore file with patterns for .env, credentials, and keys.",
        ));
    }
    let content = repo.read(".gitignore").unwrap_or_default();
    if content.trim().is_empty() {
        return Ok(Outcome::failed(
            ".gitignore exists but is empty or unreadable",
            "Add patterns for sensitive files (.env, *.pem, credentials.json).",
        ));
    }

    let (found, missing): (Vec<&str>, Vec<&str>) = GITIGNORE_PATTERNS
        .iter()
        .copied()
        .partition(|p| content.contains(*p) || content.contains(&p.replace('*', "")));

    if found.len() >= 2 {
        return Ok(Outcome::passed(format!(
            ".gitignore includes sensitive patterns: {}",
            found.join(", ")
        )));
    }
    if !found.is_empty() {
        return Ok(Outcome::partial(
            format!(
                ".gitignore has some patterns ({}) but missing {}",
                found.join(", "),
                missing.join(", ")
            ),
            format!("Add {} to .gitignore.", missing.join(", ")),
        ));
    }
    Ok(Outcome::failed(
        ".gitignore missing common sensitive file patterns",
        "Add .env, *.pem, *.key patterns to .gitignore.",
    ))
}

fn env_example_exists(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(template) = repo.find_file(ENV_TEMPLATES) {
        return Ok(Outcome::passed(format!(
            "Found environment template: {template}"
        )));
    }
    for readme in README_VARIANTS {
        if repo.contains(readme, ENV_DOC_PATTERNS).is_some() {
            return Ok(Outcome::passed("README documents environment configuration"));
        }
    }
    if let Some(doc) = repo.glob(&["docs/**/config*.md"], 1)?.first() {
        let name = doc
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        return Ok(Outcome::passed(format!("Found configuration docs: {name}")));
    }
    Ok(Outcome::failed(
        "No .env.example or environment documentation found",
        "Create .env.example documenting required environment variables.",
    ))
}

fn prod_test_boundary(repo: &RepoSnapshot) -> Result<Outcome> {
    let configs: Vec<&str> = ENV_CONFIGS
        .iter()
        .copied()
        .filter(|c| repo.has_file(c))
        .collect();
    if configs.len() >= 2 {
        let shown: Vec<_> = configs.iter().take(3).copied().collect();
        return Ok(Outcome::passed(format!(
            "Found environment-specific configs: {}",
            shown.join(", ")
        )));
    }

    for file in repo.walk(&["py"], 30) {
        let Some(content) = repo.read_path(&file) else {
            continue;
        };
        if ENV_SWITCHES.iter().any(|p| content.contains(p)) {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            return Ok(Outcome::passed(format!(
                "Found environment-based config in {name}"
            )));
        }
    }
    Ok(Outcome::failed(
        "No clear prod/test boundary detected",
        "Create separate configuration files or use environment variables for prod/test separation.",
    ))
}

fn no_sensitive_files_committed(repo: &RepoSnapshot) -> Result<Outcome> {
    // A gitignored file is a local file, not a committed one
    let committed: Vec<&str> = SENSITIVE_FILES
        .iter()
        .copied()
        .filter(|f| repo.has_file(f) && !repo.is_gitignored(f))
        .collect();

    if committed.is_empty() {
        return Ok(Outcome::passed("No sensitive files found in repository"));
    }
    let listed = committed.join(", ");
    Ok(Outcome::failed(
        format!("Sensitive files committed: {listed}"),
        format!("Remove sensitive files ({listed}) and add to .gitignore."),
    ))
}

fn promptfoo_present(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(config) = repo.find_file(PROMPTFOO_CONFIGS) {
        return Ok(Outcome::passed(format!("promptfoo configured via {config}")));
    }
    if repo
        .read("package.json")
        .is_some_and(|c| c.contains("promptfoo"))
    {
        return Ok(Outcome::passed("promptfoo referenced in package.json"));
    }
    if let Some(policy) = repo.find_file(&["SECURITY.md", ".github/SECURITY.md"]) {
        if repo.contains(policy, &["red team", "prompt test"]).is_some() {
            return Ok(Outcome::partial(
                "Security docs mention red-teaming but no promptfoo config",
                "Add promptfooconfig.yaml for automated prompt testing.",
            ));
        }
    }
    Ok(Outcome::failed(
        "No promptfoo configuration found",
        "Add promptfooconfig.yaml with baseline prompt eval suite.",
    ))
}

fn prompt_secret_scanning(repo: &RepoSnapshot) -> Result<Outcome> {
    for (configs, tool) in SECRET_SCANNERS {
        if repo.find_file(configs).is_some() {
            return Ok(Outcome::passed(format!(
                "{tool} configured for secret scanning"
            )));
        }
    }

    if repo.find_dir(PROMPT_DIRS).is_none() {
        return Ok(Outcome::passed(
            "No prompt template directories found; secret scan not applicable.",
        ));
    }

    // Matches are counted, never echoed
    let mut hits = 0;
    let mut files = BTreeSet::new();
    for file in repo.glob(PROMPT_GLOBS, PROMPT_FILE_LIMIT)? {
        let binary = file
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| BINARY_SUFFIXES.contains(&e));
        if binary {
            continue;
        }
        let Some(content) = repo.read_path(&file) else {
            continue;
        };
        let found: usize = prompt_secret_patterns()
            .iter()
            .map(|p| p.find_iter(&content).count())
            .sum();
        if found > 0 {
            hits += found;
            files.insert(repo.relative(&file));
        }
    }

    if hits == 0 {
        return Ok(Outcome::passed(
            "No suspicious patterns found in prompt templates.",
        ));
    }
    let shown: Vec<_> = files.into_iter().take(3).collect();
    Ok(Outcome::failed(
        format!("{hits} potential secrets detected in files: {}", shown.join(", ")),
        "Move secrets to environment variables; add .env.example for documentation.",
    ))
}
