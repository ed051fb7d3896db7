//! Static guardrail checks: linters, formatters, type checking, hooks

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::registry::RegistryBuilder;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Confidence, Outcome, Pillar};
use anyhow::Result;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

const LINTER_CONFIGS: &[&str] = &[
    "ruff.toml",
    ".ruff.toml",
    ".flake8",
    "setup.cfg",
    ".pylintrc",
    "pylintrc",
    ".eslintrc",
    ".eslintrc.js",
    ".eslintrc.json",
    ".eslintrc.yml",
    ".eslintrc.yaml",
    "eslint.config.js",
    "eslint.config.mjs",
    ".biome.json",
    "biome.json",
    "clippy.toml",
    ".clippy.toml",
    ".golangci.yml",
    ".golangci.yaml",
    "golangci.yml",
];

const FORMATTER_CONFIGS: &[&str] = &[
    "ruff.toml",
    ".ruff.toml",
    ".style.yapf",
    "pyproject.toml",
    ".prettierrc",
    ".prettierrc.js",
    ".prettierrc.json",
    ".prettierrc.yml",
    ".prettierrc.yaml",
    "prettier.config.js",
    ".biome.json",
    "biome.json",
    "rustfmt.toml",
    ".rustfmt.toml",
];

const PYTHON_TYPE_CONFIGS: &[&str] = &["mypy.ini", ".mypy.ini", "pyrightconfig.json", "pyright.json"];
const JS_TYPE_CONFIGS: &[&str] = &["tsconfig.json", "jsconfig.json"];

const ESLINT_CONFIGS: &[&str] = &[
    ".eslintrc",
    ".eslintrc.js",
    ".eslintrc.json",
    ".eslintrc.yml",
    "eslint.config.js",
    "eslint.config.mjs",
];

const PRECOMMIT_HOOKS: &[&str] = &["ruff", "black", "mypy", "eslint", "prettier", "biome"];

/// Source directories left out of type hint coverage
const HINT_EXCLUDED_DIRS: &[&str] = &[
    "tests",
    "test",
    "__tests__",
    "migrations",
    "vendor",
    "third_party",
    "node_modules",
    ".venv",
    "venv",
    ".git",
    "__pycache__",
    "build",
    "dist",
    ".tox",
    ".nox",
];

/// Python files sampled for type hint coverage
const HINT_FILE_LIMIT: usize = 500;

const HINT_PASS_PCT: f64 = 85.0;
const HINT_PARTIAL_PCT: f64 = 70.0;

fn def_regex() -> &'static Regex {
    static DEF_RE: OnceLock<Regex> = OnceLock::new();
    DEF_RE.get_or_init(|| {
        Regex::new(r"(?ms)^[ \t]*(?:async[ \t]+)?def[ \t]+(\w+)[ \t]*\((.*?)\)[ \t]*(->)?")
            .expect("valid regex")
    })
}

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let group = Category::StaticGuardrails;

    builder.register(
        CheckDescriptor::new("linter_config_present", group, Pillar::FastGuardrails)
            .describe("A linter is configured")
            .gate_for(&[3]),
        linter_config_present,
    )?;
    builder.register(
        CheckDescriptor::new("formatter_config_present", group, Pillar::FastGuardrails)
            .describe("A code formatter is configured"),
        formatter_config_present,
    )?;
    builder.register(
        CheckDescriptor::new("typecheck_config_present", group, Pillar::TypeContracts)
            .describe("Static type checking is configured"),
        typecheck_config_present,
    )?;
    builder.register(
        CheckDescriptor::new("fast_linter", group, Pillar::FastGuardrails)
            .describe("A fast linter (ruff, biome) gives sub-second feedback")
            .gate_for(&[4]),
        fast_linter,
    )?;
    builder.register(
        CheckDescriptor::new("precommit_present", group, Pillar::FastGuardrails)
            .describe("Pre-commit hooks run guardrails before every commit")
            .weight(1.5)
            .gate_for(&[4]),
        precommit_present,
    )?;
    builder.register(
        CheckDescriptor::new("python_type_hint_coverage", group, Pillar::TypeContracts)
            .describe("Public Python functions carry type hints (70% partial, 85% full)")
            .weight(1.5)
            .gate_for(&[4, 5]),
        python_type_hint_coverage,
    )?;
    Ok(())
}

fn linter_config_present(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(config) = repo.find_file(LINTER_CONFIGS) {
        return Ok(Outcome::passed(format!("Found linter configuration: {config}")));
    }
    if repo
        .contains("pyproject.toml", &["[tool.ruff", "[tool.flake8", "[tool.pylint"])
        .is_some()
    {
        return Ok(Outcome::passed("Found linter configuration in pyproject.toml"));
    }
    if repo
        .contains("package.json", &["\"eslint\"", "\"eslintConfig\"", "\"biome\""])
        .is_some()
    {
        return Ok(Outcome::passed("Found linter configuration in package.json"));
    }
    Ok(Outcome::failed(
        "No linter configuration found",
        "Add a linter configuration (e.g., ruff.toml, .eslintrc, [tool.ruff] in pyproject.toml).",
    ))
}

fn formatter_config_present(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(config) = repo.find_file(FORMATTER_CONFIGS) {
        return Ok(Outcome::passed(format!(
            "Found formatter configuration: {config}"
        )));
    }
    if repo.contains("package.json", &["\"prettier\"", "\"biome\""]).is_some() {
        return Ok(Outcome::passed(
            "Found formatter configuration in package.json",
        ));
    }
    if repo.has_file(".editorconfig") {
        return Ok(Outcome::passed(
            "Found .editorconfig for basic formatting rules",
        ));
    }
    Ok(Outcome::failed(
        "No formatter configuration found",
        "Add a formatter configuration (e.g., [tool.ruff.format] in pyproject.toml, .prettierrc).",
    ))
}

fn typecheck_config_present(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(config) = repo.find_file(PYTHON_TYPE_CONFIGS) {
        return Ok(Outcome::passed(format!(
            "Found type checker configuration: {config}"
        )));
    }
    if let Some(config) = repo.find_file(JS_TYPE_CONFIGS) {
        return Ok(Outcome::passed(format!(
            "Found TypeScript configuration: {config}"
        )));
    }
    if repo
        .contains("pyproject.toml", &["[tool.mypy", "[tool.pyright"])
        .is_some()
    {
        return Ok(Outcome::passed(
            "Found type checker configuration in pyproject.toml",
        ));
    }
    if repo.contains("setup.cfg", &["[mypy"]).is_some() {
        return Ok(Outcome::passed("Found mypy configuration in setup.cfg"));
    }
    if repo.has_file("Cargo.toml") {
        return Ok(Outcome::passed(
            "Rust has built-in type checking via the compiler",
        ));
    }
    if repo.has_file("go.mod") {
        return Ok(Outcome::passed(
            "Go has built-in type checking via the compiler",
        ));
    }
    Ok(Outcome::failed(
        "No type checking configuration found",
        "Add type checking (e.g., mypy.ini, [tool.mypy] in pyproject.toml, tsconfig.json).",
    ))
}

fn fast_linter(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(config) = repo.find_file(&["ruff.toml", ".ruff.toml"]) {
        return Ok(Outcome::passed(format!(
            "Fast linter (ruff) configured via {config}"
        )));
    }
    if repo.toml_section("pyproject.toml", "tool.ruff").is_some() {
        return Ok(Outcome::passed(
            "Fast linter (ruff) configured in pyproject.toml",
        ));
    }
    if repo.dependency_present(&["ruff"]).is_some() {
        return Ok(Outcome::passed(
            "Ruff found in dependencies (fast linter available)",
        ));
    }
    if let Some(config) = repo.find_file(&["biome.json", ".biome.json"]) {
        return Ok(Outcome::passed(format!(
            "Fast linter (biome) configured via {config}"
        )));
    }
    if repo.dependency_present(&["@biomejs/biome", "biome"]).is_some() {
        return Ok(Outcome::passed(
            "Biome found in dependencies (fast linter available)",
        ));
    }

    // Slower alternatives earn partial credit
    if let Some(config) = repo.find_file(&[".flake8", "setup.cfg"]) {
        if repo.contains(config, &["[flake8]"]).is_some() {
            return Ok(Outcome::partial(
                "Flake8 configured (slower than ruff)",
                "Consider migrating to ruff for faster feedback loops (ruff is a drop-in replacement for flake8).",
            ));
        }
    }
    if repo.dependency_present(&["black"]).is_some() {
        return Ok(Outcome::partial(
            "Black found (formatter only, no linter)",
            "Add ruff for linting. Ruff can replace both black and flake8 with better performance.",
        ));
    }
    if repo.contains("pyproject.toml", &["[tool.flake8]"]).is_some() {
        return Ok(Outcome::partial(
            "Flake8 configured in pyproject.toml (slower than ruff)",
            "Migrate to ruff for sub-second feedback loops.",
        ));
    }
    if repo.contains("pyproject.toml", &["[tool.pylint]"]).is_some() {
        return Ok(Outcome::partial(
            "Pylint configured (significantly slower than ruff)",
            "Migrate to ruff for faster agent-friendly feedback loops.",
        ));
    }
    if let Some(config) = repo.find_file(ESLINT_CONFIGS) {
        return Ok(Outcome::partial(
            format!("ESLint configured via {config}"),
            "Consider migrating to Biome for faster lint times.",
        ));
    }

    if repo.has_file("pyproject.toml") {
        return Ok(Outcome::failed(
            "Python project detected but no fast linter configured",
            "Add ruff to pyproject.toml: [tool.ruff] with sensible defaults.",
        ));
    }
    if repo.has_file("package.json") {
        return Ok(Outcome::failed(
            "JS/TS project detected but no fast linter configured",
            "Add biome or eslint for fast linting.",
        ));
    }
    Ok(Outcome::failed(
        "No linter configuration detected",
        "Add a fast linter: ruff for Python, biome for JS/TS.",
    ))
}

fn precommit_present(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(config) = repo.find_file(&[".pre-commit-config.yaml", ".pre-commit-config.yml"]) {
        let content = repo.read(config).unwrap_or_default().to_lowercase();
        let hooks: Vec<&str> = PRECOMMIT_HOOKS
            .iter()
            .copied()
            .filter(|hook| content.contains(hook))
            .collect();
        return Ok(if hooks.is_empty() {
            Outcome::passed(format!("Pre-commit configured via {config}"))
        } else {
            Outcome::passed(format!(
                "Pre-commit configured with hooks: {}",
                hooks.join(", ")
            ))
        });
    }
    if repo.has_dir(".husky") {
        return Ok(Outcome::passed("Husky pre-commit hooks configured"));
    }
    if repo
        .contains("package.json", &["\"husky\"", "\"lint-staged\""])
        .is_some()
    {
        return Ok(Outcome::passed(
            "Husky/lint-staged configured in package.json",
        ));
    }
    if let Some(config) = repo.find_file(&["lefthook.yml", "lefthook.yaml", ".lefthook.yml"]) {
        return Ok(Outcome::passed(format!(
            "Lefthook pre-commit configured via {config}"
        )));
    }
    let manual_hook = repo
        .read(".git/hooks/pre-commit")
        .is_some_and(|hook| !hook.trim().is_empty());
    if manual_hook {
        return Ok(Outcome::partial(
            "Manual pre-commit hook found in .git/hooks",
            "Consider using pre-commit framework for easier hook management and sharing.",
        ));
    }
    if repo
        .find_file(&[
            ".github/workflows/ci.yml",
            ".github/workflows/lint.yml",
            ".gitlab-ci.yml",
        ])
        .is_some()
    {
        return Ok(Outcome::partial(
            "CI workflows found but no local pre-commit hooks",
            "Add .pre-commit-config.yaml for fast local feedback before push.",
        ));
    }
    Ok(Outcome::failed(
        "No pre-commit hooks configured",
        "Add .pre-commit-config.yaml with ruff and mypy hooks for local feedback.",
    ))
}

/// Public function counts for one Python source: (total, annotated)
fn count_type_hints(source: &str) -> (usize, usize) {
    let mut total = 0;
    let mut annotated = 0;
    for caps in def_regex().captures_iter(source) {
        let name = &caps[1];
        if name.starts_with('_') && name != "__init__" {
            continue;
        }
        total += 1;
        let has_return = caps.get(3).is_some();
        let has_param = caps[2].contains(':');
        if has_return || has_param {
            annotated += 1;
        }
    }
    (total, annotated)
}

/// True under test, vendored, virtualenv or build directories
pub(crate) fn excluded_from_hints(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .any(|c| {
            c.as_os_str()
                .to_str()
                .is_some_and(|part| HINT_EXCLUDED_DIRS.contains(&part))
        })
}

fn python_type_hint_coverage(repo: &RepoSnapshot) -> Result<Outcome> {
    let files: Vec<_> = repo
        .walk(&["py"], HINT_FILE_LIMIT)
        .into_iter()
        .filter(|p| !excluded_from_hints(&repo.relative(p)))
        .collect();

    if files.is_empty() {
        if !repo.has_file("pyproject.toml") {
            return Ok(Outcome::passed("No Python files found (non-Python project)")
                .with_confidence(Confidence::Medium));
        }
        return Ok(Outcome::failed(
            "Python project detected but no .py files found in source directories",
            "Add Python source files with type hints.",
        ));
    }

    let mut total = 0;
    let mut annotated = 0;
    // (file, missing, total)
    let mut missing: Vec<(String, usize, usize)> = Vec::new();
    for file in &files {
        let source = repo.read_path(file).unwrap_or_default();
        let (file_total, file_annotated) = count_type_hints(&source);
        total += file_total;
        annotated += file_annotated;
        if file_total > 0 && file_annotated < file_total {
            missing.push((repo.relative(file), file_total - file_annotated, file_total));
        }
    }

    if total == 0 {
        return Ok(Outcome::passed("No public functions found to check")
            .with_confidence(Confidence::Medium));
    }

    let pct = annotated as f64 / total as f64 * 100.0;
    missing.sort_by(|a, b| b.1.cmp(&a.1));
    let worst = missing
        .iter()
        .take(5)
        .map(|(file, gap, count)| format!("{file}({gap}/{count})"))
        .collect::<Vec<_>>()
        .join(", ");
    let evidence = format!(
        "Type hint coverage: {pct:.1}% ({annotated}/{total} functions). Files needing hints: {}",
        if worst.is_empty() { "none" } else { worst.as_str() }
    );

    Ok(if pct >= HINT_PASS_PCT {
        Outcome::passed(evidence)
    } else if pct >= HINT_PARTIAL_PCT {
        Outcome::partial(
            format!("{evidence} (L4 threshold met, L5 requires >=85%)"),
            "Add type hints to reach 85% coverage for Level 5.",
        )
    } else {
        Outcome::failed(
            evidence,
            format!(
                "Add type hints to public functions. Target: >=70% for Level 4, >=85% for Level 5. Current: {pct:.1}%."
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use std::fs;

    #[test]
    fn test_count_type_hints() {
        let source = r#"
def annotated(x: int) -> int:
    return x

async def returns_only() -> None:
    pass

def bare(a, b):
    pass

def _private(a):
    pass

class Foo:
    def __init__(self, value: str):
        self.value = value

    def method(
        self,
        other,
    ):
        pass
"#;
        assert_eq!(count_type_hints(source), (5, 3));
    }

    #[test]
    fn test_hint_coverage_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pkg")).unwrap();
        fs::write(
            dir.path().join("pkg/core.py"),
            "def a(x: int) -> int: ...\ndef b(x): ...\n",
        )
        .unwrap();
        let repo = RepoSnapshot::new(dir.path());
        let outcome = python_type_hint_coverage(&repo).unwrap();
        assert_eq!(outcome.status, Status::Failed);
        assert!(outcome.evidence.contains("50.0%"));
        assert!(outcome.evidence.contains("pkg/core.py(1/2)"));
    }

    #[test]
    fn test_hint_coverage_skips_tests() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tests")).unwrap();
        fs::write(dir.path().join("tests/test_x.py"), "def test_a(x): ...\n").unwrap();
        fs::write(dir.path().join("app.py"), "def run() -> None: ...\n").unwrap();
        let repo = RepoSnapshot::new(dir.path());
        let outcome = python_type_hint_coverage(&repo).unwrap();
        assert_eq!(outcome.status, Status::Passed);
        assert!(outcome.evidence.contains("(1/1 functions)"));
    }

    #[test]
    fn test_non_python_repo_passes_with_medium_confidence() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        let outcome = python_type_hint_coverage(&repo).unwrap();
        assert_eq!(outcome.status, Status::Passed);
        assert_eq!(outcome.confidence, Some(Confidence::Medium));
    }

    #[test]
    fn test_fast_linter_partial_for_flake8() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".flake8"), "[flake8]\nmax-line-length = 100\n").unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(fast_linter(&repo).unwrap().status, Status::Partial);

        fs::write(dir.path().join("ruff.toml"), "line-length = 100\n").unwrap();
        assert_eq!(fast_linter(&repo).unwrap().status, Status::Passed);
    }

    #[test]
    fn test_precommit_lists_hooks() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".pre-commit-config.yaml"),
            "repos:\n  - repo: https://github.com/astral-sh/ruff-pre-commit\n  - repo: mirrors-mypy\n",
        )
        .unwrap();
        let repo = RepoSnapshot::new(dir.path());
        let outcome = precommit_present(&repo).unwrap();
        assert_eq!(outcome.status, Status::Passed);
        assert!(outcome.evidence.contains("ruff, mypy"));
    }
}
