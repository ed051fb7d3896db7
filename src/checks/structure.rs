//! Structure checks: what the repo is, how it runs, and where things live

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::ci::{GITHUB_WORKFLOWS, WORKFLOW_EXTENSIONS};
use crate::checks::discoverability::README_FILES;
use crate::checks::guardrails::excluded_from_hints;
use crate::checks::registry::RegistryBuilder;
use crate::checks::setup::MAKEFILES;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Confidence, Domain, Outcome, Pillar};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

const EXTRA_READMES: &[&str] = &["README.rst", "README.txt"];

const PURPOSE_PATTERNS: &[&str] = &[
    "## what",
    "## about",
    "## overview",
    "## description",
    "## purpose",
    "## introduction",
    "# about",
    "a tool",
    "a library",
    "a framework",
    "a cli",
    "an application",
    "this project",
    "this repo",
];

const EXECUTION_PATTERNS: &[&str] = &[
    "## install",
    "## setup",
    "## usage",
    "## getting started",
    "## quick start",
    "## quickstart",
    "## running",
    "## how to use",
    "pip install",
    "npm install",
    "cargo install",
    "go install",
];

const SOURCE_DIRS: &[&str] = &["src", "lib", "app"];

/// Root files every project is allowed to carry
const STANDARD_ROOT_FILES: &[&str] = &[
    "README.md",
    "LICENSE",
    "CHANGELOG.md",
    "pyproject.toml",
    "package.json",
    "Makefile",
    "Dockerfile",
    "setup.py",
    "setup.cfg",
];

const MAX_EXTRA_ROOT_FILES: usize = 10;
const MAX_ROOT_DIRS: usize = 15;

const MAX_SCRIPTS: usize = 5;
const MAX_NOTEBOOKS: usize = 3;
/// Roughly 300 lines; standard multi-job workflows stay well below it
const MAX_WORKFLOW_BYTES: usize = 15_000;

const DOCS_DIRS: &[&str] = &["docs", "doc", "documentation"];

const DIATAXIS: &[(&str, &[&str])] = &[
    ("tutorials", &["tutorials", "tutorial", "getting-started", "quickstart"]),
    ("how-to", &["how-to", "howto", "guides", "guide", "recipes"]),
    ("reference", &["reference", "api", "api-reference"]),
    ("explanation", &["explanation", "concepts", "background", "architecture"]),
];

/// Doc pages read for Diátaxis keywords
const DOC_PAGES_READ: usize = 5;

const DOCSTRING_FILE_LIMIT: usize = 500;
const DOCSTRING_PASS_PCT: f64 = 80.0;
const DOCSTRING_PARTIAL_PCT: f64 = 50.0;

fn package_name_regex() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| Regex::new(r#"name\s*=\s*"([^"]+)""#).expect("valid regex"))
}

fn declaration_regex() -> &'static Regex {
    static DECL_RE: OnceLock<Regex> = OnceLock::new();
    DECL_RE.get_or_init(|| {
        Regex::new(r"^[ \t]*(?:async[ \t]+)?(?:def|class)[ \t]+(\w+)").expect("valid regex")
    })
}

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let group = Category::Discoverability;
    let pillar = Pillar::DocumentationStructure;

    builder.register(
        CheckDescriptor::new("readme_answers_what", group, pillar)
            .describe("README explains what the repository does")
            .domain(Domain::Structure),
        readme_answers_what,
    )?;
    builder.register(
        CheckDescriptor::new("readme_answers_how", group, pillar)
            .describe("README explains how to install and run it")
            .domain(Domain::Structure),
        readme_answers_how,
    )?;
    builder.register(
        CheckDescriptor::new("predictable_layout", group, pillar)
            .describe("Source and tests live in conventional directories")
            .domain(Domain::Structure),
        predictable_layout,
    )?;
    builder.register(
        CheckDescriptor::new("entrypoint_clear", group, Pillar::DistributionDx)
            .describe("The program has an obvious entry point")
            .domain(Domain::Structure),
        entrypoint_clear,
    )?;
    builder.register(
        CheckDescriptor::new("no_hidden_critical_logic", group, pillar)
            .describe("Logic lives in source, not in scripts, notebooks or CI files")
            .domain(Domain::Structure),
        no_hidden_critical_logic,
    )?;
    builder.register(
        CheckDescriptor::new("file_tree_organized", group, pillar)
            .describe("The repository root is not cluttered")
            .domain(Domain::Structure),
        file_tree_organized,
    )?;
    builder.register(
        CheckDescriptor::new("diataxis_structure", group, pillar)
            .describe("Docs are split into tutorials, how-to, reference and explanation"),
        diataxis_structure,
    )?;
    builder.register(
        CheckDescriptor::new("docstring_coverage_python", group, Pillar::InlineDocumentation)
            .describe("Public Python functions and classes carry docstrings"),
        docstring_coverage_python,
    )?;
    Ok(())
}

/// README path and content; `Err` holds the outcome for a missing or empty one
fn readme(repo: &RepoSnapshot, missing: &str, empty: &str) -> Result<String, Outcome> {
    let Some(path) = repo
        .find_file(README_FILES)
        .or_else(|| repo.find_file(EXTRA_READMES))
    else {
        return Err(Outcome::failed("No README found", missing));
    };
    match repo.read(path) {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(Outcome::failed("README exists but is empty or unreadable", empty)),
    }
}

fn readme_answers_what(repo: &RepoSnapshot) -> Result<Outcome> {
    let content = match readme(
        repo,
        "Add a README.md explaining what this repository does.",
        "Add content to README explaining the project purpose.",
    ) {
        Ok(content) => content,
        Err(outcome) => return Ok(outcome),
    };

    let lower = content.to_lowercase();
    if let Some(pattern) = PURPOSE_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Ok(Outcome::passed(format!(
            "README contains purpose indicator: '{pattern}'"
        )));
    }

    let opening: String = content.chars().take(500).collect();
    if opening.split_whitespace().count() > 20 {
        return Ok(Outcome::partial(
            "README has content but purpose section not clearly marked",
            "Add an Overview or About section stating what the project does.",
        ));
    }
    Ok(Outcome::failed(
        "README doesn't clearly explain what the repo does",
        "Add a clear description of the project's purpose in the README.",
    ))
}

fn readme_answers_how(repo: &RepoSnapshot) -> Result<Outcome> {
    let content = match readme(
        repo,
        "Add a README.md with installation and usage instructions.",
        "Add installation and usage instructions to README.",
    ) {
        Ok(content) => content,
        Err(outcome) => return Ok(outcome),
    };

    let lower = content.to_lowercase();
    if let Some(pattern) = EXECUTION_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Ok(Outcome::passed(format!(
            "README contains execution instructions: '{pattern}'"
        )));
    }
    Ok(Outcome::failed(
        "README doesn't explain how to run/install",
        "Add Installation and Usage sections to README.",
    ))
}

fn predictable_layout(repo: &RepoSnapshot) -> Result<Outcome> {
    let mut has_source = repo.find_dir(SOURCE_DIRS).is_some();
    if !has_source {
        // Package-style layout: a directory named after the project
        has_source = repo
            .read("pyproject.toml")
            .and_then(|content| {
                package_name_regex()
                    .captures(&content)
                    .map(|caps| caps[1].replace('-', "_"))
            })
            .is_some_and(|package| repo.has_dir(&package));
    }
    let has_tests = repo.find_dir(&["tests", "test"]).is_some();

    if has_source && has_tests {
        return Ok(Outcome::passed(
            "Standard layout detected (source + tests directories)",
        ));
    }
    if has_source {
        return Ok(Outcome::partial(
            "Source directory found but tests directory missing",
            "Add a tests/ directory next to the source.",
        ));
    }
    if !repo.glob(&["*/__init__.py"], 1)?.is_empty() {
        return Ok(Outcome::passed("Python package structure detected"));
    }
    Ok(Outcome::failed(
        "Non-standard directory layout",
        "Organize code into src/ or package_name/ with tests/ directory.",
    ))
}

fn entrypoint_clear(repo: &RepoSnapshot) -> Result<Outcome> {
    if repo.contains("pyproject.toml", &["[project.scripts]"]).is_some() {
        return Ok(Outcome::passed(
            "CLI entry point defined in pyproject.toml [project.scripts]",
        ));
    }
    if let Some(main) = repo.glob(&["**/__main__.py"], 1)?.first() {
        return Ok(Outcome::passed(format!("Entry point: {}", repo.relative(main))));
    }
    if let Some(main) = repo.find_file(&["main.py", "src/main.py", "app/main.py"]) {
        return Ok(Outcome::passed(format!("Entry point: {main}")));
    }
    if repo.contains("package.json", &["\"main\"", "\"bin\""]).is_some() {
        return Ok(Outcome::passed("Entry point defined in package.json"));
    }
    if let Some(makefile) = repo.find_file(MAKEFILES) {
        if repo.contains(makefile, &["run:", "start:"]).is_some() {
            return Ok(Outcome::passed("Entry point via Makefile run/start target"));
        }
    }
    Ok(Outcome::failed(
        "No clear entry point found",
        "Define entry points in pyproject.toml [project.scripts] or add __main__.py.",
    ))
}

fn no_hidden_critical_logic(repo: &RepoSnapshot) -> Result<Outcome> {
    let mut red_flags = Vec::new();

    let scripts = repo.files_in("scripts", &["py", "sh"]).len();
    if scripts > MAX_SCRIPTS {
        red_flags.push(format!("Large scripts/ directory ({scripts} files)"));
    }

    let notebooks = repo.walk(&["ipynb"], 1_000).len();
    if notebooks > MAX_NOTEBOOKS {
        red_flags.push(format!("Multiple notebooks ({notebooks}) may contain logic"));
    }

    for workflow in repo.files_in(GITHUB_WORKFLOWS, WORKFLOW_EXTENSIONS) {
        let size = repo.read_path(&workflow).map_or(0, |c| c.len());
        if size > MAX_WORKFLOW_BYTES {
            let name = workflow
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            red_flags.push(format!("Very large CI file: {name}"));
        }
    }

    if red_flags.is_empty() {
        return Ok(Outcome::passed("No significant hidden logic detected"));
    }
    Ok(Outcome::failed(
        format!("Potential hidden logic: {}", red_flags.join(", ")),
        "Move critical logic from scripts/notebooks/CI into main source code.",
    ))
}

fn file_tree_organized(repo: &RepoSnapshot) -> Result<Outcome> {
    let visible: Vec<String> = repo
        .list_dir("")
        .into_iter()
        .filter(|name| !name.starts_with('.'))
        .collect();
    let (files, dirs): (Vec<&String>, Vec<&String>) = visible
        .iter()
        .partition(|name| repo.root().join(name.as_str()).is_file());

    let extra = files
        .iter()
        .filter(|name| !STANDARD_ROOT_FILES.contains(&name.as_str()))
        .count();
    if extra > MAX_EXTRA_ROOT_FILES {
        return Ok(Outcome::failed(
            format!("Too many files at root level ({extra} non-standard files)"),
            "Organize files into subdirectories (src/, docs/, etc.).",
        ));
    }
    if dirs.len() > MAX_ROOT_DIRS {
        return Ok(Outcome::failed(
            format!("Too many directories at root ({})", dirs.len()),
            "Consolidate related directories for cleaner structure.",
        ));
    }
    Ok(Outcome::passed(format!(
        "Organized structure: {} root files, {} directories",
        files.len(),
        dirs.len()
    )))
}

fn diataxis_structure(repo: &RepoSnapshot) -> Result<Outcome> {
    let Some(docs) = repo.find_dir(DOCS_DIRS) else {
        if let Some(mkdocs) = repo.find_file(&["mkdocs.yml", "mkdocs.yaml"]) {
            return Ok(Outcome::partial(
                format!("{mkdocs} configured but no docs/ directory found"),
                "Create docs/ with Diátaxis structure (tutorials/, how-to/, reference/, explanation/).",
            ));
        }
        return Ok(Outcome::failed(
            "No documentation directory found",
            "Create docs/ directory with Diátaxis structure (tutorials/, how-to/, reference/, explanation/).",
        ));
    };

    let mut subdirs = Vec::new();
    let mut stems = Vec::new();
    for name in repo.list_dir(docs) {
        let path = repo.root().join(docs).join(&name);
        let lower = name.to_lowercase();
        if path.is_dir() {
            subdirs.push(lower);
        } else if path.is_file() {
            let stem = lower.rsplit_once('.').map_or(lower.as_str(), |(s, _)| s).to_string();
            stems.push(stem);
        }
    }
    let pages = repo.files_in(docs, &["md", "rst"]);
    let page_text: Vec<String> = pages
        .iter()
        .take(DOC_PAGES_READ)
        .filter_map(|p| repo.read_path(p))
        .map(|c| c.to_lowercase())
        .collect();

    let found: Vec<&str> = DIATAXIS
        .iter()
        .filter(|(_, patterns)| {
            patterns.iter().any(|p| {
                subdirs.iter().any(|d| d == p)
                    || stems.iter().any(|s| s.contains(p))
                    || page_text.iter().any(|t| t.contains(p))
            })
        })
        .map(|(category, _)| *category)
        .collect();
    let listed = found.join(", ");

    Ok(match found.len() {
        n if n >= 3 => Outcome::passed(format!("Diátaxis structure detected: {listed}")),
        2 => Outcome::partial(
            format!("Partial Diátaxis structure: {listed}"),
            "Add the missing Diátaxis categories: tutorials, how-to, reference, explanation.",
        ),
        1 => Outcome::partial(
            format!("Minimal documentation structure: {listed}"),
            "Expand docs with Diátaxis structure (tutorials/, how-to/, reference/, explanation/).",
        ),
        _ if !pages.is_empty() => Outcome::partial(
            format!("Found {} doc files but no Diátaxis structure", pages.len()),
            "Organize docs into tutorials/, how-to/, reference/, explanation/.",
        ),
        _ => Outcome::failed(
            "Documentation directory exists but is empty or unstructured",
            "Add documentation with Diátaxis structure.",
        ),
    })
}

/// (public declarations, declarations whose body opens with a string)
fn count_docstrings(source: &str) -> (usize, usize) {
    let lines: Vec<&str> = source.lines().collect();
    let mut total = 0;
    let mut documented = 0;
    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = declaration_regex().captures(line) else {
            continue;
        };
        let name = &caps[1];
        if name.starts_with('_') && name != "__init__" {
            continue;
        }
        total += 1;

        // Signatures may wrap; the header ends at the first line ending in ':'
        let header_end = lines[i..]
            .iter()
            .take(20)
            .position(|l| code_part(l).trim_end().ends_with(':'))
            .map_or(i, |offset| i + offset);
        let first_statement = lines[header_end + 1..]
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty() && !l.starts_with('#'));
        if first_statement.is_some_and(opens_string) {
            documented += 1;
        }
    }
    (total, documented)
}

fn code_part(line: &str) -> &str {
    line.split('#').next().unwrap_or(line)
}

fn opens_string(statement: &str) -> bool {
    let unprefixed = statement.trim_start_matches(['r', 'R', 'u', 'U', 'b', 'B', 'f', 'F']);
    unprefixed.starts_with('"') || unprefixed.starts_with('\'')
}

fn docstring_coverage_python(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(interrogate) = repo.toml_section("pyproject.toml", "tool.interrogate") {
        let fail_under = interrogate
            .get("fail-under")
            .map_or_else(|| "0".to_string(), |v| v.to_string());
        return Ok(Outcome::passed(format!(
            "Interrogate configured with fail-under={fail_under}%"
        )));
    }
    if repo.dependency_present(&["interrogate"]).is_some() {
        return Ok(Outcome::passed(
            "Interrogate found in dependencies (docstring coverage enforced)",
        ));
    }

    let files: Vec<_> = repo
        .walk(&["py"], DOCSTRING_FILE_LIMIT)
        .into_iter()
        .filter(|p| !excluded_from_hints(&repo.relative(p)))
        .collect();
    if files.is_empty() {
        if !repo.has_file("pyproject.toml") {
            return Ok(Outcome::passed("No Python files found (non-Python project)")
                .with_confidence(Confidence::Medium));
        }
        return Ok(Outcome::failed(
            "Python project detected but no .py files found",
            "Add Python source files with docstrings.",
        ));
    }

    let mut total = 0;
    let mut documented = 0;
    let mut missing: Vec<(String, usize, usize)> = Vec::new();
    for file in &files {
        let source = repo.read_path(file).unwrap_or_default();
        let (file_total, file_documented) = count_docstrings(&source);
        total += file_total;
        documented += file_documented;
        if file_documented < file_total {
            missing.push((repo.relative(file), file_total - file_documented, file_total));
        }
    }
    if total == 0 {
        return Ok(Outcome::passed("No public functions/classes found to document")
            .with_confidence(Confidence::Medium));
    }

    let coverage = documented as f64 / total as f64 * 100.0;
    missing.sort_by(|a, b| b.1.cmp(&a.1));
    let worst: Vec<String> = missing
        .iter()
        .take(5)
        .map(|(file, gap, of)| format!("{file}({gap}/{of})"))
        .collect();
    let evidence = format!(
        "Docstring coverage: {coverage:.1}% ({documented}/{total} items). Files needing docs: {}",
        if worst.is_empty() { "none".to_string() } else { worst.join(", ") }
    );

    Ok(if coverage >= DOCSTRING_PASS_PCT {
        Outcome::passed(evidence)
    } else if coverage >= DOCSTRING_PARTIAL_PCT {
        Outcome::partial(
            evidence,
            "Add docstrings to more public APIs. Target: ≥80% for best agent experience.",
        )
    } else {
        Outcome::failed(
            evidence,
            format!("Add docstrings to public functions/classes. Current: {coverage:.1}%. Target: ≥50%."),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use std::fs;

    fn write(root: &std::path::Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_readme_purpose_and_usage() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(readme_answers_what(&repo).unwrap().status, Status::Failed);

        write(dir.path(), "README.md", "# Demo\n\nThis project audits repos.\n\n## Usage\n\nRun it.\n");
        let what = readme_answers_what(&repo).unwrap();
        assert_eq!(what.status, Status::Passed);
        assert!(what.evidence.contains("this project"));
        assert_eq!(readme_answers_how(&repo).unwrap().status, Status::Passed);

        let words = "word ".repeat(30);
        write(dir.path(), "README.md", &format!("# Demo\n\n{words}\n"));
        assert_eq!(readme_answers_what(&repo).unwrap().status, Status::Partial);
        assert_eq!(readme_answers_how(&repo).unwrap().status, Status::Failed);
    }

    #[test]
    fn test_layout_from_package_name() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(predictable_layout(&repo).unwrap().status, Status::Failed);

        write(dir.path(), "pyproject.toml", "[project]\nname = \"my-tool\"\n");
        write(dir.path(), "my_tool/core.py", "x = 1\n");
        assert_eq!(predictable_layout(&repo).unwrap().status, Status::Partial);

        fs::create_dir_all(dir.path().join("tests")).unwrap();
        assert_eq!(predictable_layout(&repo).unwrap().status, Status::Passed);
    }

    #[test]
    fn test_entrypoint_sources() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(entrypoint_clear(&repo).unwrap().status, Status::Failed);

        write(dir.path(), "Makefile", "run:\n\tpython -m app\n");
        assert!(entrypoint_clear(&repo).unwrap().evidence.contains("Makefile"));

        write(dir.path(), "pkg/__main__.py", "main()\n");
        let outcome = entrypoint_clear(&repo).unwrap();
        assert_eq!(outcome.evidence, "Entry point: pkg/__main__.py");
    }

    #[test]
    fn test_hidden_logic_flags_scripts_and_notebooks() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(no_hidden_critical_logic(&repo).unwrap().status, Status::Passed);

        for i in 0..6 {
            write(dir.path(), &format!("scripts/job{i}.sh"), "echo\n");
        }
        for i in 0..4 {
            write(dir.path(), &format!("notebooks/n{i}.ipynb"), "{}\n");
        }
        let outcome = no_hidden_critical_logic(&repo).unwrap();
        assert_eq!(outcome.status, Status::Failed);
        assert!(outcome.evidence.contains("scripts/ directory (6 files)"));
        assert!(outcome.evidence.contains("Multiple notebooks (4)"));
    }

    #[test]
    fn test_cluttered_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        write(dir.path(), "README.md", "# x\n");
        write(dir.path(), ".env", "");
        fs::create_dir_all(dir.path().join("src")).unwrap();
        let outcome = file_tree_organized(&repo).unwrap();
        assert_eq!(outcome.status, Status::Passed);
        assert_eq!(outcome.evidence, "Organized structure: 1 root files, 1 directories");

        for i in 0..11 {
            write(dir.path(), &format!("notes{i}.txt"), "");
        }
        assert_eq!(file_tree_organized(&repo).unwrap().status, Status::Failed);
    }

    #[test]
    fn test_diataxis_categories() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(diataxis_structure(&repo).unwrap().status, Status::Failed);

        write(dir.path(), "mkdocs.yml", "site_name: x\n");
        assert_eq!(diataxis_structure(&repo).unwrap().status, Status::Partial);

        fs::create_dir_all(dir.path().join("docs/tutorials")).unwrap();
        fs::create_dir_all(dir.path().join("docs/reference")).unwrap();
        let outcome = diataxis_structure(&repo).unwrap();
        assert_eq!(outcome.status, Status::Partial);
        assert_eq!(outcome.evidence, "Partial Diátaxis structure: tutorials, reference");

        write(dir.path(), "docs/architecture.md", "# Design\n");
        let outcome = diataxis_structure(&repo).unwrap();
        assert_eq!(outcome.status, Status::Passed);
        assert!(outcome.evidence.contains("explanation"));
    }

    #[test]
    fn test_docstring_counting() {
        let source = r#"
class Widget:
    """A widget."""

    def __init__(self):
        self.x = 1

    def render(
        self,
        width: int,
    ) -> str:
        # comment first
        r"""Render it."""
        return ""

    def _private(self):
        pass

async def fetch():
    return 1
"#;
        assert_eq!(count_docstrings(source), (4, 2));
    }

    #[test]
    fn test_docstring_coverage_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        let outcome = docstring_coverage_python(&repo).unwrap();
        assert_eq!(outcome.status, Status::Passed);
        assert_eq!(outcome.confidence, Some(Confidence::Medium));

        write(
            dir.path(),
            "pkg/api.py",
            "def a():\n    \"\"\"Doc.\"\"\"\n\ndef b():\n    return 1\n",
        );
        // Tests are not part of the public surface
        write(dir.path(), "tests/test_api.py", "def test_a():\n    pass\n");
        let outcome = docstring_coverage_python(&repo).unwrap();
        assert_eq!(outcome.status, Status::Partial);
        assert!(outcome.evidence.contains("50.0% (1/2 items)"));
        assert!(outcome.evidence.contains("pkg/api.py(1/2)"));

        write(dir.path(), "pyproject.toml", "[tool.interrogate]\nfail-under = 90\n");
        let outcome = docstring_coverage_python(&repo).unwrap();
        assert_eq!(outcome.status, Status::Passed);
        assert_eq!(outcome.evidence, "Interrogate configured with fail-under=90%");
    }
}
