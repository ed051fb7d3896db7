//! Validation checks: can an agent trust a green test run on its own

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::ci::{GITHUB_WORKFLOWS, WORKFLOW_EXTENSIONS};
use crate::checks::registry::RegistryBuilder;
use crate::checks::snapshot::RepoSnapshot;
use crate::checks::testing::pytest_option;
use crate::models::{Category, Confidence, Domain, Outcome, Pillar};
use anyhow::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Test modules read per check
const TEST_FILE_LIMIT: usize = 20;
const CONFTEST_LIMIT: usize = 5;

const MOCK_PATTERNS: &[&str] = &[
    "from unittest.mock",
    "from unittest import mock",
    "@patch",
    "MagicMock",
    "mocker.",
];

const NETWORK_BLOCKING: &[&str] = &["socket", "network", "disable_socket", "block_network"];
const CASSETTE_DIRS: &[&str] = &["tests/cassettes", "cassettes", "fixtures/cassettes"];
const NETWORK_MOCK_LIBS: &[&str] = &["pytest-vcr", "pytest-socket", "responses", "httpretty"];
const NETWORK_CALLS: &[&str] = &[
    "requests.get",
    "requests.post",
    "httpx.",
    "aiohttp.",
    "urllib.request",
];
const NETWORK_MOCKS: &[&str] = &["@responses", "@httpretty", "vcr", "mock"];

const FIXTURE_DIRS: &[&str] = &["fixtures", "golden", "snapshots", "__snapshots__", "test_data"];
const SNAPSHOT_LIBS: &[&str] = &["syrupy", "pytest-snapshot", "snapshottest"];

const RANDOM_ORDER_PLUGINS: &[&str] = &["pytest-randomly", "pytest-random-order"];

const CI_TEST_COMMANDS: &[&str] = &[
    "pytest",
    "npm test",
    "cargo test",
    "go test",
    "make test",
    "npm run test",
];

/// Files or directories that only exist when coverage is collected
const COVERAGE_ARTIFACTS: &[&str] = &[
    ".coveragerc",
    "coverage.xml",
    "htmlcov",
    ".nyc_output",
    "lcov.info",
];
const COVERAGE_SETTINGS: &[&str] = &["[tool.coverage", "pytest-cov", "coverage"];

const RERUN_PLUGINS: &[&str] = &["pytest-rerunfailures", "pytest-flaky"];

fn sequential_test_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"def test_\d+\(").expect("valid regex"))
}

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let group = Category::TestFeedbackLoop;
    let pillar = Pillar::VerificationTrust;

    builder.register(
        CheckDescriptor::new("tests_isolated", group, pillar)
            .describe("Tests run in isolation through fixtures and mocks")
            .domain(Domain::Testing),
        tests_isolated,
    )?;
    builder.register(
        CheckDescriptor::new("tests_no_network_required", group, pillar)
            .describe("Unit tests run without network access")
            .domain(Domain::Testing),
        tests_no_network_required,
    )?;
    builder.register(
        CheckDescriptor::new("golden_fixtures_present", group, pillar)
            .describe("Golden fixtures or snapshots pin expected output")
            .domain(Domain::Testing),
        golden_fixtures_present,
    )?;
    builder.register(
        CheckDescriptor::new("test_ordering_independent", group, pillar)
            .describe("Tests do not depend on execution order")
            .domain(Domain::Testing),
        test_ordering_independent,
    )?;
    builder.register(
        CheckDescriptor::new("ci_enforces_tests", group, pillar)
            .describe("CI runs the tests on every change")
            .domain(Domain::Testing),
        ci_enforces_tests,
    )?;
    builder.register(
        CheckDescriptor::new("test_coverage_tracked", group, pillar)
            .describe("Test coverage is tracked")
            .domain(Domain::Testing),
        test_coverage_tracked,
    )?;
    builder.register(
        CheckDescriptor::new("flake_awareness_pytest", group, pillar)
            .describe("Flaky tests are marked or retried"),
        flake_awareness_pytest,
    )?;
    Ok(())
}

fn test_modules(repo: &RepoSnapshot) -> Result<Vec<(PathBuf, String)>> {
    Ok(repo
        .glob(&["tests/**/*.py"], TEST_FILE_LIMIT)?
        .into_iter()
        .filter_map(|path| repo.read_path(&path).map(|content| (path, content)))
        .collect())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn tests_isolated(repo: &RepoSnapshot) -> Result<Outcome> {
    let conftests = repo.glob(&["**/conftest.py"], usize::MAX)?;
    let has_fixtures = conftests
        .iter()
        .take(CONFTEST_LIMIT)
        .filter_map(|path| repo.read_path(path))
        .any(|content| content.contains("@pytest.fixture"));
    if has_fixtures {
        return Ok(Outcome::passed(format!(
            "Found pytest fixtures in {} conftest.py files",
            conftests.len()
        )));
    }

    let mocked = test_modules(repo)?
        .iter()
        .any(|(_, content)| MOCK_PATTERNS.iter().any(|p| content.contains(p)));
    if mocked {
        return Ok(Outcome::passed("Mock patterns found in test files"));
    }

    if repo.find_dir(&["tests", "test", "spec"]).is_none() {
        return Ok(Outcome::failed(
            "No tests directory found",
            "Create a tests/ directory with isolated unit tests.",
        ));
    }
    Ok(Outcome::failed(
        "Tests found but no isolation patterns detected",
        "Add pytest fixtures (conftest.py) and mocks for test isolation.",
    ))
}

fn tests_no_network_required(repo: &RepoSnapshot) -> Result<Outcome> {
    for config in ["pytest.ini", "pyproject.toml"] {
        if repo.contains(config, NETWORK_BLOCKING).is_some() {
            return Ok(Outcome::passed(format!(
                "Network blocking configured in {config}"
            )));
        }
    }
    if repo.find_dir(CASSETTE_DIRS).is_some() {
        return Ok(Outcome::passed(
            "VCR cassettes found for network request recording",
        ));
    }
    if repo.contains("pyproject.toml", NETWORK_MOCK_LIBS).is_some() {
        return Ok(Outcome::passed("Network mocking library in dependencies"));
    }

    let unmocked = test_modules(repo)?.iter().any(|(_, content)| {
        NETWORK_CALLS.iter().any(|p| content.contains(p))
            && !NETWORK_MOCKS.iter().any(|m| content.contains(m))
    });
    if unmocked {
        return Ok(Outcome::failed(
            "Tests appear to make unmocked network calls",
            "Use VCR, responses, or pytest-socket to ensure tests run offline.",
        ));
    }
    Ok(Outcome::passed("No unmocked network calls detected in tests"))
}

fn golden_fixtures_present(repo: &RepoSnapshot) -> Result<Outcome> {
    for fixture in FIXTURE_DIRS {
        let nested = format!("tests/{fixture}");
        if let Some(found) = repo.find_dir(&[nested.as_str(), *fixture]) {
            return Ok(Outcome::passed(format!("Found fixture directory: {found}")));
        }
    }

    let snapshots = repo.glob(&["**/*.snap"], usize::MAX)?;
    if !snapshots.is_empty() {
        return Ok(Outcome::passed(format!(
            "Found {} snapshot files",
            snapshots.len()
        )));
    }
    if repo.contains("pyproject.toml", SNAPSHOT_LIBS).is_some() {
        return Ok(Outcome::passed("Snapshot testing library detected"));
    }

    let data = repo.glob(&["tests/**/*.{json,yaml,yml}"], usize::MAX)?;
    if data.len() >= 2 {
        return Ok(Outcome::passed(format!(
            "Found {} data fixtures in tests",
            data.len()
        )));
    }
    Ok(Outcome::failed(
        "No golden fixtures or snapshots detected",
        "Add test fixtures in tests/fixtures/ or use snapshot testing (syrupy).",
    ))
}

fn test_ordering_independent(repo: &RepoSnapshot) -> Result<Outcome> {
    let mut red_flags = Vec::new();
    for (path, content) in test_modules(repo)? {
        let name = file_name(&path);
        if sequential_test_name().is_match(&content) {
            red_flags.push(format!("{name}: sequential test naming (test_1, test_2)"));
        }
        if content.contains("global ") {
            red_flags.push(format!("{name}: global keyword in tests"));
        }
    }

    if !red_flags.is_empty() {
        let shown: Vec<_> = red_flags.iter().take(3).cloned().collect();
        return Ok(Outcome::failed(
            format!("Order-dependent patterns: {}", shown.join(", ")),
            "Remove sequential test naming and avoid global state in tests.",
        ));
    }
    if repo.contains("pyproject.toml", RANDOM_ORDER_PLUGINS).is_some() {
        return Ok(Outcome::passed("Test randomization plugin detected"));
    }
    Ok(Outcome::passed("No order-dependent test patterns detected"))
}

fn ci_enforces_tests(repo: &RepoSnapshot) -> Result<Outcome> {
    for workflow in repo.files_in(GITHUB_WORKFLOWS, WORKFLOW_EXTENSIONS) {
        let Some(content) = repo.read_path(&workflow) else {
            continue;
        };
        if CI_TEST_COMMANDS.iter().any(|c| content.contains(c)) {
            return Ok(Outcome::passed(format!(
                "Tests enforced in {}",
                file_name(&workflow)
            )));
        }
    }
    if repo.contains(".gitlab-ci.yml", &["test"]).is_some() {
        return Ok(Outcome::passed("Tests found in .gitlab-ci.yml"));
    }
    if repo.read("Makefile").is_some_and(|c| c.contains("test:")) {
        return Ok(Outcome::partial(
            "Makefile has test target but CI enforcement unclear",
            "Run the Makefile test target from a CI workflow.",
        ));
    }
    Ok(Outcome::failed(
        "No CI test enforcement detected",
        "Add test execution to CI workflow (e.g., pytest in GitHub Actions).",
    ))
}

fn test_coverage_tracked(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(artifact) = COVERAGE_ARTIFACTS
        .iter()
        .find(|a| repo.has_file(a) || repo.has_dir(a))
    {
        return Ok(Outcome::passed(format!(
            "Coverage configuration found: {artifact}"
        )));
    }
    if repo.contains("pyproject.toml", COVERAGE_SETTINGS).is_some() {
        return Ok(Outcome::passed("Coverage configuration in pyproject.toml"));
    }
    for workflow in repo.files_in(GITHUB_WORKFLOWS, WORKFLOW_EXTENSIONS) {
        if repo.path_contains(&workflow, &["coverage"]).is_some() {
            return Ok(Outcome::passed(format!(
                "Coverage tracked in CI: {}",
                file_name(&workflow)
            )));
        }
    }
    Ok(Outcome::failed(
        "No test coverage tracking detected",
        "Add pytest-cov or coverage.py for test coverage tracking.",
    ))
}

fn flake_awareness_pytest(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(plugin) = repo.dependency_present(RERUN_PLUGINS) {
        return Ok(Outcome::passed(format!(
            "Flaky test mitigation found: {plugin}"
        )));
    }

    let retry = "Add pytest-rerunfailures for automatic flaky test retries.";
    if pytest_option(repo, "markers").is_some_and(|m| m.contains("flaky")) {
        return Ok(Outcome::partial(
            "Flaky marker configured in pytest, but no rerun tooling",
            retry,
        ));
    }
    if repo.contains("pytest.ini", &["flaky"]).is_some() {
        return Ok(Outcome::partial(
            "Flaky marker configured in pytest.ini, but no rerun tooling",
            retry,
        ));
    }

    if repo.find_dir(&["tests", "test"]).is_none() {
        return Ok(Outcome::passed(
            "No test directory found (flaky test mitigation not applicable)",
        )
        .with_confidence(Confidence::Medium));
    }
    Ok(Outcome::failed(
        "No flaky test mitigation found",
        "Add pytest-rerunfailures or pytest-flaky for flaky test handling.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_isolation_from_fixtures_or_mocks() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(tests_isolated(&repo).unwrap().evidence, "No tests directory found");

        write(dir.path(), "tests/test_api.py", "def test_api():\n    assert True\n");
        assert_eq!(
            tests_isolated(&repo).unwrap().evidence,
            "Tests found but no isolation patterns detected"
        );

        write(dir.path(), "tests/test_api.py", "from unittest.mock import patch\n");
        assert_eq!(tests_isolated(&repo).unwrap().status, Status::Passed);

        write(dir.path(), "tests/conftest.py", "@pytest.fixture\ndef client(): ...\n");
        assert_eq!(
            tests_isolated(&repo).unwrap().evidence,
            "Found pytest fixtures in 1 conftest.py files"
        );
    }

    #[test]
    fn test_unmocked_network_calls_fail() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        write(dir.path(), "tests/test_fetch.py", "requests.get('http://x')\n");
        assert_eq!(tests_no_network_required(&repo).unwrap().status, Status::Failed);

        write(
            dir.path(),
            "tests/test_fetch.py",
            "@responses.activate\ndef test_fetch():\n    requests.get('http://x')\n",
        );
        assert_eq!(tests_no_network_required(&repo).unwrap().status, Status::Passed);

        write(dir.path(), "pytest.ini", "[pytest]\naddopts = --disable-socket\n");
        assert_eq!(
            tests_no_network_required(&repo).unwrap().evidence,
            "Network blocking configured in pytest.ini"
        );
    }

    #[test]
    fn test_golden_fixtures_from_directory_or_data_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        write(dir.path(), "tests/data/one.json", "{}");
        assert_eq!(golden_fixtures_present(&repo).unwrap().status, Status::Failed);

        write(dir.path(), "tests/data/two.yaml", "a: 1\n");
        assert_eq!(
            golden_fixtures_present(&repo).unwrap().evidence,
            "Found 2 data fixtures in tests"
        );

        fs::create_dir_all(dir.path().join("tests/golden")).unwrap();
        assert_eq!(
            golden_fixtures_present(&repo).unwrap().evidence,
            "Found fixture directory: tests/golden"
        );
    }

    #[test]
    fn test_sequential_names_flag_order_dependence() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(test_ordering_independent(&repo).unwrap().status, Status::Passed);

        write(dir.path(), "tests/test_steps.py", "def test_1():\n    pass\n");
        let outcome = test_ordering_independent(&repo).unwrap();
        assert_eq!(outcome.status, Status::Failed);
        assert_eq!(
            outcome.evidence,
            "Order-dependent patterns: test_steps.py: sequential test naming (test_1, test_2)"
        );
    }

    #[test]
    fn test_ci_enforcement_levels() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(ci_enforces_tests(&repo).unwrap().status, Status::Failed);

        write(dir.path(), "Makefile", "test:\n\tpytest\n");
        assert_eq!(ci_enforces_tests(&repo).unwrap().status, Status::Partial);

        write(dir.path(), ".github/workflows/ci.yml", "steps:\n  - run: cargo test\n");
        assert_eq!(
            ci_enforces_tests(&repo).unwrap().evidence,
            "Tests enforced in ci.yml"
        );
    }

    #[test]
    fn test_coverage_artifact_directory_counts() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        assert_eq!(test_coverage_tracked(&repo).unwrap().status, Status::Failed);

        fs::create_dir_all(dir.path().join("htmlcov")).unwrap();
        assert_eq!(
            test_coverage_tracked(&repo).unwrap().evidence,
            "Coverage configuration found: htmlcov"
        );
    }

    #[test]
    fn test_flake_awareness() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoSnapshot::new(dir.path());
        let outcome = flake_awareness_pytest(&repo).unwrap();
        assert_eq!(outcome.status, Status::Passed);
        assert_eq!(outcome.confidence, Some(Confidence::Medium));

        fs::create_dir_all(dir.path().join("tests")).unwrap();
        assert_eq!(flake_awareness_pytest(&repo).unwrap().status, Status::Failed);

        write(
            dir.path(),
            "pyproject.toml",
            "[tool.pytest.ini_options]\nmarkers = [\"flaky: retried on CI\"]\n",
        );
        assert_eq!(flake_awareness_pytest(&repo).unwrap().status, Status::Partial);

        write(dir.path(), "requirements-dev.txt", "pytest-rerunfailures==14.0\n");
        assert_eq!(
            flake_awareness_pytest(&repo).unwrap().evidence,
            "Flaky test mitigation found: pytest-rerunfailures"
        );
    }
}
