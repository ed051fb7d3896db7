//! Test feedback loop checks: test discovery, timeouts, coverage, evals

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::registry::RegistryBuilder;
use crate::checks::setup::MAKEFILES;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Confidence, Outcome, Pillar};
use anyhow::Result;

const TEST_DIRECTORIES: &[&str] = &["tests", "test", "spec", "specs", "__tests__", "testing"];

const TEST_CONFIG_FILES: &[&str] = &[
    "pytest.ini",
    "pyproject.toml",
    "setup.cfg",
    "tox.ini",
    "noxfile.py",
    "jest.config.js",
    "jest.config.ts",
    "jest.config.mjs",
    "vitest.config.js",
    "vitest.config.ts",
    "karma.conf.js",
    "mocha.opts",
    ".mocharc.js",
    ".mocharc.json",
    "ava.config.js",
    "phpunit.xml",
    "phpunit.xml.dist",
];

const JEST_CONFIGS: &[&str] = &["jest.config.js", "jest.config.ts", "jest.config.mjs"];

const GOLDEN_PATTERNS: &[&str] = &[
    "tests/data/golden*.json",
    "tests/data/golden*.jsonl",
    "tests/data/golden*.csv",
    "tests/fixtures/golden*.json",
    "tests/fixtures/golden*.jsonl",
    "tests/fixtures/golden*.csv",
    "evals/test_cases*.json",
    "evals/test_cases*.jsonl",
    "evals/test_cases*.yaml",
    "evals/golden*.json",
    "evals/golden*.jsonl",
    "fixtures/golden*.json",
    "fixtures/golden*.jsonl",
    "data/golden*.json",
    "data/golden*.jsonl",
    "tests/test_cases.json",
    "tests/test_cases.jsonl",
    "prompts/test_cases*.yaml",
    "prompts/evaluations*.yaml",
];

const LLM_PACKAGES: &[&str] = &[
    "langchain",
    "openai",
    "anthropic",
    "llama-index",
    "transformers",
    "huggingface-hub",
];

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let group = Category::TestFeedbackLoop;

    builder.register(
        CheckDescriptor::new("tests_directory_or_config_exists", group, Pillar::VerificationTrust)
            .describe("A tests directory or test framework configuration exists")
            .gate_for(&[3]),
        tests_directory_or_config_exists,
    )?;
    builder.register(
        CheckDescriptor::new("test_command_detectable", group, Pillar::VerificationTrust)
            .describe("The command that runs the tests can be discovered"),
        test_command_detectable,
    )?;
    builder.register(
        CheckDescriptor::new("test_command_has_timeout", group, Pillar::VerificationSpeed)
            .describe("Test configuration bounds test duration with a timeout"),
        test_command_has_timeout,
    )?;
    builder.register(
        CheckDescriptor::new("machine_readable_coverage", group, Pillar::VerificationTrust)
            .describe("Coverage is emitted in a machine-readable format")
            .weight(1.5)
            .gate_for(&[4]),
        machine_readable_coverage,
    )?;
    builder.register(
        CheckDescriptor::new("test_splitting", group, Pillar::VerificationSpeed)
            .describe("Unit and integration tests can be run separately")
            .weight(1.5)
            .gate_for(&[4]),
        test_splitting,
    )?;
    builder.register(
        CheckDescriptor::new("eval_framework_detect", group, Pillar::EvalFrameworks)
            .describe("An evaluation framework for agent behavior is configured")
            .weight(2.0)
            .gate_for(&[5]),
        eval_framework_detect,
    )?;
    builder.register(
        CheckDescriptor::new("golden_dataset_present", group, Pillar::GoldenDatasets)
            .describe("Golden datasets exist for regression testing")
            .weight(2.0)
            .gate_for(&[5]),
        golden_dataset_present,
    )?;
    Ok(())
}

fn is_test_file(name: &str) -> bool {
    (name.starts_with("test_") && name.ends_with(".py"))
        || [
            "_test.py", ".test.js", ".test.ts", ".spec.js", ".spec.ts",
        ]
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

fn tests_directory_or_config_exists(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(dir) = repo.find_dir(TEST_DIRECTORIES) {
        let count = repo
            .list_dir(dir)
            .iter()
            .filter(|name| is_test_file(name))
            .count();
        return Ok(if count > 0 {
            Outcome::passed(format!(
                "Found test directory '{dir}' with {count} test file(s)"
            ))
        } else {
            Outcome::passed(format!("Found test directory '{dir}' (may need test files)"))
        });
    }
    if let Some(config) = repo.find_file(TEST_CONFIG_FILES) {
        return Ok(Outcome::passed(format!("Found test configuration: {config}")));
    }
    if repo.contains("package.json", &["\"test\""]).is_some() {
        return Ok(Outcome::passed("Found test script in package.json"));
    }
    Ok(Outcome::failed(
        "No test directory or configuration found",
        "Create a 'tests/' directory and add test files, or configure a test framework.",
    ))
}

fn test_command_detectable(repo: &RepoSnapshot) -> Result<Outcome> {
    if repo.contains("package.json", &["\"test\""]).is_some() {
        return Ok(Outcome::passed(
            "Test command detectable via 'npm test' or 'yarn test'",
        ));
    }
    if let Some(makefile) = repo.find_file(MAKEFILES) {
        if repo.contains(makefile, &["test:", "tests:"]).is_some() {
            return Ok(Outcome::passed("Test command detectable via 'make test'"));
        }
    }
    if repo.contains("pyproject.toml", &["[tool.pytest"]).is_some() {
        return Ok(Outcome::passed(
            "Test command detectable via 'pytest' (configured in pyproject.toml)",
        ));
    }
    if repo.has_file("pytest.ini") {
        return Ok(Outcome::passed(
            "Test command detectable via 'pytest' (pytest.ini present)",
        ));
    }
    if let Some(dir) = repo.find_dir(&["tests", "test"]) {
        return Ok(Outcome::passed(format!(
            "Test command likely 'pytest' or similar (found {dir}/ directory)"
        ))
        .with_confidence(Confidence::Medium));
    }
    if repo.has_file("Cargo.toml") {
        return Ok(Outcome::passed("Test command detectable via 'cargo test'"));
    }
    if repo.has_file("go.mod") {
        return Ok(Outcome::passed("Test command detectable via 'go test ./...'"));
    }
    Ok(Outcome::failed(
        "Test command not easily detectable",
        "Add a 'test' script to package.json, a 'test' target to Makefile, or configure pytest.",
    ))
}

fn test_command_has_timeout(repo: &RepoSnapshot) -> Result<Outcome> {
    if repo
        .contains("pyproject.toml", &["timeout", "pytest-timeout"])
        .is_some()
    {
        return Ok(Outcome::passed("Found timeout configuration in pyproject.toml"));
    }
    if repo.contains("pytest.ini", &["timeout"]).is_some() {
        return Ok(Outcome::passed("Found timeout configuration in pytest.ini"));
    }
    if let Some(requirements) = repo.find_file(&["requirements.txt", "requirements-dev.txt"]) {
        if repo.contains(requirements, &["pytest-timeout"]).is_some() {
            return Ok(Outcome::passed("Found pytest-timeout in requirements"));
        }
    }
    if repo
        .contains("package.json", &["testTimeout", "timeout"])
        .is_some()
    {
        return Ok(Outcome::passed("Found timeout configuration in package.json"));
    }
    for config in JEST_CONFIGS {
        if repo.contains(config, &["testTimeout", "timeout"]).is_some() {
            return Ok(Outcome::passed(format!(
                "Found timeout configuration in {config}"
            )));
        }
    }
    if repo.find_dir(TEST_DIRECTORIES).is_some() {
        return Ok(Outcome::failed(
            "Tests exist but no explicit timeout configuration found",
            "Add timeout configuration to prevent hanging tests (e.g., pytest-timeout, jest testTimeout).",
        ));
    }
    Ok(Outcome::failed(
        "No test timeout configuration found",
        "Configure test timeouts to prevent infinite hangs during automated runs.",
    ))
}

/// Plain text of a TOML value (strings unquoted)
fn toml_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items.iter().map(toml_text).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}

/// `[tool.pytest.ini_options]` key rendered as lowercase text
pub(crate) fn pytest_option(repo: &RepoSnapshot, key: &str) -> Option<String> {
    let section = repo.toml_section("pyproject.toml", "tool.pytest.ini_options")?;
    section.get(key).map(|v| toml_text(v).to_lowercase())
}

fn machine_readable_coverage(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(report) = repo.toml_section("pyproject.toml", "tool.coverage.report") {
        let mentions_xml = report
            .iter()
            .any(|(key, value)| key.contains("xml") || toml_text(value).contains("xml"));
        if mentions_xml {
            return Ok(Outcome::passed(
                "Coverage XML output configured in pyproject.toml",
            ));
        }
    }
    if repo
        .toml_section("pyproject.toml", "tool.coverage.xml")
        .is_some()
    {
        return Ok(Outcome::passed(
            "Coverage XML configuration found in pyproject.toml",
        ));
    }
    if let Some(addopts) = pytest_option(repo, "addopts") {
        if addopts.contains("--cov-report=xml") || addopts.contains("--cov-report xml") {
            return Ok(Outcome::passed(
                "Coverage XML output configured in pytest addopts",
            ));
        }
        if addopts.contains("--cov-report=html") {
            return Ok(Outcome::partial(
                "HTML coverage configured but not XML",
                "Add --cov-report=xml to pytest addopts for machine-readable coverage.",
            ));
        }
    }
    if repo.has_file(".coveragerc") {
        if repo.contains(".coveragerc", &["[xml]", "xml"]).is_some() {
            return Ok(Outcome::passed(
                "Coverage XML configuration found in .coveragerc",
            ));
        }
        if repo.contains(".coveragerc", &["[html]"]).is_some() {
            return Ok(Outcome::partial(
                "HTML coverage configured in .coveragerc but not XML",
                "Add [xml] section to .coveragerc for machine-readable output.",
            ));
        }
    }
    if repo.contains("setup.cfg", &["[coverage:"]).is_some()
        && repo.contains("setup.cfg", &["xml"]).is_some()
    {
        return Ok(Outcome::passed(
            "Coverage XML configuration found in setup.cfg",
        ));
    }
    if let Some(report) = repo.find_file(&["coverage.xml", "coverage/coverage.xml"]) {
        return Ok(Outcome::passed(format!("Coverage XML file found: {report}")));
    }
    if repo
        .contains("package.json", &["\"lcov\"", "\"json\"", "\"cobertura\""])
        .is_some()
    {
        return Ok(Outcome::passed(
            "Machine-readable coverage format configured in package.json",
        ));
    }
    if let Some(tool) = repo.dependency_present(&["pytest-cov", "coverage", "nyc", "c8"]) {
        return Ok(Outcome::failed(
            format!("Coverage tool ({tool}) found but XML/JSON output not configured"),
            "Add --cov-report=xml to pytest config or configure coverage.xml output.",
        ));
    }
    if repo.find_dir(&["tests", "test"]).is_none() {
        return Ok(Outcome::failed(
            "No tests or coverage configuration found",
            "Add tests with coverage reporting (pytest-cov with --cov-report=xml).",
        ));
    }
    Ok(Outcome::failed(
        "No machine-readable coverage configuration found",
        "Add pytest-cov with --cov-report=xml for machine-readable coverage artifacts.",
    ))
}

fn test_splitting(repo: &RepoSnapshot) -> Result<Outcome> {
    let mut markers: Vec<&str> = Vec::new();

    if let Some(makefile) = repo.find_file(MAKEFILES) {
        if repo
            .contains(makefile, &["test-unit", "test_unit", "unittest"])
            .is_some()
        {
            markers.push("Makefile:test-unit");
        }
        if repo
            .contains(makefile, &["test-integration", "test_integration", "test-int"])
            .is_some()
        {
            markers.push("Makefile:test-integration");
        }
    }

    if let Some(declared) = pytest_option(repo, "markers") {
        if declared.contains("unit") {
            markers.push("pytest:unit marker");
        }
        if declared.contains("integ") {
            markers.push("pytest:integration marker");
        }
        if declared.contains("slow") {
            markers.push("pytest:slow marker");
        }
    }

    for (file, label) in [("tox.ini", "tox:multiple envs"), ("noxfile.py", "nox:multiple sessions")] {
        if repo.contains(file, &["unit"]).is_some() && repo.contains(file, &["integ"]).is_some() {
            markers.push(label);
        }
    }

    if repo.has_dir("tests/unit") {
        markers.push("tests/unit/");
    }
    if repo.find_dir(&["tests/integration", "tests/e2e"]).is_some() {
        markers.push("tests/integration/ or tests/e2e/");
    }

    if repo
        .contains("package.json", &["\"test:unit\"", "\"test-unit\""])
        .is_some()
    {
        markers.push("npm:test:unit");
    }
    if repo
        .contains(
            "package.json",
            &["\"test:integration\"", "\"test:e2e\"", "\"test-integration\""],
        )
        .is_some()
    {
        markers.push("npm:test:integration");
    }

    match markers.as_slice() {
        [] => {}
        [only] => {
            return Ok(Outcome::partial(
                format!("Partial test splitting: {only}"),
                "Add both unit and integration test targets for complete splitting.",
            ))
        }
        all => {
            return Ok(Outcome::passed(format!(
                "Test splitting configured: {}",
                all.join(", ")
            )))
        }
    }

    if repo.find_dir(&["tests", "test", "__tests__"]).is_none() {
        return Ok(Outcome::failed(
            "No test directory found",
            "Create tests/ with separate unit/ and integration/ subdirectories.",
        ));
    }
    Ok(Outcome::failed(
        "No test splitting configuration found",
        "Add 'make test-unit' and 'make test-integration' targets, or use pytest markers.",
    ))
}

fn eval_framework_detect(repo: &RepoSnapshot) -> Result<Outcome> {
    let full = [
        ("deepeval", "Found DeepEval in dependencies (LLM evaluation framework)"),
        ("ragas", "Found Ragas in dependencies (RAG evaluation framework)"),
        ("langsmith", "Found LangSmith in dependencies (LLM ops & evaluation)"),
    ];
    for (package, evidence) in full {
        if repo.dependency_present(&[package]).is_some() {
            return Ok(Outcome::passed(evidence));
        }
    }

    if let Some(config) =
        repo.find_file(&["promptfooconfig.yaml", "promptfooconfig.yml", "promptfoo.yaml"])
    {
        return Ok(Outcome::passed(format!(
            "Found promptfoo configuration: {config}"
        )));
    }
    if repo.contains("package.json", &["promptfoo"]).is_some() {
        return Ok(Outcome::passed(
            "Found promptfoo in package.json dependencies",
        ));
    }

    if repo.dependency_present(&["mlflow"]).is_some() {
        return Ok(Outcome::partial(
            "Found MLflow (model tracking, limited eval capabilities)",
            "Add DeepEval or Ragas for comprehensive LLM evaluation.",
        ));
    }
    if repo.dependency_present(&["wandb"]).is_some() {
        return Ok(Outcome::partial(
            "Found W&B (experiment tracking, limited eval capabilities)",
            "Add DeepEval or Ragas for LLM-specific evaluation.",
        ));
    }
    if let Some(dir) = repo.find_dir(&["evals", "eval", "evaluations"]) {
        return Ok(Outcome::partial(
            format!("Found eval directory: {dir}"),
            "Add DeepEval or Ragas for standardized LLM evaluation metrics.",
        ));
    }
    if let Some(llm) = repo.dependency_present(LLM_PACKAGES) {
        return Ok(Outcome::failed(
            format!("LLM project detected ({llm}) but no eval framework found"),
            "Add DeepEval (pip install deepeval) or Ragas for agentic behavior testing.",
        ));
    }
    Ok(Outcome::failed(
        "No eval framework detected",
        "Add an eval framework: DeepEval for LLM testing, Ragas for RAG evaluation.",
    ))
}

fn golden_dataset_present(repo: &RepoSnapshot) -> Result<Outcome> {
    let found = repo.glob(GOLDEN_PATTERNS, 5)?;
    if !found.is_empty() {
        let names: Vec<String> = found.iter().take(3).map(|p| repo.relative(p)).collect();
        return Ok(Outcome::passed(format!(
            "Found golden dataset(s): {}",
            names.join(", ")
        )));
    }

    for dir in ["tests/fixtures", "tests/data", "fixtures", "evals"] {
        let data = repo.files_in(dir, &["json", "jsonl"]);
        if !data.is_empty() {
            return Ok(Outcome::partial(
                format!("Found test data in {dir}/ ({} JSON files)", data.len()),
                "Consider naming files with 'golden' prefix for clarity.",
            ));
        }
    }

    for config in ["promptfooconfig.yaml", "promptfoo.yaml"] {
        if repo.contains(config, &["tests:", "test:"]).is_some() {
            return Ok(Outcome::partial(
                format!("Found test cases in {config}"),
                "Extract test cases to dedicated golden dataset files.",
            ));
        }
    }

    if repo.find_dir(&["evals", "eval"]).is_some() {
        return Ok(Outcome::failed(
            "Found evals directory but no golden test datasets",
            "Add golden dataset files (e.g., tests/data/golden_cases.json) for regression testing.",
        ));
    }
    if let Some(llm) = repo.dependency_present(&[
        "langchain",
        "openai",
        "anthropic",
        "llama-index",
        "deepeval",
        "ragas",
    ]) {
        return Ok(Outcome::failed(
            format!("LLM project detected ({llm}) but no golden datasets found"),
            "Create tests/data/golden_cases.json with expected inputs/outputs for regression testing.",
        ));
    }
    Ok(Outcome::failed(
        "No golden test datasets found",
        "Add golden datasets (e.g., tests/data/golden_cases.json) with expected outcomes.",
    ))
}
