//! Observability checks: logging, error types, tracing

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::registry::RegistryBuilder;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Outcome, Pillar};
use anyhow::Result;
use std::path::PathBuf;

/// Source files sampled per language when searching for usage
const SAMPLE_LIMIT: usize = 50;
const JSON_LOGGING_SAMPLE: usize = 30;

const LOGGING_CONFIGS: &[&str] = &[
    "logging.conf",
    "logging.ini",
    "logging.yaml",
    "logging.yml",
    "log_config.py",
];

const ERROR_MODULES: &[&str] = &[
    "errors.py",
    "exceptions.py",
    "error.py",
    "exception.py",
    "errors/__init__.py",
    "exceptions/__init__.py",
    "src/errors.py",
    "src/exceptions.py",
    "src/error.py",
    "src/exception.py",
    "src/errors/__init__.py",
    "src/exceptions/__init__.py",
];

const OTEL_CONFIGS: &[&str] = &[
    "otel-collector-config.yaml",
    "otel-collector-config.yml",
    "opentelemetry.yaml",
    "tracing.yaml",
];

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let group = Category::Observability;

    builder.register(
        CheckDescriptor::new("logging_present", group, Pillar::StructuredLoggingCost)
            .describe("Logging infrastructure is present"),
        logging_present,
    )?;
    builder.register(
        CheckDescriptor::new("structured_errors_present", group, Pillar::StructuredLoggingCost)
            .describe("Errors are raised and handled through structured types"),
        structured_errors_present,
    )?;
    builder.register(
        CheckDescriptor::new("opentelemetry_present", group, Pillar::TelemetryTracing)
            .describe("OpenTelemetry instrumentation is configured")
            .weight(2.0)
            .gate_for(&[5]),
        opentelemetry_present,
    )?;
    builder.register(
        CheckDescriptor::new("structured_logging_present", group, Pillar::StructuredLoggingCost)
            .describe("Logs are emitted in a structured (JSON) format")
            .weight(1.5)
            .gate_for(&[5]),
        structured_logging_present,
    )?;
    Ok(())
}

/// First sampled source file containing any pattern, as a relative path
fn first_source_with(
    repo: &RepoSnapshot,
    files: &[PathBuf],
    patterns: &[&str],
) -> Option<String> {
    files
        .iter()
        .find(|f| repo.path_contains(f, patterns).is_some())
        .map(|f| repo.relative(f))
}

fn logging_present(repo: &RepoSnapshot) -> Result<Outcome> {
    let py = repo.walk(&["py"], SAMPLE_LIMIT);
    if let Some(file) = first_source_with(
        repo,
        &py,
        &["import logging", "from logging", "getLogger", "structlog"],
    ) {
        return Ok(Outcome::passed(format!("Found logging usage in {file}")));
    }
    if let Some(config) = repo.find_file(LOGGING_CONFIGS) {
        return Ok(Outcome::passed(format!("Found logging configuration: {config}")));
    }
    if repo
        .contains("pyproject.toml", &["structlog", "loguru", "logging"])
        .is_some()
    {
        return Ok(Outcome::passed("Found logging dependency in pyproject.toml"));
    }
    if repo
        .contains("requirements.txt", &["structlog", "loguru", "python-json-logger"])
        .is_some()
    {
        return Ok(Outcome::passed("Found logging library in requirements.txt"));
    }
    let js = repo.walk(&["js", "ts"], SAMPLE_LIMIT);
    if let Some(file) = first_source_with(
        repo,
        &js,
        &["console.log", "winston", "pino", "bunyan", "log4js"],
    ) {
        return Ok(Outcome::passed(format!("Found logging usage in {file}")));
    }
    if repo
        .contains("package.json", &["winston", "pino", "bunyan", "log4js"])
        .is_some()
    {
        return Ok(Outcome::passed("Found logging library in package.json"));
    }
    if repo.contains("Cargo.toml", &["tracing", "log ="]).is_some() {
        return Ok(Outcome::passed("Found logging crate in Cargo.toml"));
    }
    Ok(Outcome::failed(
        "No logging infrastructure found",
        "Add logging to your application (e.g., Python logging, structlog, winston for Node.js).",
    ))
}

fn structured_errors_present(repo: &RepoSnapshot) -> Result<Outcome> {
    let py = repo.walk(&["py"], SAMPLE_LIMIT);
    if let Some(file) = first_source_with(
        repo,
        &py,
        &["(Exception)", "(Error)", "raise ", "except ", "@dataclass", "pydantic"],
    ) {
        return Ok(Outcome::passed(format!(
            "Found structured error handling in {file}"
        )));
    }
    if let Some(module) = repo.find_file(ERROR_MODULES) {
        return Ok(Outcome::passed(format!("Found error module: {module}")));
    }
    let ts = repo.walk(&["ts"], SAMPLE_LIMIT);
    if let Some(file) = first_source_with(repo, &ts, &["extends Error", "Error {", "Error<"]) {
        return Ok(Outcome::passed(format!(
            "Found structured error handling in {file}"
        )));
    }
    if repo.contains("Cargo.toml", &["thiserror", "anyhow"]).is_some() {
        return Ok(Outcome::passed(
            "Found Rust error handling libraries (thiserror/anyhow)",
        ));
    }
    let go = repo.walk(&["go"], SAMPLE_LIMIT);
    if let Some(file) = first_source_with(repo, &go, &["errors.New", "fmt.Errorf"]) {
        return Ok(Outcome::passed(format!("Found error handling in {file}")));
    }
    Ok(Outcome::failed(
        "No structured error handling found",
        "Add custom exception classes or structured error types for better error handling.",
    ))
}

fn opentelemetry_present(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(package) = repo.dependency_present(&[
        "opentelemetry-sdk",
        "opentelemetry-api",
        "opentelemetry",
        "opentelemetry-instrumentation",
    ]) {
        return Ok(Outcome::passed(format!(
            "Found OpenTelemetry dependency: {package}"
        )));
    }
    if repo
        .contains("package.json", &["@opentelemetry/", "\"opentelemetry-"])
        .is_some()
    {
        return Ok(Outcome::passed(
            "Found OpenTelemetry JS/TS dependencies in package.json",
        ));
    }
    if let Some(config) = repo.find_file(OTEL_CONFIGS) {
        return Ok(Outcome::passed(format!(
            "Found OpenTelemetry configuration: {config}"
        )));
    }
    if repo
        .dependency_present(&["jaeger", "zipkin", "jaeger-client"])
        .is_some()
    {
        return Ok(Outcome::partial(
            "Found alternative tracing (Jaeger/Zipkin), not OpenTelemetry",
            "Consider migrating to OpenTelemetry for vendor-neutral tracing.",
        ));
    }
    if repo
        .dependency_present(&["aws-xray-sdk", "aws_xray_sdk"])
        .is_some()
    {
        return Ok(Outcome::partial(
            "Found AWS X-Ray for tracing",
            "Consider adding OpenTelemetry for vendor-neutral tracing.",
        ));
    }
    if let Some(llm) = repo.dependency_present(&[
        "langchain",
        "openai",
        "anthropic",
        "llama-index",
        "transformers",
    ]) {
        return Ok(Outcome::failed(
            format!("LLM project detected ({llm}) but no tracing configured"),
            "Add OpenTelemetry for agent behavior tracing. See: https://opentelemetry.io/docs/",
        ));
    }
    Ok(Outcome::failed(
        "No OpenTelemetry instrumentation found",
        "Add opentelemetry-sdk for distributed tracing of agent behavior.",
    ))
}

fn structured_logging_present(repo: &RepoSnapshot) -> Result<Outcome> {
    if repo.dependency_present(&["structlog"]).is_some() {
        return Ok(Outcome::passed(
            "Found structlog in dependencies (structured logging)",
        ));
    }
    if repo.dependency_present(&["python-json-logger"]).is_some() {
        return Ok(Outcome::passed("Found python-json-logger in dependencies"));
    }
    if repo
        .toml_section("pyproject.toml", "tool.structlog")
        .is_some()
    {
        return Ok(Outcome::passed(
            "Found structlog configuration in pyproject.toml",
        ));
    }

    match repo.contains("package.json", &["\"pino\"", "\"winston\"", "\"bunyan\""]) {
        Some("\"pino\"") => {
            return Ok(Outcome::passed(
                "Found pino in dependencies (JSON logging by default)",
            ))
        }
        Some("\"winston\"") => {
            return Ok(Outcome::partial(
                "Found winston (may need JSON transport configuration)",
                "Configure winston with JSON transport for structured logs.",
            ))
        }
        Some(_) => {
            return Ok(Outcome::passed("Found bunyan in dependencies (JSON logging)"))
        }
        None => {}
    }

    let py = repo.walk(&["py"], JSON_LOGGING_SAMPLE);
    if repo.dependency_present(&["loguru"]).is_some() {
        if first_source_with(repo, &py, &["serialize=True", ".serialize"]).is_some() {
            return Ok(Outcome::passed("Found loguru with serialization enabled"));
        }
        return Ok(Outcome::partial(
            "Found loguru (add serialize=True for JSON output)",
            "Enable serialize=True in loguru for structured JSON logs.",
        ));
    }

    for config in ["logging.yaml", "logging.yml", "logging.conf", "logging.ini"] {
        if repo.contains(config, &["json"]).is_some() {
            return Ok(Outcome::passed(format!(
                "Found JSON logging configuration in {config}"
            )));
        }
    }
    if let Some(file) = first_source_with(
        repo,
        &py,
        &[
            "JSONFormatter",
            "json_logger",
            "JsonFormatter",
            "structlog.processors.JSONRenderer",
        ],
    ) {
        return Ok(Outcome::passed(format!(
            "Found JSON logging setup in {file}"
        )));
    }
    if repo
        .contains("Cargo.toml", &["tracing-subscriber", "slog-json"])
        .is_some_and(|_| repo.contains("Cargo.toml", &["json"]).is_some())
    {
        return Ok(Outcome::passed("Found JSON tracing output in Cargo.toml"));
    }

    if repo.dependency_present(&["logging", "loguru"]).is_some() {
        return Ok(Outcome::failed(
            "Found logging library but no structured/JSON format configured",
            "Add structlog or configure JSON formatter for machine-parsable logs.",
        ));
    }
    Ok(Outcome::failed(
        "No structured logging configuration found",
        "Add structlog (Python) or pino (Node.js) for JSON structured logging.",
    ))
}
