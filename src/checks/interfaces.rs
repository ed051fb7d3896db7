//! Interface and contract checks: typed data, schemas, CLI arguments, versioning

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::registry::RegistryBuilder;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Domain, Outcome, Pillar};
use anyhow::Result;
use std::path::PathBuf;

const INTERFACE_MARKERS: &[(&str, &str)] = &[
    ("from pydantic import", "Pydantic models"),
    ("@dataclass", "dataclasses"),
    ("from dataclasses import", "dataclasses"),
    ("TypedDict", "TypedDict"),
    ("NamedTuple", "NamedTuple"),
    ("import attrs", "attrs classes"),
    ("@attr.s", "attrs classes"),
];

const SCHEMA_FILES: &[&str] = &[
    "**/openapi.yaml",
    "**/openapi.yml",
    "**/openapi.json",
    "**/swagger.yaml",
    "**/swagger.yml",
    "**/swagger.json",
    "**/*.graphql",
    "**/schema.json",
    "**/api-schema.json",
];

const SCHEMA_FRAMEWORKS: &[&str] = &["fastapi", "flask-openapi", "connexion", "strawberry"];
const ENDPOINT_MARKERS: &[&str] = &["@app.route", "@router.", "def get(", "def post("];

const CLI_MARKERS: &[&str] = &["argparse", "click", "if __name__", "def main("];

const VERSION_MARKERS: &[&str] = &["/v1/", "/v2/", "/api/v", "api_version"];

const RETURN_PASS_PCT: f64 = 70.0;
const RETURN_PARTIAL_PCT: f64 = 40.0;

const MAX_DICT_FLAGS: usize = 5;

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let group = Category::StaticGuardrails;
    let pillar = Pillar::TypeContracts;

    builder.register(
        CheckDescriptor::new("typed_interfaces", group, pillar)
            .describe("Structured data uses Pydantic, dataclasses or TypedDict")
            .domain(Domain::Interfaces),
        typed_interfaces,
    )?;
    builder.register(
        CheckDescriptor::new("api_schema_defined", group, pillar)
            .describe("APIs publish an OpenAPI, JSON Schema or GraphQL schema")
            .domain(Domain::Interfaces),
        api_schema_defined,
    )?;
    builder.register(
        CheckDescriptor::new("cli_typed_args", group, pillar)
            .describe("CLI arguments are typed")
            .domain(Domain::Interfaces),
        cli_typed_args,
    )?;
    builder.register(
        CheckDescriptor::new("return_types_documented", group, pillar)
            .describe("Functions annotate their return types")
            .domain(Domain::Interfaces),
        return_types_documented,
    )?;
    builder.register(
        CheckDescriptor::new("no_implicit_dict_schemas", group, pillar)
            .describe("Loose dicts are not used as data schemas")
            .domain(Domain::Interfaces),
        no_implicit_dict_schemas,
    )?;
    builder.register(
        CheckDescriptor::new("contract_versioning", group, pillar)
            .describe("APIs or packages carry a version")
            .domain(Domain::Interfaces),
        contract_versioning,
    )?;
    builder.register(
        CheckDescriptor::new("mypy_strictness", group, pillar)
            .describe("mypy runs in strict mode"),
        mypy_strictness,
    )?;
    Ok(())
}

/// First `limit` Python files with their content
fn python_sources(repo: &RepoSnapshot, limit: usize) -> Vec<(PathBuf, String)> {
    repo.walk(&["py"], limit)
        .into_iter()
        .filter_map(|path| {
            let content = repo.read_path(&path)?;
            Some((path, content))
        })
        .collect()
}

/// Like `python_sources`, leaving out anything whose path mentions tests
fn non_test_sources(repo: &RepoSnapshot, limit: usize) -> Vec<(PathBuf, String)> {
    python_sources(repo, limit)
        .into_iter()
        .filter(|(path, _)| !repo.relative(path).to_lowercase().contains("test"))
        .collect()
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn typed_interfaces(repo: &RepoSnapshot) -> Result<Outcome> {
    let mut found: Vec<&str> = Vec::new();
    for (_, content) in python_sources(repo, 50) {
        for (marker, kind) in INTERFACE_MARKERS {
            if content.contains(marker) && !found.contains(kind) {
                found.push(*kind);
            }
        }
    }
    if found.is_empty() {
        return Ok(Outcome::failed(
            "No typed interface definitions found",
            "Use Pydantic, dataclasses, or TypedDict for structured data interfaces.",
        ));
    }
    Ok(Outcome::passed(format!(
        "Found typed interfaces: {}",
        found.join(", ")
    )))
}

fn api_schema_defined(repo: &RepoSnapshot) -> Result<Outcome> {
    for pattern in SCHEMA_FILES {
        if let Some(schema) = repo.glob(&[*pattern], 1)?.first() {
            return Ok(Outcome::passed(format!(
                "Found API schema: {}",
                file_name(schema)
            )));
        }
    }

    let sources = python_sources(repo, 30);
    if sources.iter().any(|(_, c)| c.contains("from fastapi import")) {
        return Ok(Outcome::passed(
            "FastAPI detected (auto-generates OpenAPI schema)",
        ));
    }
    if let Some(framework) = repo.contains("pyproject.toml", SCHEMA_FRAMEWORKS) {
        return Ok(Outcome::passed(format!(
            "API framework with schema support detected: {framework}"
        )));
    }

    let has_endpoints = sources
        .iter()
        .any(|(_, c)| ENDPOINT_MARKERS.iter().any(|m| c.contains(m)));
    if !has_endpoints {
        return Ok(Outcome::passed("No API endpoints detected"));
    }
    Ok(Outcome::failed(
        "API endpoints found but no schema definition",
        "Add OpenAPI, JSON Schema, or GraphQL schema for API documentation.",
    ))
}

fn cli_typed_args(repo: &RepoSnapshot) -> Result<Outcome> {
    let sources = python_sources(repo, 40);
    for (path, content) in &sources {
        let name = file_name(path);
        if content.contains("import typer") || content.contains("from typer import") {
            return Ok(Outcome::passed(format!(
                "Typer CLI detected in {name} (fully typed)"
            )));
        }
        let click = content.contains("@click.command") || content.contains("@click.group");
        if click && content.contains(": ") {
            return Ok(Outcome::passed(format!(
                "Click CLI with type hints in {name}"
            )));
        }
        if content.contains("argparse") && content.contains("type=") {
            return Ok(Outcome::passed(format!(
                "argparse with typed arguments in {name}"
            )));
        }
    }

    if sources
        .iter()
        .any(|(_, c)| CLI_MARKERS.iter().any(|m| c.contains(m)))
    {
        return Ok(Outcome::failed(
            "CLI detected but arguments may not be typed",
            "Use Typer or add type annotations to Click/argparse arguments.",
        ));
    }
    Ok(Outcome::passed("No CLI detected"))
}

fn return_types_documented(repo: &RepoSnapshot) -> Result<Outcome> {
    let mut checked = 0;
    let mut annotated = 0;
    for (_, content) in non_test_sources(repo, 30) {
        for line in content.lines() {
            if line.trim_start().starts_with("def ") {
                checked += 1;
                if line.contains(" -> ") {
                    annotated += 1;
                }
            }
        }
    }
    if checked == 0 {
        return Ok(Outcome::passed("No function definitions found"));
    }

    let coverage = annotated as f64 / checked as f64 * 100.0;
    Ok(if coverage >= RETURN_PASS_PCT {
        Outcome::passed(format!(
            "Return type coverage: {coverage:.0}% ({annotated}/{checked})"
        ))
    } else if coverage >= RETURN_PARTIAL_PCT {
        Outcome::partial(
            format!("Partial return type coverage: {coverage:.0}%"),
            "Annotate the remaining return types to reach 70%.",
        )
    } else {
        Outcome::failed(
            format!("Low return type coverage: {coverage:.0}%"),
            "Add return type annotations (-> Type) to functions for better agent understanding.",
        )
    })
}

fn no_implicit_dict_schemas(repo: &RepoSnapshot) -> Result<Outcome> {
    let mut flags = Vec::new();
    for (path, content) in non_test_sources(repo, 30) {
        let name = file_name(&path);
        for (i, line) in content.lines().enumerate() {
            if line.contains("Dict[str, Any]") || line.contains("dict[str, Any]") {
                flags.push(format!("{name}:{}: Dict[str, Any]", i + 1));
            }
            if line.contains("-> dict") && !line.contains("-> dict[") {
                flags.push(format!("{name}:{}: untyped dict return", i + 1));
            }
        }
        if flags.len() >= MAX_DICT_FLAGS {
            break;
        }
    }

    if flags.is_empty() {
        return Ok(Outcome::passed("No implicit dict schema patterns detected"));
    }
    let shown: Vec<_> = flags.iter().take(3).cloned().collect();
    Ok(Outcome::failed(
        format!(
            "Found {} implicit dict schemas: {}",
            flags.len(),
            shown.join(", ")
        ),
        "Replace Dict[str, Any] with typed dataclasses, Pydantic models, or TypedDict.",
    ))
}

fn contract_versioning(repo: &RepoSnapshot) -> Result<Outcome> {
    for (path, content) in python_sources(repo, 30) {
        if VERSION_MARKERS.iter().any(|m| content.contains(m)) {
            return Ok(Outcome::passed(format!(
                "API versioning detected in {}",
                file_name(&path)
            )));
        }
    }

    let schemas = repo.glob(&["**/openapi*.yaml", "**/openapi*.yml", "**/openapi*.json"], 20)?;
    for schema in &schemas {
        if repo.path_contains(schema, &["version"]).is_some() {
            return Ok(Outcome::passed(format!(
                "Version specified in {}",
                file_name(schema)
            )));
        }
    }

    if repo
        .read("pyproject.toml")
        .is_some_and(|c| c.contains("version = \""))
    {
        return Ok(Outcome::passed("Package versioning in pyproject.toml"));
    }
    if repo
        .read("package.json")
        .is_some_and(|c| c.contains("\"version\""))
    {
        return Ok(Outcome::passed("Package versioning in package.json"));
    }
    Ok(Outcome::failed(
        "No contract versioning strategy detected",
        "Add API versioning (URL prefix like /v1/) or package version for contract stability.",
    ))
}

fn enabled(table: &toml::Table, key: &str) -> bool {
    table.get(key).and_then(toml::Value::as_bool) == Some(true)
}

fn mypy_strictness(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(mypy) = repo.toml_section("pyproject.toml", "tool.mypy") {
        if enabled(&mypy, "strict") {
            return Ok(Outcome::passed(
                "mypy configured with strict=true in pyproject.toml",
            ));
        }
        if enabled(&mypy, "disallow_untyped_defs") {
            return Ok(Outcome::passed(
                "mypy configured with disallow_untyped_defs=true in pyproject.toml",
            ));
        }
        return Ok(Outcome::partial(
            "mypy configured but strict mode not enabled",
            "Enable strict=true or disallow_untyped_defs=true in [tool.mypy].",
        ));
    }

    if let Some(ini) = repo.find_file(&["mypy.ini", ".mypy.ini"]) {
        if repo.contains(ini, &["strict = true", "strict=true"]).is_some() {
            return Ok(Outcome::passed(format!(
                "mypy configured with strict mode in {ini}"
            )));
        }
        if repo
            .contains(ini, &["disallow_untyped_defs = true", "disallow_untyped_defs=true"])
            .is_some()
        {
            return Ok(Outcome::passed(format!(
                "mypy configured with disallow_untyped_defs in {ini}"
            )));
        }
        return Ok(Outcome::partial(
            format!("mypy configured via {ini} but strict mode not detected"),
            "Enable strict=true or disallow_untyped_defs=true in mypy config.",
        ));
    }

    if repo.contains("setup.cfg", &["[mypy]"]).is_some() {
        if repo
            .contains("setup.cfg", &["strict = true", "strict=true"])
            .is_some()
        {
            return Ok(Outcome::passed("mypy configured with strict mode in setup.cfg"));
        }
        if repo
            .contains("setup.cfg", &["disallow_untyped_defs = true", "disallow_untyped_defs=true"])
            .is_some()
        {
            return Ok(Outcome::passed(
                "mypy configured with disallow_untyped_defs in setup.cfg",
            ));
        }
    }

    if repo.dependency_present(&["mypy"]).is_some() {
        return Ok(Outcome::partial(
            "mypy in dependencies but no strict configuration found",
            "Add [tool.mypy] to pyproject.toml with strict=true.",
        ));
    }
    Ok(Outcome::failed(
        "No mypy configuration found",
        "Add mypy with strict=true to enforce type checking.",
    ))
}
