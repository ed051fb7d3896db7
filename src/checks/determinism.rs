//! Determinism checks: seeds, clocks, network and global state

use crate::checks::base::{CheckDescriptor, RegistryError};
use crate::checks::registry::RegistryBuilder;
use crate::checks::snapshot::RepoSnapshot;
use crate::models::{Category, Domain, Outcome, Pillar};
use anyhow::Result;
use std::path::PathBuf;

const SEED_FIXTURE_MARKERS: &[&str] = &["seed", "random_state", "np.random", "random.seed"];

/// Config files read when looking for a seed setting
const SEED_CONFIG_LIMIT: usize = 20;

const TIME_MOCK_LIBS: &[&str] = &["freezegun", "time-machine", "faketime", "libfaketime"];

const TIME_USAGE: &[&str] = &[
    "from datetime import",
    "import datetime",
    "time.time()",
    "datetime.now()",
    "datetime.utcnow()",
];

const TIME_ABSTRACTIONS: &[&str] = &[
    "clock",
    "time_provider",
    "now_func",
    "get_current_time",
    "@freeze_time",
    "@time_machine",
];

const NETWORK_MOCK_LIBS: &[&str] = &[
    "responses",
    "httpretty",
    "vcrpy",
    "vcr",
    "respx",
    "pytest-httpserver",
    "pytest-vcr",
    "aioresponses",
    "requests-mock",
];

const CASSETTE_DIRS: &[&str] = &["tests/cassettes", "cassettes", "fixtures/cassettes"];

const NETWORK_MOCK_USAGE: &[&str] = &[
    "@responses.activate",
    "@httpretty.activate",
    "@vcr.use_cassette",
    "respx.mock",
    "requests_mock",
    "aioresponses",
];

const HTTP_CLIENTS: &[&str] = &["requests.", "httpx.", "aiohttp.", "urllib.request"];

const GLOBAL_STATE: &[(&str, &str)] = &[
    ("= []", "module-level list"),
    ("= {}", "module-level dict"),
    ("global ", "global keyword usage"),
];

const MAX_GLOBAL_FLAGS: usize = 3;

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let group = Category::DeterministicSetup;
    let pillar = Pillar::EnvironmentDeterminism;

    builder.register(
        CheckDescriptor::new("random_seed_injectable", group, pillar)
            .describe("Random seeds are centralized and injectable")
            .domain(Domain::Determinism),
        random_seed_injectable,
    )?;
    builder.register(
        CheckDescriptor::new("time_abstraction", group, pillar)
            .describe("Wall-clock time can be frozen in tests")
            .domain(Domain::Determinism),
        time_abstraction,
    )?;
    builder.register(
        CheckDescriptor::new("network_mockable", group, pillar)
            .describe("Network access can be mocked")
            .domain(Domain::Determinism),
        network_mockable,
    )?;
    builder.register(
        CheckDescriptor::new("no_global_state_mutation", group, pillar)
            .describe("No hidden module-level mutable state")
            .domain(Domain::Determinism),
        no_global_state_mutation,
    )?;
    Ok(())
}

fn python_sources(repo: &RepoSnapshot, limit: usize) -> Vec<(PathBuf, String)> {
    repo.walk(&["py"], limit)
        .into_iter()
        .filter_map(|path| {
            let content = repo.read_path(&path)?;
            Some((path, content))
        })
        .collect()
}

/// pyproject.toml and every requirements*.txt at the root, lowercased
fn python_manifests(repo: &RepoSnapshot) -> Vec<String> {
    let mut manifests: Vec<String> = repo.read("pyproject.toml").into_iter().collect();
    manifests.extend(
        repo.list_dir("")
            .into_iter()
            .filter(|name| name.starts_with("requirements") && name.ends_with(".txt"))
            .filter_map(|name| repo.read(&name)),
    );
    manifests.into_iter().map(|c| c.to_lowercase()).collect()
}

fn find_library<'a>(repo: &RepoSnapshot, libraries: &[&'a str]) -> Option<&'a str> {
    let manifests = python_manifests(repo);
    manifests
        .iter()
        .find_map(|content| libraries.iter().copied().find(|lib| content.contains(lib)))
}

fn random_seed_injectable(repo: &RepoSnapshot) -> Result<Outcome> {
    for conftest in repo.glob(&["**/conftest.py"], 50)? {
        if repo.path_contains(&conftest, SEED_FIXTURE_MARKERS).is_some() {
            return Ok(Outcome::passed(format!(
                "Found seed fixture in {}",
                repo.relative(&conftest)
            )));
        }
    }

    for config in repo.glob(&["**/*.{toml,yaml,yml,json}"], SEED_CONFIG_LIMIT)? {
        if repo.path_contains(&config, &["seed"]).is_some() {
            return Ok(Outcome::passed(format!(
                "Found seed configuration in {}",
                repo.relative(&config)
            )));
        }
    }

    let sources = python_sources(repo, 50);
    for (path, content) in &sources {
        let seeded = content.to_uppercase().contains("SEED");
        let reads_env = content.contains("os.environ") || content.contains("os.getenv");
        if seeded && reads_env {
            return Ok(Outcome::passed(format!(
                "Found env-based seed in {}",
                repo.relative(path)
            )));
        }
    }

    if sources
        .iter()
        .any(|(_, c)| c.contains("import random") || c.contains("numpy.random"))
    {
        return Ok(Outcome::failed(
            "Random operations found but no seed injection detected",
            "Centralize random seeds via environment variable (e.g., RANDOM_SEED) for reproducibility.",
        ));
    }
    Ok(Outcome::passed("No random operations detected in codebase"))
}

fn time_abstraction(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(lib) = find_library(repo, TIME_MOCK_LIBS) {
        return Ok(Outcome::passed(format!("Found time mocking library: {lib}")));
    }

    let mut uses_time = false;
    let mut abstracted = false;
    for (_, content) in python_sources(repo, 50) {
        uses_time |= TIME_USAGE.iter().any(|p| content.contains(p));
        let lower = content.to_lowercase();
        abstracted |= TIME_ABSTRACTIONS.iter().any(|p| lower.contains(p));
    }

    if !uses_time {
        return Ok(Outcome::passed("No wall-clock time usage detected"));
    }
    if abstracted {
        return Ok(Outcome::passed("Time abstraction patterns found in codebase"));
    }
    Ok(Outcome::failed(
        "Time operations used without abstraction",
        "Abstract wall-clock time using freezegun, time-machine, or a custom time provider.",
    ))
}

fn network_mockable(repo: &RepoSnapshot) -> Result<Outcome> {
    if let Some(lib) = find_library(repo, NETWORK_MOCK_LIBS) {
        return Ok(Outcome::passed(format!("Found network mocking library: {lib}")));
    }
    if let Some(cassettes) = repo.find_dir(CASSETTE_DIRS) {
        return Ok(Outcome::passed(format!("Found VCR cassettes: {cassettes}")));
    }

    for test in repo.glob(&["tests/**/*.py"], 30)? {
        let Some(content) = repo.read_path(&test) else {
            continue;
        };
        if NETWORK_MOCK_USAGE.iter().any(|p| content.contains(p)) {
            return Ok(Outcome::passed(format!(
                "Found network mocking in {}",
                repo.relative(&test)
            )));
        }
    }

    let uses_network = python_sources(repo, 50)
        .iter()
        .any(|(_, c)| HTTP_CLIENTS.iter().any(|lib| c.contains(lib)));
    if !uses_network {
        return Ok(Outcome::passed("No HTTP client usage detected"));
    }
    Ok(Outcome::failed(
        "Network operations used without mocking infrastructure",
        "Add network mocking (e.g., responses, vcrpy, respx) for deterministic tests.",
    ))
}

fn no_global_state_mutation(repo: &RepoSnapshot) -> Result<Outcome> {
    let mut flags = Vec::new();
    for (path, content) in python_sources(repo, 50) {
        let relative = repo.relative(&path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if relative.to_lowercase().contains("test") || name == "__init__.py" {
            continue;
        }

        for (i, line) in content.lines().enumerate() {
            // Indented lines belong to a function or class body
            if line.starts_with([' ', '\t']) || line.trim_start().starts_with('#') {
                continue;
            }
            if line.contains(": list") || line.contains(": dict") {
                continue;
            }
            for (pattern, kind) in GLOBAL_STATE {
                if line.contains(pattern) {
                    flags.push(format!("{name}:{}: {kind}", i + 1));
                }
            }
        }
        if flags.len() >= MAX_GLOBAL_FLAGS {
            break;
        }
    }

    if flags.is_empty() {
        return Ok(Outcome::passed(
            "No obvious global state mutation patterns detected",
        ));
    }
    let shown: Vec<_> = flags.iter().take(MAX_GLOBAL_FLAGS).cloned().collect();
    Ok(Outcome::failed(
        format!(
            "Found {} potential global state issues: {}",
            flags.len(),
            shown.join(", ")
        ),
        "Avoid module-level mutable state. Use dependency injection or explicit state containers.",
    ))
}
