//! Check execution engine with parallel support
//!
//! The CheckEngine runs every enabled check against one repository snapshot:
//! - Applies the ignore policy (ignored checks/pillars become SKIPPED)
//! - Runs checks in parallel using rayon
//! - Isolates faults: errors, panics and timeouts become UNKNOWN
//! - Normalizes outcomes that break the outcome contract
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      CheckEngine                        │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Drop disabled checks                                │
//! │  2. Mark ignored checks / pillars as SKIPPED            │
//! │  3. Evaluate the rest in parallel (rayon)               │
//! │     └─ catch_unwind + optional per-check timeout        │
//! │  4. Normalize and collect one Outcome per check         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Collection happens only after every check finished, so no locking is
//! needed around the outcome map.

use crate::checks::base::ProgressCallback;
use crate::checks::registry::RegisteredCheck;
use crate::checks::snapshot::{PathFilter, RepoSnapshot};
use crate::models::{Outcome, Pillar, Status};
use crossbeam_channel::RecvTimeoutError;
use rayon::prelude::*;
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Longest error text kept as evidence
const MAX_FAULT_CHARS: usize = 200;

/// Checks excluded from a scan
#[derive(Debug, Clone, Default)]
pub struct IgnorePolicy {
    /// Check names recorded as SKIPPED
    pub checks: BTreeSet<String>,
    /// Pillars whose checks are recorded as SKIPPED
    pub pillars: BTreeSet<Pillar>,
    /// Paths hidden from every check
    pub paths: PathFilter,
}

impl IgnorePolicy {
    /// Why a check is skipped, if it is
    fn skip_reason(&self, name: &str, pillar: Pillar) -> Option<String> {
        if self.checks.contains(name) {
            Some("Ignored by configuration".to_string())
        } else if self.pillars.contains(&pillar) {
            Some(format!("Pillar '{}' ignored by configuration", pillar))
        } else {
            None
        }
    }
}

/// Orchestrates check execution for one repository
pub struct CheckEngine {
    /// Number of worker threads for parallel execution
    workers: usize,
    /// Per-check wall-clock limit (None = unbounded)
    timeout: Option<Duration>,
    /// Progress callback for reporting execution status
    progress_callback: Option<ProgressCallback>,
}

impl CheckEngine {
    /// Create a new engine
    ///
    /// # Arguments
    /// * `workers` - Number of worker threads (0 = auto-detect)
    pub fn new(workers: usize) -> Self {
        let actual_workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(16)
        } else {
            workers
        };

        Self {
            workers: actual_workers,
            timeout: None,
            progress_callback: None,
        }
    }

    /// Set the per-check timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a progress callback
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run every enabled check and return one outcome per check name.
    ///
    /// Total by construction: a failing check never aborts the run.
    pub fn run(
        &self,
        checks: &[RegisteredCheck],
        snapshot: &RepoSnapshot,
        policy: &IgnorePolicy,
    ) -> BTreeMap<String, Outcome> {
        let start = Instant::now();
        let repo = snapshot.with_filter(policy.paths.clone());

        let enabled: Vec<&RegisteredCheck> =
            checks.iter().filter(|c| c.descriptor.enabled).collect();
        let total = enabled.len();
        let completed = AtomicUsize::new(0);

        info!(
            "Running {} checks on {} workers against {}",
            total,
            self.workers,
            repo.root().display()
        );

        let run_one = |entry: &&RegisteredCheck| {
            let outcome = self.run_single_check(entry, &repo, policy);
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(ref callback) = self.progress_callback {
                callback(&entry.descriptor.name, done, total);
            }
            (entry.descriptor.name.clone(), outcome)
        };

        let results: Vec<(String, Outcome)> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
        {
            Ok(pool) => pool.install(|| enabled.par_iter().map(run_one).collect()),
            Err(e) => {
                warn!("Could not build worker pool ({}), running checks sequentially", e);
                enabled.iter().map(run_one).collect()
            }
        };

        let mut outcomes = BTreeMap::new();
        for (name, outcome) in results {
            if outcomes.contains_key(&name) {
                warn!("Check {} produced more than one outcome; keeping the first", name);
                continue;
            }
            outcomes.insert(name, outcome);
        }

        let unknown = outcomes
            .values()
            .filter(|o| o.status == Status::Unknown)
            .count();
        info!(
            "Executed {} checks ({} unknown) in {:?}",
            outcomes.len(),
            unknown,
            start.elapsed()
        );

        outcomes
    }

    /// Run a single check with skip handling, fault isolation and timing
    fn run_single_check(
        &self,
        entry: &RegisteredCheck,
        repo: &RepoSnapshot,
        policy: &IgnorePolicy,
    ) -> Outcome {
        let name = &entry.descriptor.name;
        if let Some(reason) = policy.skip_reason(name, entry.descriptor.pillar) {
            debug!("Skipping check {}: {}", name, reason);
            return Outcome::skipped(reason);
        }

        let start = Instant::now();
        debug!("Running check: {}", name);

        let outcome = match self.timeout {
            None => {
                let check = Arc::clone(&entry.check);
                fault_to_outcome(name, catch_unwind(AssertUnwindSafe(|| check.evaluate(repo))))
            }
            Some(limit) => self.run_with_timeout(entry, repo, limit),
        };

        debug!(
            "Check {} finished as {} in {}ms",
            name,
            outcome.status,
            start.elapsed().as_millis()
        );
        outcome.normalized()
    }

    /// Evaluate on a dedicated thread and stop waiting after `limit`.
    ///
    /// A check that overruns keeps its thread until it returns; its late
    /// result is dropped.
    fn run_with_timeout(&self, entry: &RegisteredCheck, repo: &RepoSnapshot, limit: Duration) -> Outcome {
        let name = entry.descriptor.name.clone();
        let (tx, rx) = crossbeam_channel::bounded(1);
        let check = Arc::clone(&entry.check);
        let repo = repo.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("check-{}", name))
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| check.evaluate(&repo)));
                let _ = tx.send(result);
            });
        if let Err(e) = spawned {
            error!("Could not start worker for check {}: {}", name, e);
            return Outcome::unknown(sanitize(&format!("Could not start check worker: {e}")));
        }

        match rx.recv_timeout(limit) {
            Ok(result) => fault_to_outcome(&name, result),
            Err(RecvTimeoutError::Timeout) => {
                warn!("Check {} timed out after {}ms", name, limit.as_millis());
                Outcome::unknown(format!("Check timed out after {}ms", limit.as_millis()))
            }
            Err(RecvTimeoutError::Disconnected) => {
                error!("Check {} worker exited without a result", name);
                Outcome::unknown("Check worker exited without a result")
            }
        }
    }
}

impl Default for CheckEngine {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Map an evaluation result (including panics) onto an outcome
fn fault_to_outcome(
    name: &str,
    result: Result<anyhow::Result<Outcome>, Box<dyn Any + Send>>,
) -> Outcome {
    match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            warn!("Check {} failed: {:#}", name, e);
            Outcome::unknown(format!("Check failed with error: {}", sanitize(&format!("{e:#}"))))
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            error!("Check {} panicked: {}", name, panic_msg);
            Outcome::unknown(format!("Check panicked: {}", sanitize(&panic_msg)))
        }
    }
}

/// Collapse an error message to one bounded, printable line
fn sanitize(message: &str) -> String {
    let line: String = message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    if line.chars().count() > MAX_FAULT_CHARS {
        let cut: String = line.chars().take(MAX_FAULT_CHARS - 3).collect();
        format!("{cut}...")
    } else if line.is_empty() {
        "no details".to_string()
    } else {
        line
    }
}

/// Builder for CheckEngine with fluent API
pub struct CheckEngineBuilder {
    workers: usize,
    timeout: Option<Duration>,
    progress_callback: Option<ProgressCallback>,
}

impl CheckEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            workers: 0,
            timeout: None,
            progress_callback: None,
        }
    }

    /// Set number of worker threads
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the per-check timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set progress callback
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Build the engine
    pub fn build(self) -> CheckEngine {
        let mut engine = CheckEngine::new(self.workers).with_timeout(self.timeout);
        if let Some(callback) = self.progress_callback {
            engine = engine.with_progress_callback(callback);
        }
        engine
    }
}

impl Default for CheckEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
