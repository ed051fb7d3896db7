//! ARA - Agent readiness audit
//!
//! Audits a repository against a catalog of independent checks, folds the
//! outcomes into category and pillar scores, and derives a gated maturity
//! level plus a prioritized fix-first list.

pub mod checks;
pub mod cli;
pub mod config;
pub mod models;
pub mod reporters;
pub mod scanner;
pub mod scoring;
