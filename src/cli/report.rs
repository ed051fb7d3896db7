//! Report command - re-render a saved summary

use crate::reporters::{load_summary, render, OutputFormat};
use anyhow::{Context, Result};
use std::path::Path;

pub fn run(input: &Path, format: OutputFormat, color: bool) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let summary =
        load_summary(&content).with_context(|| format!("Failed to load {}", input.display()))?;
    print!("{}", render(&summary, format, color)?);
    Ok(())
}
