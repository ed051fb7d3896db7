//! Init-config command - write a starter configuration file

use crate::config::generate_default_config;
use anyhow::{bail, Context, Result};
use console::style;
use std::path::Path;

/// Run the init-config command
pub fn run(out: &Path, force: bool) -> Result<()> {
    if out.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            out.display()
        );
    }
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(out, generate_default_config())
        .with_context(|| format!("Failed to write {}", out.display()))?;

    println!(
        "{} Created {}",
        style("✓").green(),
        style(out.display()).cyan()
    );
    println!(
        "  Edit it, then run {} to audit with it.",
        style("ara scan").bold()
    );
    Ok(())
}
