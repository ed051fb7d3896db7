//! Checks command - list the registered check catalog

use crate::checks::default_registry;
use crate::models::Category;
use anyhow::Result;
use console::style;

pub fn run() -> Result<()> {
    let registry = default_registry()?;

    println!(
        "\n{} ({} checks)\n",
        style("Check catalog").bold(),
        registry.len()
    );
    for category in Category::ALL {
        println!(
            "{}  {}",
            style(category.as_str()).bold(),
            style(category.description()).dim()
        );
        for d in registry.by_group(category) {
            let gates = if d.gate_levels.is_empty() {
                "-".to_string()
            } else {
                d.gate_levels
                    .iter()
                    .map(|l| l.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            };
            println!(
                "  {:<40} {:<26} w{:<4} gates {}",
                d.name,
                d.pillar.as_str(),
                d.weight,
                gates
            );
        }
        println!();
    }
    Ok(())
}
