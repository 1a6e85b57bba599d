//! Export and import of the whole collection as a JSON array

use anyhow::{Context, Result};
use colored::Colorize;
use dashboard_core::BackendSelector;
use std::path::Path;

pub async fn export(selector: &BackendSelector, output: Option<&Path>) -> Result<()> {
    let json = selector.export_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write export to {:?}", path))?;
            println!(
                "{}",
                format!("✅ Exported {} domains to {}", selector.domains().len(), path.display()).green()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub async fn import(selector: &mut BackendSelector, input: &Path) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {:?}", input))?;

    let count = selector
        .import_json(&text)
        .await
        .with_context(|| format!("Could not import {}", input.display()))?;

    println!("{}", format!("✅ Imported {} domains", count).green());
    if selector.using_remote() {
        println!(
            "   {}",
            "Imported into local storage; the remote table is unchanged".dimmed()
        );
    }
    Ok(())
}
