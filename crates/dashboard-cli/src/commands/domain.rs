//! Domain commands: add, bulk add, edit, delete

use super::resolve_domain;
use anyhow::{Context, Result};
use colored::Colorize;
use dashboard_core::BackendSelector;
use dashboard_types::DomainDraft;
use std::path::Path;

pub async fn add(
    selector: &mut BackendSelector,
    name: &str,
    url: &str,
    da: Option<u32>,
    dr: Option<u32>,
) -> Result<()> {
    if name.trim().is_empty() || url.trim().is_empty() {
        anyhow::bail!("Both a name and a URL are required");
    }

    let known = selector.domains().len();
    let draft = DomainDraft {
        da,
        dr,
        ..DomainDraft::new(name.trim(), url.trim())
    };
    let domain = selector.add(draft).await?;

    if selector.domains().len() == known {
        println!(
            "{}",
            format!("⚠️  {} is already tracked ({})", domain.name, domain.id).yellow()
        );
    } else {
        println!(
            "{}",
            format!("✅ Added {} ({})", domain.name, domain.id).green()
        );
    }
    Ok(())
}

/// Collect URLs from arguments and an optional file, one per line
pub fn collect_urls(urls: Vec<String>, file: Option<&Path>) -> Result<Vec<String>> {
    let mut collected = urls;
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read URLs from {:?}", path))?;
        collected.extend(content.lines().map(str::to_string));
    }

    Ok(collected
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty() && !u.starts_with('#'))
        .collect())
}

pub async fn bulk(selector: &mut BackendSelector, urls: Vec<String>, file: Option<&Path>) -> Result<()> {
    let urls = collect_urls(urls, file)?;
    if urls.is_empty() {
        anyhow::bail!("No URLs given");
    }

    let known = selector.domains().len();
    let domains = selector.add_many(&urls).await?;
    let added = selector.domains().len().saturating_sub(known);

    println!(
        "{}",
        format!(
            "✅ {} new domains, {} already tracked",
            added,
            domains.len().saturating_sub(added)
        )
        .green()
    );
    for domain in &domains {
        println!("   {} {}", domain.id.dimmed(), domain.url);
    }
    Ok(())
}

pub struct EditOptions {
    pub name: Option<String>,
    pub url: Option<String>,
    pub da: Option<u32>,
    pub dr: Option<u32>,
}

pub async fn edit(selector: &mut BackendSelector, id_or_name: &str, options: EditOptions) -> Result<()> {
    let mut domain = resolve_domain(selector, id_or_name)?;

    if options.name.is_none() && options.url.is_none() && options.da.is_none() && options.dr.is_none() {
        println!("{}", "Nothing to change".dimmed());
        return Ok(());
    }

    if let Some(name) = options.name.filter(|n| !n.trim().is_empty()) {
        domain.name = name.trim().to_string();
    }
    if let Some(url) = options.url.filter(|u| !u.trim().is_empty()) {
        domain.url = url.trim().to_string();
    }
    if options.da.is_some() {
        domain.da = options.da;
    }
    if options.dr.is_some() {
        domain.dr = options.dr;
    }

    let saved = selector.update(domain).await?;
    println!("{}", format!("✅ Updated {}", saved.name).green());
    Ok(())
}

pub async fn delete(selector: &mut BackendSelector, id_or_name: &str, yes: bool) -> Result<()> {
    let domain = resolve_domain(selector, id_or_name)?;

    if !yes {
        let confirm: bool = dialoguer::Confirm::new()
            .with_prompt(format!("Delete domain '{}'?", domain.name))
            .default(false)
            .interact()?;

        if !confirm {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    selector.delete(&domain.id).await?;
    println!("{}", format!("✅ Domain '{}' deleted", domain.name).green());
    Ok(())
}
