//! Table view

use crate::view::{filter_domains, paint, progress_bar, sort_domains, SortKey, StatusFilter};
use anyhow::Result;
use colored::Colorize;
use dashboard_core::BackendSelector;

pub struct ListOptions {
    pub search: Option<String>,
    pub sort: SortKey,
    pub ascending: bool,
    pub status: StatusFilter,
}

pub async fn run(selector: &BackendSelector, options: ListOptions) -> Result<()> {
    let domains = selector.domains();
    let mut rows = filter_domains(domains, options.search.as_deref(), options.status);
    sort_domains(&mut rows, options.sort, options.ascending);

    let backend = if selector.using_remote() { "remote" } else { "local" };
    println!(
        "{} {}",
        "🌐 Domains".blue().bold(),
        format!("({} of {}, {} storage)", rows.len(), domains.len(), backend).dimmed()
    );
    println!();

    if rows.is_empty() {
        if domains.is_empty() {
            println!("   (No domains yet)");
            println!();
            println!("   Add one with: {}", "dashboard add <name> <url>".dimmed());
        } else {
            println!("   (No domains match)");
        }
        return Ok(());
    }

    println!(
        "   {:<9} {:<24} {:<32} {:>4} {:>4}  {:<12} {:>4}  {}",
        "ID", "NAME", "URL", "DA", "DR", "PROGRESS", "", "CREATED"
    );
    for domain in rows {
        let progress = domain.progress();
        let score = |v: Option<u32>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());

        println!(
            "   {:<9} {:<24} {:<32} {:>4} {:>4}  {} {:>4}  {}",
            domain.id.dimmed(),
            truncate(&domain.name, 24).cyan(),
            truncate(&domain.url, 32),
            score(domain.da),
            score(domain.dr),
            paint(&progress_bar(progress, 10), progress),
            format!("{}%", progress),
            domain.created_at.format("%Y-%m-%d").to_string().dimmed()
        );
    }

    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short.com", 24), "short.com");
        assert_eq!(truncate("abcdefgh", 5), "abcd…");
    }
}
