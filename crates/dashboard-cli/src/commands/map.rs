//! Mind-map view: every domain as a node with its tasks as leaves

use crate::view::{check_mark, filter_domains, paint, StatusFilter};
use anyhow::Result;
use colored::Colorize;
use dashboard_core::BackendSelector;

pub async fn run(selector: &BackendSelector, search: Option<String>) -> Result<()> {
    let nodes = filter_domains(selector.domains(), search.as_deref(), StatusFilter::All);

    println!("{}", "◉ Domains".blue().bold());
    if nodes.is_empty() {
        println!("└── {}", "(no domains)".dimmed());
        return Ok(());
    }

    let last_node = nodes.len() - 1;
    for (i, domain) in nodes.iter().enumerate() {
        let progress = domain.progress();
        let (branch, trunk) = if i == last_node {
            ("└──", "    ")
        } else {
            ("├──", "│   ")
        };

        println!(
            "{} {} {} {}",
            branch,
            paint(&domain.name, progress).bold(),
            domain.url.dimmed(),
            paint(&format!("{}%", progress), progress)
        );

        let last_task = domain.tasks.len().saturating_sub(1);
        for (j, task) in domain.tasks.iter().enumerate() {
            let twig = if j == last_task { "└──" } else { "├──" };
            println!("{}{} {} {}", trunk, twig, check_mark(task.completed), task.name);
        }
    }

    Ok(())
}
