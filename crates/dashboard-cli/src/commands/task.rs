//! Task checklist commands

use super::{resolve_domain, resolve_task};
use crate::view::{check_mark, paint, progress_bar};
use anyhow::Result;
use colored::Colorize;
use dashboard_core::BackendSelector;
use dashboard_types::{Domain, Task};
use dialoguer::{Input, MultiSelect};

fn print_checklist(domain: &Domain) {
    let progress = domain.progress();
    println!(
        "{} {} {} {}",
        "📋".bold(),
        domain.name.cyan().bold(),
        paint(&progress_bar(progress, 16), progress),
        format!("{}% ({}/{})", progress, domain.completed_count(), domain.tasks.len()).dimmed()
    );
    println!();

    if domain.tasks.is_empty() {
        println!("   (No tasks)");
        return;
    }

    for task in &domain.tasks {
        println!("   {} {:<20} {}", check_mark(task.completed), task.name, task.id.dimmed());
        if let Some(ref notes) = task.notes {
            println!("       {}", notes.dimmed());
        }
    }
}

pub async fn show(selector: &BackendSelector, id_or_name: &str) -> Result<()> {
    let domain = resolve_domain(selector, id_or_name)?;
    print_checklist(&domain);
    Ok(())
}

pub async fn toggle(selector: &mut BackendSelector, domain_ref: &str, task_ref: &str) -> Result<()> {
    let domain = resolve_domain(selector, domain_ref)?;
    let task_id = resolve_task(&domain, task_ref)?.id.clone();

    let updated = selector.toggle_task_inline(&domain.id, &task_id).await?;
    if let Some(task) = updated.task(&task_id) {
        let state = if task.completed { "done".green() } else { "open".yellow() };
        println!("{} {} is now {}", check_mark(task.completed), task.name, state);
    }
    println!("   Progress: {}%", updated.progress());
    Ok(())
}

/// Apply the editor's selection: tasks at `selected` indexes become completed
pub fn apply_selection(tasks: &[Task], selected: &[usize]) -> Vec<Task> {
    tasks
        .iter()
        .enumerate()
        .map(|(i, task)| Task {
            completed: selected.contains(&i),
            ..task.clone()
        })
        .collect()
}

/// Interactive editor: pick completed tasks, then revise notes
pub async fn edit(selector: &mut BackendSelector, id_or_name: &str) -> Result<()> {
    let domain = resolve_domain(selector, id_or_name)?;
    if domain.tasks.is_empty() {
        println!("{}", "This domain has no tasks".dimmed());
        return Ok(());
    }

    let names: Vec<&str> = domain.tasks.iter().map(|t| t.name.as_str()).collect();
    let defaults: Vec<bool> = domain.tasks.iter().map(|t| t.completed).collect();
    let selected = MultiSelect::new()
        .with_prompt(format!("Completed tasks for {} (space to toggle)", domain.name))
        .items(&names)
        .defaults(&defaults)
        .interact()?;

    let mut edited = apply_selection(&domain.tasks, &selected);
    for task in edited.iter_mut() {
        let notes: String = Input::new()
            .with_prompt(format!("Notes for {}", task.name))
            .with_initial_text(task.notes.clone().unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        task.notes = Some(notes.trim().to_string()).filter(|n| !n.is_empty());
    }

    let saved = selector.save_tasks(&domain.id, &edited).await?;
    println!("{}", format!("✅ Saved tasks for {}", saved.name).green());
    println!();
    print_checklist(&saved);
    Ok(())
}
