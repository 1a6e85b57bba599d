//! Filtering, sorting and colouring shared by the table and map views

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use dashboard_types::{Domain, ProgressBand, ProgressStatus};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Name,
    Url,
    Created,
    Progress,
}

impl SortKey {
    /// Parse a configured default, falling back to creation order
    pub fn from_setting(value: &str) -> Self {
        <Self as ValueEnum>::from_str(value, true).unwrap_or(SortKey::Created)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    InProgress,
    NotStarted,
}

impl StatusFilter {
    pub fn matches(self, status: ProgressStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => status == ProgressStatus::Completed,
            StatusFilter::InProgress => status == ProgressStatus::InProgress,
            StatusFilter::NotStarted => status == ProgressStatus::NotStarted,
        }
    }
}

/// Case-insensitive substring match on name or URL
pub fn matches_search(domain: &Domain, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    needle.is_empty()
        || domain.name.to_lowercase().contains(&needle)
        || domain.url.to_lowercase().contains(&needle)
}

pub fn filter_domains<'a>(
    domains: &'a [Domain],
    search: Option<&str>,
    status: StatusFilter,
) -> Vec<&'a Domain> {
    domains
        .iter()
        .filter(|d| search.map_or(true, |s| matches_search(d, s)))
        .filter(|d| status.matches(d.status()))
        .collect()
}

/// Descending unless only `--asc` was given.
pub fn sort_ascending(asc: bool, desc: bool) -> bool {
    asc && !desc
}

pub fn sort_domains(domains: &mut [&Domain], key: SortKey, ascending: bool) {
    domains.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

fn compare(a: &Domain, b: &Domain, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Url => a.url.to_lowercase().cmp(&b.url.to_lowercase()),
        SortKey::Created => a.created_at.cmp(&b.created_at),
        SortKey::Progress => a.progress().cmp(&b.progress()),
    }
}

/// Paint `text` with the colour of a progress band
pub fn paint(text: &str, progress: u8) -> ColoredString {
    match ProgressBand::from_progress(progress) {
        ProgressBand::Low => text.red(),
        ProgressBand::Moderate => text.yellow(),
        ProgressBand::Advanced => text.blue(),
        ProgressBand::Done => text.green(),
    }
}

/// Fixed-width text bar, e.g. `[#####.....]`
pub fn progress_bar(progress: u8, width: usize) -> String {
    let filled = (progress as usize * width + 50) / 100;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

pub fn check_mark(completed: bool) -> ColoredString {
    if completed {
        "✓".green()
    } else {
        "✗".red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use dashboard_types::DomainDraft;

    fn domain(name: &str, url: &str, completed: usize, age_days: i64) -> Domain {
        let mut domain = Domain::new(DomainDraft::new(name, url));
        for task in domain.tasks.iter_mut().take(completed) {
            task.completed = true;
        }
        domain.created_at = Utc::now() - Duration::days(age_days);
        domain
    }

    fn fixture() -> Vec<Domain> {
        vec![
            domain("Beta", "https://beta.io", 8, 1),
            domain("alpha", "https://alpha.com", 0, 3),
            domain("Gamma", "https://gamma.net", 4, 2),
        ]
    }

    fn names(domains: &[&Domain]) -> Vec<String> {
        domains.iter().map(|d| d.name.clone()).collect()
    }

    #[test]
    fn test_search_matches_name_or_url() {
        let domains = fixture();
        assert_eq!(names(&filter_domains(&domains, Some("ALPHA"), StatusFilter::All)), vec!["alpha"]);
        assert_eq!(names(&filter_domains(&domains, Some(".net"), StatusFilter::All)), vec!["Gamma"]);
        assert_eq!(filter_domains(&domains, Some("  "), StatusFilter::All).len(), 3);
        assert!(filter_domains(&domains, Some("zeta"), StatusFilter::All).is_empty());
    }

    #[test]
    fn test_status_filter() {
        let domains = fixture();
        assert_eq!(names(&filter_domains(&domains, None, StatusFilter::Completed)), vec!["Beta"]);
        assert_eq!(names(&filter_domains(&domains, None, StatusFilter::NotStarted)), vec!["alpha"]);
        assert_eq!(names(&filter_domains(&domains, None, StatusFilter::InProgress)), vec!["Gamma"]);
    }

    #[test]
    fn test_sorting() {
        let domains = fixture();
        let mut view = filter_domains(&domains, None, StatusFilter::All);

        sort_domains(&mut view, SortKey::Name, true);
        assert_eq!(names(&view), vec!["alpha", "Beta", "Gamma"]);

        sort_domains(&mut view, SortKey::Progress, false);
        assert_eq!(names(&view), vec!["Beta", "Gamma", "alpha"]);

        sort_domains(&mut view, SortKey::Created, false);
        assert_eq!(names(&view), vec!["Beta", "Gamma", "alpha"]);

        sort_domains(&mut view, SortKey::Url, true);
        assert_eq!(names(&view), vec!["alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_sort_direction_flags() {
        assert!(!sort_ascending(false, false));
        assert!(sort_ascending(true, false));
        assert!(!sort_ascending(false, true));
    }

    #[test]
    fn test_sort_key_setting() {
        assert_eq!(SortKey::from_setting("Progress"), SortKey::Progress);
        assert_eq!(SortKey::from_setting("bogus"), SortKey::Created);
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 10), "[..........]");
        assert_eq!(progress_bar(50, 10), "[#####.....]");
        assert_eq!(progress_bar(100, 4), "[####]");
    }
}
