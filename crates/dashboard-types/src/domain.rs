//! Domain records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::generate_id;
use crate::task::{default_tasks, deserialize_tasks, tasks_to_legacy_map, LegacyTaskMap, Task};

/// A tracked website and its onboarding checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Domain Authority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub da: Option<u32>,
    /// Domain Rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dr: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_tasks")]
    pub tasks: Vec<Task>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// User-supplied fields for a new domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDraft {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub da: Option<u32>,
    #[serde(default)]
    pub dr: Option<u32>,
}

impl DomainDraft {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            da: None,
            dr: None,
        }
    }
}

impl Domain {
    /// Create a record with a fresh id, the default checklist and both timestamps set to now
    pub fn new(draft: DomainDraft) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name: draft.name,
            url: draft.url,
            da: draft.da,
            dr: draft.dr,
            tasks: default_tasks(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Completion percentage, 0 when there are no tasks
    pub fn progress(&self) -> u8 {
        progress_percent(self.completed_count(), self.tasks.len())
    }

    pub fn status(&self) -> ProgressStatus {
        ProgressStatus::from_progress(self.progress())
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// Look a task up by id, then by case-insensitive name
    pub fn find_task(&self, id_or_name: &str) -> Option<&Task> {
        self.task(id_or_name).or_else(|| {
            self.tasks
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(id_or_name))
        })
    }

    /// Flat `{taskId: completed}` view of the checklist
    pub fn legacy_task_map(&self) -> LegacyTaskMap {
        tasks_to_legacy_map(&self.tasks)
    }
}

/// round(100 * completed / total), half away from zero; 0 when total is 0
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = completed.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}

/// Coarse completion state used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn from_progress(progress: u8) -> Self {
        match progress {
            0 => ProgressStatus::NotStarted,
            1..=99 => ProgressStatus::InProgress,
            _ => ProgressStatus::Completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not started",
            ProgressStatus::InProgress => "in progress",
            ProgressStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Color band of a progress value: <25, <50, <75, rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    Low,
    Moderate,
    Advanced,
    Done,
}

impl ProgressBand {
    pub fn from_progress(progress: u8) -> Self {
        match progress {
            0..=24 => ProgressBand::Low,
            25..=49 => ProgressBand::Moderate,
            50..=74 => ProgressBand::Advanced,
            _ => ProgressBand::Done,
        }
    }
}
