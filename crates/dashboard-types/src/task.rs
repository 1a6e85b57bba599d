//! Onboarding checklist tasks

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::id::generate_id;

/// One checklist item of a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Task {
    /// Merge a patch into this task. Only completion and notes are mutable.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(ref notes) = patch.notes {
            self.notes = if notes.is_empty() {
                None
            } else {
                Some(notes.clone())
            };
        }
    }
}

/// Partial update of a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// An empty string clears the notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            notes: None,
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            completed: None,
            notes: Some(notes.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_none() && self.notes.is_none()
    }
}

/// Template entry for the default checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTemplate {
    /// Key used by the flat boolean task map
    pub legacy_key: &'static str,
    pub name: &'static str,
}

/// The fixed eight-step onboarding checklist, in display order
pub const DEFAULT_TASKS: &[TaskTemplate] = &[
    TaskTemplate {
        legacy_key: "installation",
        name: "Installation",
    },
    TaskTemplate {
        legacy_key: "configuration",
        name: "Configuration",
    },
    TaskTemplate {
        legacy_key: "gscSetup",
        name: "GSC/CF Setup",
    },
    TaskTemplate {
        legacy_key: "content",
        name: "Content",
    },
    TaskTemplate {
        legacy_key: "wwwStatus",
        name: "WWW Status",
    },
    TaskTemplate {
        legacy_key: "uxPublishing",
        name: "UX/WH Publishing",
    },
    TaskTemplate {
        legacy_key: "traffic",
        name: "Traffic",
    },
    TaskTemplate {
        legacy_key: "monetization",
        name: "Monetization",
    },
];

/// Build a fresh checklist, each task with its own id
pub fn default_tasks() -> Vec<Task> {
    DEFAULT_TASKS
        .iter()
        .map(|template| Task {
            id: generate_id(),
            name: template.name.to_string(),
            completed: false,
            notes: None,
        })
        .collect()
}

/// Flat `{taskKey: completed}` shape found in older records
pub type LegacyTaskMap = BTreeMap<String, bool>;

/// Convert the flat map into canonical tasks.
///
/// The key becomes the task id, so [`tasks_to_legacy_map`] restores the
/// original map exactly. Well-known keys come out in template order,
/// followed by any other keys alphabetically.
pub fn tasks_from_legacy_map(map: &LegacyTaskMap) -> Vec<Task> {
    let mut tasks: Vec<Task> = map
        .iter()
        .map(|(key, completed)| Task {
            id: key.clone(),
            name: legacy_task_name(key),
            completed: *completed,
            notes: None,
        })
        .collect();

    tasks.sort_by_key(|task| template_position(&task.id));
    tasks
}

fn template_position(legacy_key: &str) -> usize {
    DEFAULT_TASKS
        .iter()
        .position(|t| t.legacy_key == legacy_key)
        .unwrap_or(DEFAULT_TASKS.len())
}

/// Convert canonical tasks into the flat map, keyed by task id
pub fn tasks_to_legacy_map(tasks: &[Task]) -> LegacyTaskMap {
    tasks
        .iter()
        .map(|task| (task.id.clone(), task.completed))
        .collect()
}

/// Display name for a legacy key: template name when known, else "gscSetup" -> "Gsc Setup"
pub fn legacy_task_name(key: &str) -> String {
    if let Some(template) = DEFAULT_TASKS.iter().find(|t| t.legacy_key == key) {
        return template.name.to_string();
    }

    let mut name = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            name.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            name.push(' ');
            name.push(c);
        } else {
            name.push(c);
        }
    }
    name
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaskShape {
    List(Vec<Task>),
    Legacy(LegacyTaskMap),
}

impl From<TaskShape> for Vec<Task> {
    fn from(shape: TaskShape) -> Self {
        match shape {
            TaskShape::List(tasks) => tasks,
            TaskShape::Legacy(map) => tasks_from_legacy_map(&map),
        }
    }
}

/// Serde hook accepting either task shape (or null) and yielding canonical tasks
pub fn deserialize_tasks<'de, D>(deserializer: D) -> Result<Vec<Task>, D::Error>
where
    D: Deserializer<'de>,
{
    let shape = Option::<TaskShape>::deserialize(deserializer)?;
    Ok(shape.map(Vec::from).unwrap_or_default())
}

/// Decode a JSON-encoded task list in either shape
pub fn tasks_from_json(text: &str) -> serde_json::Result<Vec<Task>> {
    let shape: Option<TaskShape> = serde_json::from_str(text)?;
    Ok(shape.map(Vec::from).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tasks() {
        let tasks = default_tasks();
        assert_eq!(tasks.len(), 8);
        assert_eq!(tasks[0].name, "Installation");
        assert_eq!(tasks[7].name, "Monetization");
        assert!(tasks.iter().all(|t| !t.completed && t.notes.is_none()));

        let ids: std::collections::HashSet<_> = tasks.iter().map(|t| &t.id).collect();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_legacy_names() {
        assert_eq!(legacy_task_name("gscSetup"), "GSC/CF Setup");
        assert_eq!(legacy_task_name("backlinkAudit"), "Backlink Audit");
        assert_eq!(legacy_task_name("x"), "X");
    }

    #[test]
    fn test_legacy_map_round_trip() {
        let mut map = LegacyTaskMap::new();
        map.insert("installation".to_string(), true);
        map.insert("wwwStatus".to_string(), false);
        map.insert("customStep".to_string(), true);

        let tasks = tasks_from_legacy_map(&map);
        assert_eq!(tasks.len(), 3);
        assert!(tasks
            .iter()
            .any(|t| t.id == "wwwStatus" && t.name == "WWW Status" && !t.completed));

        assert_eq!(tasks_to_legacy_map(&tasks), map);
    }

    #[test]
    fn test_legacy_map_keeps_checklist_order() {
        let tasks = tasks_from_json(
            r#"{"installation":false,"configuration":false,"gscSetup":false,"content":false,"zeta":true,"audit":false}"#,
        )
        .unwrap();

        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Installation", "Configuration", "GSC/CF Setup", "Content", "Audit", "Zeta"]
        );
    }

    #[test]
    fn test_tasks_from_json_accepts_both_shapes() {
        let list = tasks_from_json(r#"[{"id":"a","name":"Content","completed":true}]"#).unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0].completed);

        let legacy = tasks_from_json(r#"{"content":true,"traffic":false}"#).unwrap();
        assert_eq!(legacy.len(), 2);
        assert_eq!(legacy[0].name, "Content");

        assert!(tasks_from_json("null").unwrap().is_empty());
        assert!(tasks_from_json("\"not tasks\"").is_err());
    }

    #[test]
    fn test_patch_apply() {
        let mut task = Task {
            id: "t1".to_string(),
            name: "Content".to_string(),
            completed: false,
            notes: None,
        };

        task.apply(&TaskPatch::completed(true));
        assert!(task.completed);

        task.apply(&TaskPatch::notes("ten articles"));
        assert_eq!(task.notes.as_deref(), Some("ten articles"));
        assert!(task.completed);

        task.apply(&TaskPatch::notes(""));
        assert_eq!(task.notes, None);
    }
}
