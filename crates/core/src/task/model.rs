//! Task model definitions

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Store-assigned task identifier
pub type TaskId = i64;

/// A persisted task record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. A task with this set is invisible to reads.
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Candidate for a new task; the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub completed: bool,
}

impl NewTask {
    /// Create a new, not yet completed task candidate
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            completed: false,
        }
    }

    /// Set the completion flag
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Fields overwritten by an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: String,
    pub completed: bool,
}

impl TaskPatch {
    pub fn new(name: impl Into<String>, completed: bool) -> Self {
        Self {
            name: name.into(),
            completed,
        }
    }

    /// Apply the patch to an existing record, refreshing `updated_at`
    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        task.name = self.name.clone();
        task.completed = self.completed;
        task.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        let now = Utc::now();
        Task {
            id: 7,
            name: "Write report".to_string(),
            completed: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_new_task_defaults_to_incomplete() {
        let task = NewTask::new("Buy milk");
        assert_eq!(task.name, "Buy milk");
        assert!(!task.completed);

        let task = NewTask::new("Buy milk").with_completed(true);
        assert!(task.completed);
    }

    #[test]
    fn test_patch_keeps_identity() {
        let mut task = sample_task();
        let created_at = task.created_at;
        let later = created_at + chrono::Duration::seconds(5);

        TaskPatch::new("Write final report", true).apply(&mut task, later);

        assert_eq!(task.id, 7);
        assert_eq!(task.created_at, created_at);
        assert_eq!(task.updated_at, later);
        assert_eq!(task.name, "Write final report");
        assert!(task.completed);
    }

    #[test]
    fn test_deleted_at_is_never_serialized() {
        let mut task = sample_task();
        task.deleted_at = Some(Utc::now());
        assert!(task.is_deleted());

        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("deletedAt").is_none());
        assert_eq!(value["id"], 7);
        assert!(value["createdAt"].is_string());
    }
}
