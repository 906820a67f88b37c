//! In-memory task storage implementation
//!
//! Keeps every record, including soft-deleted ones, in an ordered map.
//! Nothing survives the process.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::model::{NewTask, Task, TaskId, TaskPatch};
use super::repository::TaskRepository;
use crate::{Error, Result};

#[derive(Default)]
struct MemoryState {
    /// Last id handed out; ids start at 1 and are never reused
    last_id: TaskId,
    tasks: BTreeMap<TaskId, Task>,
}

/// In-memory task store
#[derive(Default)]
pub struct MemoryTaskStore {
    state: RwLock<MemoryState>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, soft-deleted ones included
    pub async fn row_count(&self) -> usize {
        self.state.read().await.tasks.len()
    }

    async fn live_matching(&self, predicate: impl Fn(&Task) -> bool) -> Vec<Task> {
        let state = self.state.read().await;
        state
            .tasks
            .values()
            .filter(|&task| !task.is_deleted() && predicate(task))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskStore {
    async fn list(&self) -> Result<Vec<Task>> {
        Ok(self.live_matching(|_| true).await)
    }

    async fn get(&self, id: TaskId) -> Result<Task> {
        let state = self.state.read().await;
        state
            .tasks
            .get(&id)
            .filter(|t| !t.is_deleted())
            .cloned()
            .ok_or(Error::TaskNotFound(id))
    }

    async fn create(&self, task: NewTask) -> Result<Task> {
        let mut state = self.state.write().await;
        state.last_id += 1;

        let now = Utc::now();
        let created = Task {
            id: state.last_id,
            name: task.name,
            completed: task.completed,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.tasks.insert(created.id, created.clone());

        debug!("Created task {}", created.id);
        Ok(created)
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        let mut state = self.state.write().await;
        match state.tasks.get_mut(&id) {
            Some(task) if !task.is_deleted() => {
                task.deleted_at = Some(Utc::now());
                debug!("Soft-deleted task {}", id);
                Ok(())
            }
            _ => Err(Error::TaskNotFound(id)),
        }
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let mut state = self.state.write().await;
        match state.tasks.get_mut(&id) {
            Some(task) if !task.is_deleted() => {
                patch.apply(task, Utc::now());
                Ok(task.clone())
            }
            _ => Err(Error::TaskNotFound(id)),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<Task>> {
        Ok(self.live_matching(|t| t.name.contains(query)).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store(names: &[&str]) -> MemoryTaskStore {
        let store = MemoryTaskStore::new();
        for name in names {
            store.create(NewTask::new(*name)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = MemoryTaskStore::new();

        let first = store.create(NewTask::new("Buy milk")).await.unwrap();
        let second = store
            .create(NewTask::new("Walk dog").with_completed(true))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(!first.completed);
        assert!(second.completed);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_get_round_trip() {
        let store = MemoryTaskStore::new();
        let created = store.create(NewTask::new("Buy milk")).await.unwrap();

        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched, created);

        match store.get(99).await.unwrap_err() {
            Error::TaskNotFound(99) => {}
            e => panic!("Expected TaskNotFound error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let store = seeded_store(&["Task 1", "Task 2", "Task 3"]).await;

        let ids: Vec<TaskId> = store.list().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_update_preserves_identity() {
        let store = MemoryTaskStore::new();
        let created = store.create(NewTask::new("Buy milk")).await.unwrap();

        let updated = store
            .update(created.id, TaskPatch::new("Buy oat milk", true))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.name, "Buy oat milk");
        assert!(updated.completed);
        assert_eq!(store.get(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_nonexistent_task() {
        let store = MemoryTaskStore::new();
        let result = store.update(5, TaskPatch::new("Nothing", false)).await;
        assert!(matches!(result, Err(Error::TaskNotFound(5))));
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let store = seeded_store(&["Keep me", "Delete me"]).await;

        store.delete(2).await.unwrap();

        assert!(store.get(2).await.unwrap_err().is_not_found());
        let ids: Vec<TaskId> = store.list().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1]);
        assert!(store.search("Delete").await.unwrap().is_empty());
        assert!(store
            .update(2, TaskPatch::new("Revive", false))
            .await
            .unwrap_err()
            .is_not_found());

        // row is retained
        assert_eq!(store.row_count().await, 2);
    }

    #[tokio::test]
    async fn test_delete_twice_fails() {
        let store = seeded_store(&["Delete me"]).await;

        store.delete(1).await.unwrap();
        assert!(matches!(store.delete(1).await, Err(Error::TaskNotFound(1))));
        assert!(matches!(store.delete(42).await, Err(Error::TaskNotFound(42))));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = seeded_store(&["First task"]).await;
        store.delete(1).await.unwrap();

        let next = store.create(NewTask::new("Second task")).await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_search_is_case_sensitive_substring() {
        let store = seeded_store(&[
            "Hoc ve Docker",
            "Hoc ve Kubernetes",
            "Lap trinh Go co ban",
        ])
        .await;

        let found = store.search("Hoc").await.unwrap();
        let names: Vec<&str> = found.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Hoc ve Docker", "Hoc ve Kubernetes"]);

        assert!(store.search("hoc").await.unwrap().is_empty());
        assert_eq!(store.search("ve K").await.unwrap().len(), 1);
    }
}
