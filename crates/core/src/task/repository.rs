//! Task repository trait
//!
//! Defines the interface for task storage operations. Every read skips
//! soft-deleted records.

use async_trait::async_trait;

use super::model::{NewTask, Task, TaskId, TaskPatch};
use crate::Result;

/// Repository interface for task CRUD and search operations
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Get all live tasks, ordered by id
    async fn list(&self) -> Result<Vec<Task>>;

    /// Get a live task by ID
    ///
    /// Fails with `Error::TaskNotFound` when the task is absent or deleted.
    async fn get(&self, id: TaskId) -> Result<Task>;

    /// Persist a new task, assigning its id and timestamps
    async fn create(&self, task: NewTask) -> Result<Task>;

    /// Soft-delete a task
    ///
    /// Deleting an absent or already deleted task fails with
    /// `Error::TaskNotFound`.
    async fn delete(&self, id: TaskId) -> Result<()>;

    /// Overwrite the name and completion flag of a live task
    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task>;

    /// Find live tasks whose name contains `query` (case-sensitive)
    async fn search(&self, query: &str) -> Result<Vec<Task>>;
}
