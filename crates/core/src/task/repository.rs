//! Task repository trait
//!
//! Defines the interface for owner-scoped task storage operations.

use async_trait::async_trait;
use uuid::Uuid;

use super::filter::TaskFilter;
use super::model::Task;
use crate::Result;

/// Repository interface for task CRUD operations
///
/// `get` deliberately performs no ownership check; callers compose it with the
/// access policy before acting on the returned record.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new task
    async fn create(&self, task: Task) -> Result<Task>;

    /// Get a task by ID regardless of owner
    async fn get(&self, id: Uuid) -> Result<Option<Task>>;

    /// List one owner's tasks matching the filter, newest first
    async fn list(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Replace an existing task, advancing its `updated_at`
    async fn update(&self, task: Task) -> Result<Task>;

    /// Delete a task by ID; false when no such task existed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
