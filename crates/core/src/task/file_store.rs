//! File-based task storage implementation
//!
//! Stores tasks as JSON in a file on disk, with an in-memory cache guarded by
//! a read-write lock. Single-record writes are atomic under the write lock;
//! conflicting updates to the same record are last-writer-wins.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::filter::TaskFilter;
use super::model::Task;
use super::repository::TaskRepository;
use crate::{Error, Result};

/// File-based task store using JSON
pub struct FileTaskStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory cache of tasks
    cache: RwLock<HashMap<Uuid, Task>>,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let tasks: Vec<Task> = serde_json::from_str(&content)?;
            tasks.into_iter().map(|t| (t.id, t)).collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Persist the cache to disk
    async fn persist(&self) -> Result<()> {
        let cache = self.cache.read().await;
        let tasks: Vec<&Task> = cache.values().collect();
        let content = serde_json::to_string_pretty(&tasks)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for FileTaskStore {
    async fn create(&self, task: Task) -> Result<Task> {
        {
            let mut cache = self.cache.write().await;
            if cache.contains_key(&task.id) {
                return Err(Error::Storage(format!(
                    "Task with ID {} already exists",
                    task.id
                )));
            }
            cache.insert(task.id, task.clone());
        }
        self.persist().await?;
        tracing::debug!(task_id = %task.id, "task created");
        Ok(task)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        let cache = self.cache.read().await;
        Ok(cache.get(&id).cloned())
    }

    async fn list(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>> {
        let cache = self.cache.read().await;
        let mut tasks: Vec<Task> = cache
            .values()
            .filter(|t| t.owner_id == owner_id && filter.matches(t))
            .cloned()
            .collect();
        // Sort by created_at descending (newest first)
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update(&self, mut task: Task) -> Result<Task> {
        task.updated_at = Utc::now();
        {
            let mut cache = self.cache.write().await;
            if !cache.contains_key(&task.id) {
                return Err(Error::TaskNotFound(task.id.to_string()));
            }
            cache.insert(task.id, task.clone());
        }
        self.persist().await?;
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = {
            let mut cache = self.cache.write().await;
            cache.remove(&id).is_some()
        };
        if removed {
            self.persist().await?;
            tracing::debug!(task_id = %id, "task deleted");
        }
        Ok(removed)
    }
}
