//! Application state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tm_core::task::FileTaskStore;

use crate::auth::AuthStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_store: FileTaskStore,
    auth_store: AuthStore,
    data_dir: PathBuf,
}

impl AppState {
    /// Create a new AppState with the given data directory
    pub async fn new(data_dir: PathBuf) -> tm_core::Result<Self> {
        let tasks_path = data_dir.join("tasks.json");
        let task_store = FileTaskStore::new(tasks_path).await?;
        let auth_store = AuthStore::new(data_dir.join("auth"))
            .await
            .map_err(|err| tm_core::Error::Storage(err.to_string()))?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                task_store,
                auth_store,
                data_dir,
            }),
        })
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &FileTaskStore {
        &self.inner.task_store
    }

    /// Get reference to the auth store
    pub fn auth_store(&self) -> &AuthStore {
        &self.inner.auth_store
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }
}
