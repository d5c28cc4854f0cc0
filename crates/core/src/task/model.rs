//! Task model definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::Result;

/// Lifecycle status of a task
///
/// No transition order is enforced; any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(Error::validation(
                "status",
                format!("Unsupported status '{}'", other),
            )),
        }
    }
}

/// A single unit of work, owned by exactly one user for its whole lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task for the given owner
    ///
    /// The title is trimmed and must be non-empty afterwards.
    pub fn new(owner_id: Uuid, title: impl Into<String>) -> Result<Self> {
        let title = validate_title(title.into())?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            title,
            description: None,
            status: TaskStatus::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

/// Partial update over a task's caller-mutable fields
///
/// `id` and `owner_id` are not representable here and so can never change
/// through the update path. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskChanges {
    /// Apply the present fields to a task, validating as the model requires
    pub fn apply_to(self, task: &mut Task) -> Result<()> {
        if let Some(title) = self.title {
            task.title = validate_title(title)?;
        }
        if let Some(description) = self.description {
            task.description = Some(description);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        Ok(())
    }
}

/// Trim-then-check title validation shared by create and update
fn validate_title(raw: String) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("title", "Title cannot be empty"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task() {
        let owner = Uuid::new_v4();
        let task = Task::new(owner, "Buy milk").unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.owner_id, owner);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.description.is_none());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_empty_title_rejected() {
        let result = Task::new(Uuid::new_v4(), "");
        match result.unwrap_err() {
            Error::Validation { field, .. } => assert_eq!(field, "title"),
            e => panic!("Expected Validation error, got: {:?}", e),
        }
    }

    #[test]
    fn test_whitespace_title_rejected() {
        assert!(Task::new(Uuid::new_v4(), "   \t ").is_err());
    }

    #[test]
    fn test_title_stored_trimmed() {
        let task = Task::new(Uuid::new_v4(), "  Walk the dog  ").unwrap();
        assert_eq!(task.title, "Walk the dog");
    }

    #[test]
    fn test_task_with_description_and_status() {
        let task = Task::new(Uuid::new_v4(), "Test task")
            .unwrap()
            .with_description("This is a test")
            .with_status(TaskStatus::InProgress);
        assert_eq!(task.description, Some("This is a test".to_string()));
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            TaskStatus::from_str("in_progress").unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(
            TaskStatus::from_str(" completed ").unwrap(),
            TaskStatus::Completed
        );
        assert!(TaskStatus::from_str("done").is_err());
    }

    #[test]
    fn test_changes_apply_only_present_fields() {
        let mut task = Task::new(Uuid::new_v4(), "Original")
            .unwrap()
            .with_description("keep me");
        let changes = TaskChanges {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        changes.apply_to(&mut task).unwrap();
        assert_eq!(task.title, "Original");
        assert_eq!(task.description, Some("keep me".to_string()));
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn test_changes_reject_blank_title() {
        let mut task = Task::new(Uuid::new_v4(), "Original").unwrap();
        let changes = TaskChanges {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(changes.apply_to(&mut task).is_err());
        assert_eq!(task.title, "Original");
    }
}
