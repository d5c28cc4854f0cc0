//! List-query filter configuration
//!
//! Mirrors the two optional narrowing parameters of the list endpoint. Both
//! filters combine conjunctively: a task must match every present filter.

use super::model::{Task, TaskStatus};

/// Optional status/search parameters narrowing a list query
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    status: Option<TaskStatus>,
    search: Option<String>,
}

impl TaskFilter {
    /// Build a filter; an empty or whitespace-only search term means no filter
    pub fn new(status: Option<TaskStatus>, search: Option<String>) -> Self {
        let search = search
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty());
        Self { status, search }
    }

    pub fn with_status(status: TaskStatus) -> Self {
        Self::new(Some(status), None)
    }

    pub fn with_search(term: impl Into<String>) -> Self {
        Self::new(None, Some(term.into()))
    }

    /// Whether a task satisfies every present filter
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let needle = term.to_lowercase();
            let title_hit = task.title.to_lowercase().contains(&needle);
            let description_hit = task
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !title_hit && !description_hit {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn task(title: &str, description: Option<&str>, status: TaskStatus) -> Task {
        let mut task = Task::new(Uuid::new_v4(), title).unwrap().with_status(status);
        if let Some(description) = description {
            task = task.with_description(description);
        }
        task
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = TaskFilter::default();
        assert!(filter.matches(&task("Anything", None, TaskStatus::Pending)));
        assert!(filter.matches(&task("Else", Some("desc"), TaskStatus::Completed)));
    }

    #[test]
    fn test_status_filter_is_exact() {
        let filter = TaskFilter::with_status(TaskStatus::Completed);
        assert!(filter.matches(&task("A", None, TaskStatus::Completed)));
        assert!(!filter.matches(&task("B", None, TaskStatus::Pending)));
        assert!(!filter.matches(&task("C", None, TaskStatus::InProgress)));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let filter = TaskFilter::with_search("foo");
        assert!(filter.matches(&task("Foobar", None, TaskStatus::Pending)));
        assert!(filter.matches(&task("has FOO inside", None, TaskStatus::Pending)));
        assert!(!filter.matches(&task("bar", None, TaskStatus::Pending)));
    }

    #[test]
    fn test_search_covers_description() {
        let filter = TaskFilter::with_search("groceries");
        assert!(filter.matches(&task(
            "Errands",
            Some("Pick up Groceries"),
            TaskStatus::Pending
        )));
        assert!(!filter.matches(&task("Errands", None, TaskStatus::Pending)));
    }

    #[test]
    fn test_blank_search_ignored() {
        let filter = TaskFilter::new(None, Some("   ".to_string()));
        assert!(filter.matches(&task("Anything", None, TaskStatus::Pending)));
    }

    #[test]
    fn test_combined_filters_are_conjunctive() {
        let filter = TaskFilter::new(Some(TaskStatus::Pending), Some("x".to_string()));
        assert!(filter.matches(&task("fix bug", None, TaskStatus::Pending)));
        assert!(!filter.matches(&task("fix bug", None, TaskStatus::Completed)));
        assert!(!filter.matches(&task("cleanup", None, TaskStatus::Pending)));
    }
}
