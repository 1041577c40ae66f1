use std::ops::Deref;

use tracing::debug;

use crate::model::task::{Task, TaskChanges, TaskStatus};

use super::entity::EntityStore;

/// The task collection: an [`EntityStore`] of [`Task`] plus status moves.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: EntityStore<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        TaskStore::default()
    }

    /// Move a task to another column. `updated_at` is refreshed by the update.
    pub fn move_task(&self, id: &str, status: TaskStatus) {
        debug!(id, %status, "move task");
        self.tasks.update_one(&id.to_string(), TaskChanges::status(status));
    }
}

impl Deref for TaskStore {
    type Target = EntityStore<Task>;

    fn deref(&self) -> &EntityStore<Task> {
        &self.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use chrono::{Duration, Utc};

    fn task(id: &str, status: TaskStatus) -> Task {
        let at = Utc::now() - Duration::minutes(5);
        Task {
            id: id.into(),
            title: format!("Task {}", id),
            description: String::new(),
            status,
            priority: Priority::Medium,
            assignee: None,
            created_at: at,
            updated_at: at,
            created_by: "u-demo".into(),
        }
    }

    #[test]
    fn move_task_changes_status_and_timestamp() {
        let store = TaskStore::new();
        store.add_one(task("a", TaskStatus::Todo));
        let before = store.get(&"a".to_string()).unwrap().updated_at;

        store.move_task("a", TaskStatus::InProgress);
        let moved = store.get(&"a".to_string()).unwrap();
        assert_eq!(moved.status, TaskStatus::InProgress);
        assert!(moved.updated_at > before);
    }

    #[test]
    fn move_missing_task_is_noop() {
        let store = TaskStore::new();
        store.add_one(task("a", TaskStatus::Todo));
        store.move_task("zzz", TaskStatus::Done);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&"a".to_string()).unwrap().status, TaskStatus::Todo);
    }
}
