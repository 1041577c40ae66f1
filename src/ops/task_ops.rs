use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::model::session::User;
use crate::model::task::{Assignee, Priority, Task, TaskChanges, TaskStatus};
use crate::store::TaskStore;

/// Minimum title length, in characters, after trimming
pub const MIN_TITLE_LEN: usize = 3;

/// Error type for task operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("title must be at least {min} characters (got {actual})")]
    TitleTooShort { min: usize, actual: usize },
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task id '{0}' is ambiguous; use more characters")]
    AmbiguousId(String),
    #[error("unknown user: {0}")]
    UnknownUser(String),
}

/// Fields for a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assignee: Option<Assignee>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            assignee: None,
        }
    }
}

/// Trim and check a title.
pub fn validate_title(title: &str) -> Result<String, TaskError> {
    let trimmed = title.trim();
    let len = trimmed.chars().count();
    if len < MIN_TITLE_LEN {
        return Err(TaskError::TitleTooShort {
            min: MIN_TITLE_LEN,
            actual: len,
        });
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Validate and add a task. Returns the stored task.
pub fn create_task(store: &TaskStore, new: NewTask, created_by: &User) -> Result<Task, TaskError> {
    let title = validate_title(&new.title)?;
    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4().to_string(),
        title,
        description: new.description.trim().to_string(),
        status: new.status,
        priority: new.priority,
        assignee: new.assignee,
        created_at: now,
        updated_at: now,
        created_by: created_by.id.clone(),
    };
    info!(id = %task.id, "created task");
    store.add_one(task.clone());
    Ok(task)
}

fn require(store: &TaskStore, id: &str) -> Result<(), TaskError> {
    if store.get(&id.to_string()).is_some() {
        Ok(())
    } else {
        Err(TaskError::NotFound(id.to_string()))
    }
}

/// Apply a partial edit. A title in `changes` is validated first.
pub fn edit_task(store: &TaskStore, id: &str, mut changes: TaskChanges) -> Result<(), TaskError> {
    require(store, id)?;
    if let Some(title) = &changes.title {
        changes.title = Some(validate_title(title)?);
    }
    store.update_one(&id.to_string(), changes);
    Ok(())
}

pub fn move_task(store: &TaskStore, id: &str, status: TaskStatus) -> Result<(), TaskError> {
    require(store, id)?;
    store.move_task(id, status);
    Ok(())
}

/// Assign (or with `None`, unassign). The user is copied into the task.
pub fn assign_task(store: &TaskStore, id: &str, user: Option<&User>) -> Result<(), TaskError> {
    require(store, id)?;
    store.update_one(&id.to_string(), TaskChanges::assignee(user.map(Assignee::from)));
    Ok(())
}

pub fn delete_task(store: &TaskStore, id: &str) -> Result<(), TaskError> {
    require(store, id)?;
    info!(id, "deleted task");
    store.remove_one(&id.to_string());
    Ok(())
}

/// Resolve a full id or a unique id prefix.
pub fn resolve_id(tasks: &[Task], id_or_prefix: &str) -> Result<String, TaskError> {
    if id_or_prefix.is_empty() {
        return Err(TaskError::NotFound(String::new()));
    }
    if let Some(task) = tasks.iter().find(|t| t.id == id_or_prefix) {
        return Ok(task.id.clone());
    }
    let mut matches = tasks.iter().filter(|t| t.id.starts_with(id_or_prefix));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id.clone()),
        (Some(_), Some(_)) => Err(TaskError::AmbiguousId(id_or_prefix.to_string())),
        _ => Err(TaskError::NotFound(id_or_prefix.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// A small demo board, created by `creator`.
pub fn sample_tasks(creator: &User) -> Vec<Task> {
    let now = Utc::now();
    let seeds: [(&str, &str, TaskStatus, Priority, i64); 6] = [
        (
            "Set up project board",
            "Create columns and invite the team",
            TaskStatus::Done,
            Priority::Medium,
            72,
        ),
        (
            "Fix login redirect",
            "Users land on a blank page after signing in",
            TaskStatus::InProgress,
            Priority::Critical,
            48,
        ),
        (
            "Write onboarding guide",
            "Cover filters, search and drag-and-drop",
            TaskStatus::Todo,
            Priority::Low,
            30,
        ),
        (
            "Add priority badges",
            "Colour-code cards by priority",
            TaskStatus::Todo,
            Priority::High,
            24,
        ),
        (
            "Review search performance",
            "Check filtering with a few hundred tasks",
            TaskStatus::InProgress,
            Priority::Medium,
            12,
        ),
        (
            "Plan next sprint",
            "",
            TaskStatus::Todo,
            Priority::Medium,
            2,
        ),
    ];
    seeds
        .iter()
        .map(|(title, description, status, priority, hours_ago)| {
            let at = now - Duration::hours(*hours_ago);
            Task {
                id: Uuid::new_v4().to_string(),
                title: title.to_string(),
                description: description.to_string(),
                status: *status,
                priority: *priority,
                assignee: Some(Assignee::from(creator)),
                created_at: at,
                updated_at: at,
                created_by: creator.id.clone(),
            }
        })
        .collect()
}
