use indexmap::IndexMap;
use serde::Serialize;

use crate::model::filter::{FilterCriteria, has_active_filters};
use crate::model::session::User;
use crate::model::task::{Task, TaskStatus};
use crate::util::unicode::fit_to_width;

/// Characters of a task id shown in text output
pub const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct BoardJson<'a> {
    pub filters: &'a FilterCriteria,
    /// Column name → tasks, in board order
    pub columns: IndexMap<&'static str, Vec<Task>>,
}

#[derive(Serialize)]
pub struct WhoamiJson<'a> {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<&'a User>,
}

pub fn board_to_json<'a>(
    filters: &'a FilterCriteria,
    columns: Vec<(TaskStatus, Vec<Task>)>,
) -> BoardJson<'a> {
    BoardJson {
        filters,
        columns: columns
            .into_iter()
            .map(|(status, tasks)| (status.as_str(), tasks))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// `  1a2b3c4d  high      Title...  @Assignee`
pub fn format_task_line(task: &Task, title_width: usize) -> String {
    let mut line = format!(
        "  {}  {:<8}  {}",
        short_id(&task.id),
        task.priority.as_str(),
        fit_to_width(&task.title, title_width),
    );
    if let Some(assignee) = &task.assignee {
        line.push_str("  @");
        line.push_str(&assignee.name);
    }
    line.trim_end().to_string()
}

/// Flat list line: the task line with its status in front.
pub fn format_list_line(task: &Task, title_width: usize) -> String {
    format!("{:<11}{}", task.status.as_str(), format_task_line(task, title_width))
}

pub fn format_filters(criteria: &FilterCriteria) -> String {
    if !has_active_filters(criteria) {
        return "Filters: none".to_string();
    }
    let mut parts = Vec::new();
    if let Some(q) = &criteria.search_query {
        parts.push(format!("search \"{}\"", q));
    }
    if let Some(a) = &criteria.assignee_id {
        parts.push(format!("assignee {}", a));
    }
    if let Some(p) = criteria.priority {
        parts.push(format!("priority {}", p));
    }
    format!("Filters: {}", parts.join(", "))
}

/// Columns in board order, each with a heading and count.
pub fn format_board(
    columns: &[(TaskStatus, Vec<Task>)],
    criteria: &FilterCriteria,
    title_width: usize,
) -> Vec<String> {
    let mut lines = Vec::new();
    if has_active_filters(criteria) {
        lines.push(format_filters(criteria));
        lines.push(String::new());
    }
    for (i, (status, tasks)) in columns.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("{} ({})", status.label(), tasks.len()));
        if tasks.is_empty() {
            lines.push("  (no tasks)".to_string());
        }
        for task in tasks {
            lines.push(format_task_line(task, title_width));
        }
    }
    lines
}

pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![
        format!("{}  {}", task.id, task.title),
        format!("  status: {}", task.status),
        format!("  priority: {}", task.priority),
    ];
    match &task.assignee {
        Some(a) => lines.push(format!("  assignee: {} ({})", a.name, a.id)),
        None => lines.push("  assignee: (unassigned)".to_string()),
    }
    lines.push(format!("  created: {} by {}", task.created_at.format("%Y-%m-%d %H:%M"), task.created_by));
    lines.push(format!("  updated: {}", task.updated_at.format("%Y-%m-%d %H:%M")));
    if !task.description.is_empty() {
        lines.push(String::new());
        for line in task.description.lines() {
            lines.push(format!("  {}", line));
        }
    }
    lines
}

pub fn format_user(user: &User) -> String {
    format!("{} ({})", user.display_name, user.username)
}
