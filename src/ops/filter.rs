use std::cmp::Reverse;

use regex::Regex;

use crate::model::filter::FilterCriteria;
use crate::model::task::{Task, TaskStatus};

/// Case-insensitive literal matcher for a search query.
pub fn search_regex(query: &str) -> Option<Regex> {
    Regex::new(&format!("(?i){}", regex::escape(query))).ok()
}

fn matches_search(task: &Task, re: &Regex) -> bool {
    re.is_match(&task.title) || re.is_match(&task.description)
}

fn matches_fields(task: &Task, criteria: &FilterCriteria) -> bool {
    if let Some(assignee_id) = &criteria.assignee_id {
        match &task.assignee {
            Some(assignee) if assignee.id == *assignee_id => {}
            _ => return false,
        }
    }
    if let Some(priority) = criteria.priority
        && task.priority != priority
    {
        return false;
    }
    true
}

/// Tasks passing every active filter, in collection order.
pub fn filter_tasks(tasks: &[Task], criteria: &FilterCriteria) -> Vec<Task> {
    let search = criteria.search_query.as_deref().map(search_regex);
    tasks
        .iter()
        .filter(|task| match &search {
            Some(Some(re)) => matches_search(task, re),
            Some(None) => false,
            None => true,
        })
        .filter(|task| matches_fields(task, criteria))
        .cloned()
        .collect()
}

/// One board column: tasks with `status`, highest priority first.
/// Equal priorities keep their relative order.
pub fn column_tasks(tasks: &[Task], status: TaskStatus) -> Vec<Task> {
    let mut column: Vec<Task> = tasks.iter().filter(|t| t.status == status).cloned().collect();
    column.sort_by_key(|t| Reverse(t.priority.weight()));
    column
}
