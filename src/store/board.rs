use crate::model::filter::FilterCriteria;
use crate::model::task::{Task, TaskStatus};
use crate::ops::filter::{column_tasks, filter_tasks};
use crate::reactive::Derived;

use super::filters::FilterStore;
use super::tasks::TaskStore;

/// Derived board state: tasks × filters → filtered list → three sorted columns.
#[derive(Debug, Clone)]
pub struct BoardViews {
    filtered: Derived<Vec<Task>>,
    todo: Derived<Vec<Task>>,
    in_progress: Derived<Vec<Task>>,
    done: Derived<Vec<Task>>,
}

impl BoardViews {
    pub fn new(tasks: &TaskStore, filters: &FilterStore) -> Self {
        let filtered = Derived::combine(
            &**tasks,
            filters,
            |tasks: &Vec<Task>, criteria: &FilterCriteria| filter_tasks(tasks, criteria),
        );
        let column = |status: TaskStatus| {
            Derived::new(&filtered, move |tasks: &Vec<Task>| column_tasks(tasks, status))
        };
        BoardViews {
            todo: column(TaskStatus::Todo),
            in_progress: column(TaskStatus::InProgress),
            done: column(TaskStatus::Done),
            filtered,
        }
    }

    /// Filtered tasks in collection order (unsorted).
    pub fn filtered(&self) -> &Derived<Vec<Task>> {
        &self.filtered
    }

    /// Filtered tasks in `status`, highest priority first.
    pub fn column(&self, status: TaskStatus) -> &Derived<Vec<Task>> {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }
}
