use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::model::filter::FilterCriteria;
use crate::model::task::Priority;
use crate::reactive::{Observable, Readable, Subscription};
use crate::util::debounce::{Clock, Debouncer, SystemClock};

/// Holds the live [`FilterCriteria`].
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    criteria: Observable<FilterCriteria>,
}

/// Empty input means "no constraint".
fn normalize(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl FilterStore {
    pub fn new() -> Self {
        FilterStore::default()
    }

    /// Replace every field at once.
    pub fn set_filters(&self, criteria: FilterCriteria) {
        self.criteria.set(criteria);
    }

    pub fn set_search_query(&self, query: &str) {
        debug!(query, "search filter");
        let search_query = normalize(Some(query));
        self.criteria.update(|c| FilterCriteria {
            search_query,
            ..c.clone()
        });
    }

    pub fn set_assignee_filter(&self, assignee_id: Option<&str>) {
        let assignee_id = normalize(assignee_id);
        self.criteria.update(|c| FilterCriteria {
            assignee_id,
            ..c.clone()
        });
    }

    pub fn set_priority_filter(&self, priority: Option<Priority>) {
        self.criteria.update(|c| FilterCriteria {
            priority,
            ..c.clone()
        });
    }

    pub fn clear_filters(&self) {
        self.criteria.set(FilterCriteria::default());
    }

    pub fn criteria(&self) -> Rc<FilterCriteria> {
        self.criteria.get()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FilterCriteria) + 'static,
    {
        self.criteria.subscribe(callback)
    }
}

impl Readable<FilterCriteria> for FilterStore {
    fn get(&self) -> Rc<FilterCriteria> {
        self.criteria()
    }

    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FilterCriteria) + 'static,
    {
        FilterStore::subscribe(self, callback)
    }
}

/// Search box input that reaches the [`FilterStore`] only after a quiet period.
#[derive(Debug)]
pub struct DebouncedSearch<C: Clock = SystemClock> {
    filters: FilterStore,
    debouncer: Debouncer<String, C>,
}

impl DebouncedSearch<SystemClock> {
    pub fn new(filters: FilterStore, delay: Duration) -> Self {
        DebouncedSearch::with_clock(filters, delay, SystemClock)
    }
}

impl<C: Clock> DebouncedSearch<C> {
    pub fn with_clock(filters: FilterStore, delay: Duration, clock: C) -> Self {
        DebouncedSearch {
            filters,
            debouncer: Debouncer::with_clock(delay, clock),
        }
    }

    /// A keystroke: replaces any pending query and restarts the timer.
    pub fn input(&mut self, query: &str) {
        self.debouncer.schedule(query.to_string());
    }

    /// Propagate the pending query if its timer has elapsed.
    pub fn tick(&mut self) -> bool {
        match self.debouncer.poll() {
            Some(query) => {
                self.filters.set_search_query(&query);
                true
            }
            None => false,
        }
    }

    /// Propagate the pending query immediately.
    pub fn flush(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(query) => {
                self.filters.set_search_query(&query);
                true
            }
            None => false,
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.debouncer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn time_remaining(&self) -> Option<Duration> {
        self.debouncer.time_remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::filter::has_active_filters;
    use crate::util::debounce::ManualClock;
    use std::cell::RefCell;

    #[test]
    fn setters_normalize_empty_to_absent() {
        let filters = FilterStore::new();
        filters.set_search_query("bug");
        filters.set_assignee_filter(Some("u-alice"));
        assert!(has_active_filters(&filters.criteria()));

        filters.set_search_query("");
        filters.set_assignee_filter(Some(""));
        assert_eq!(*filters.criteria(), FilterCriteria::default());
    }

    #[test]
    fn per_field_setters_preserve_other_fields() {
        let filters = FilterStore::new();
        filters.set_priority_filter(Some(Priority::High));
        filters.set_search_query("login");
        filters.set_assignee_filter(None);
        let c = filters.criteria();
        assert_eq!(c.priority, Some(Priority::High));
        assert_eq!(c.search_query.as_deref(), Some("login"));
        assert_eq!(c.assignee_id, None);
    }

    #[test]
    fn clear_resets_everything() {
        let filters = FilterStore::new();
        filters.set_filters(FilterCriteria {
            search_query: Some("x".into()),
            assignee_id: Some("u-bob".into()),
            priority: Some(Priority::Low),
        });
        filters.clear_filters();
        assert!(!has_active_filters(&filters.criteria()));
    }

    #[test]
    fn rapid_input_propagates_once_with_last_value() {
        let filters = FilterStore::new();
        let updates = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&updates);
        let _sub = filters.subscribe(move |c| sink.borrow_mut().push(c.search_query.clone()));
        updates.borrow_mut().clear();

        let clock = ManualClock::new();
        let mut search =
            DebouncedSearch::with_clock(filters.clone(), Duration::from_millis(300), clock.clone());
        search.input("f");
        clock.advance(Duration::from_millis(50));
        search.input("fi");
        clock.advance(Duration::from_millis(50));
        search.input("fix");
        assert!(!search.tick());

        clock.advance(Duration::from_millis(300));
        assert!(search.tick());
        assert!(!search.tick());

        assert_eq!(*updates.borrow(), vec![Some("fix".to_string())]);
    }

    #[test]
    fn flush_skips_the_wait() {
        let filters = FilterStore::new();
        let mut search = DebouncedSearch::new(filters.clone(), Duration::from_secs(60));
        search.input("docs");
        assert!(search.is_pending());
        assert!(search.flush());
        assert_eq!(filters.criteria().search_query.as_deref(), Some("docs"));
    }
}
