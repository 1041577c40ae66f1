use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::model::filter::FilterCriteria;
use crate::model::session::Session;
use crate::model::task::Task;
use crate::reactive::Subscription;
use crate::store::{AuthStore, FilterStore, TaskStore};

use super::storage::{Storage, StorageError};

pub const AUTH_KEY: &str = "taskboard-auth";
pub const TASKS_KEY: &str = "taskboard-tasks";
pub const FILTERS_KEY: &str = "taskboard-filters";

/// Read and decode a stored value. Missing, unreadable, or undecodable
/// values all come back as `None`.
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    if !storage.is_available() {
        return None;
    }
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding unreadable stored value");
            None
        }
    }
}

fn try_save<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value)?;
    storage.set(key, &json)
}

/// Encode and store a value. Failures are logged; the in-memory state is
/// unaffected.
pub fn save_json<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) {
    match try_save(storage, key, value) {
        Ok(()) => debug!(key, "saved"),
        Err(e) => warn!(key, error = %e, "could not persist value; continuing in memory"),
    }
}

fn forget(storage: &dyn Storage, key: &str) {
    if let Err(e) = storage.remove(key) {
        warn!(key, error = %e, "could not remove stored value");
    }
}

/// Restore the stores from their stored snapshots, where present.
pub fn rehydrate(storage: &dyn Storage, auth: &AuthStore, tasks: &TaskStore, filters: &FilterStore) {
    if let Some(session) = load_json::<Session>(storage, AUTH_KEY) {
        auth.restore(session);
    }
    if let Some(stored) = load_json::<Vec<Task>>(storage, TASKS_KEY) {
        debug!(count = stored.len(), "restored tasks");
        tasks.set_all(stored);
    }
    if let Some(criteria) = load_json::<FilterCriteria>(storage, FILTERS_KEY) {
        filters.set_filters(criteria);
    }
}

/// Writes a snapshot of each store to storage after every change.
/// Dropping it stops persisting.
pub struct Persistence {
    _subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("subscriptions", &self._subscriptions.len())
            .finish()
    }
}

impl Persistence {
    pub fn attach(
        storage: Rc<dyn Storage>,
        auth: &AuthStore,
        tasks: &TaskStore,
        filters: &FilterStore,
    ) -> Self {
        let auth_sub = {
            let storage = Rc::clone(&storage);
            auth.subscribe(move |session: &Session| {
                if session.authenticated {
                    save_json(storage.as_ref(), AUTH_KEY, session);
                } else {
                    forget(storage.as_ref(), AUTH_KEY);
                }
            })
        };
        let tasks_sub = {
            let storage = Rc::clone(&storage);
            tasks.subscribe(move |list: &Vec<Task>| save_json(storage.as_ref(), TASKS_KEY, list))
        };
        let filters_sub = {
            let storage = Rc::clone(&storage);
            filters.subscribe(move |criteria: &FilterCriteria| {
                save_json(storage.as_ref(), FILTERS_KEY, criteria)
            })
        };
        Persistence {
            _subscriptions: vec![auth_sub, tasks_sub, filters_sub],
        }
    }
}
