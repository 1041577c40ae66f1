use std::rc::Rc;

use crate::io::persist::{self, Persistence};
use crate::io::storage::Storage;
use crate::store::{AuthStore, BoardViews, FilterStore, ModalStack, TaskStore};

/// One instance of every store, constructed once at start-up and handed to
/// whatever drives the UI.
#[derive(Debug)]
pub struct BoardContext {
    pub auth: AuthStore,
    pub tasks: TaskStore,
    pub filters: FilterStore,
    pub modals: ModalStack,
    pub board: BoardViews,
    persistence: Option<Persistence>,
}

impl Default for BoardContext {
    fn default() -> Self {
        BoardContext::new()
    }
}

impl BoardContext {
    /// In-memory context with empty stores.
    pub fn new() -> Self {
        let tasks = TaskStore::new();
        let filters = FilterStore::new();
        let board = BoardViews::new(&tasks, &filters);
        BoardContext {
            auth: AuthStore::new(),
            tasks,
            filters,
            modals: ModalStack::new(),
            board,
            persistence: None,
        }
    }

    /// Context rehydrated from `storage` that writes every change back to it.
    pub fn with_storage(storage: Rc<dyn Storage>) -> Self {
        let mut ctx = BoardContext::new();
        persist::rehydrate(storage.as_ref(), &ctx.auth, &ctx.tasks, &ctx.filters);
        ctx.persistence = Some(Persistence::attach(storage, &ctx.auth, &ctx.tasks, &ctx.filters));
        ctx
    }

    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStorage;
    use crate::model::task::TaskStatus;
    use crate::ops::auth::{MockAuthService, login};
    use crate::ops::task_ops::{NewTask, create_task};
    use std::time::Duration;

    #[test]
    fn contexts_are_independent() {
        let a = BoardContext::new();
        let b = BoardContext::new();
        a.filters.set_search_query("only a");
        assert!(b.filters.criteria().search_query.is_none());
        assert!(!a.is_persistent());
    }

    #[test]
    fn storage_backed_context_survives_restart() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        let service = MockAuthService::new(Duration::ZERO);
        {
            let ctx = BoardContext::with_storage(Rc::clone(&storage));
            assert!(ctx.is_persistent());
            login(&ctx.auth, &service, "bob", "bob123");
            let user = ctx.auth.session().user.clone().unwrap();
            let task = create_task(&ctx.tasks, NewTask::new("Persisted task"), &user).unwrap();
            ctx.tasks.move_task(&task.id, TaskStatus::InProgress);
        }

        let ctx = BoardContext::with_storage(storage);
        assert!(ctx.auth.session().authenticated);
        let column = ctx.board.column(TaskStatus::InProgress).get();
        assert_eq!(column.len(), 1);
        assert_eq!(column[0].title, "Persisted task");
    }
}
