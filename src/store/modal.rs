use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::reactive::{Derived, Observable, Subscription};

/// Type-erased modal state.
pub type ModalPayload = Rc<dyn Any>;

/// One open modal on the stack.
#[derive(Clone)]
pub struct ModalInstance {
    pub id: String,
    pub kind: String,
    pub payload: Option<ModalPayload>,
    pub opened_at: DateTime<Utc>,
}

impl ModalInstance {
    /// The payload, if present and of type `S`.
    pub fn payload_as<S: 'static>(&self) -> Option<&S> {
        self.payload.as_ref().and_then(|p| p.downcast_ref::<S>())
    }
}

impl fmt::Debug for ModalInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalInstance")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("has_payload", &self.payload.is_some())
            .field("opened_at", &self.opened_at)
            .finish()
    }
}

/// LIFO stack of open modals. The last element is the active one.
#[derive(Debug, Clone)]
pub struct ModalStack {
    stack: Observable<Vec<ModalInstance>>,
    active: Derived<Option<ModalInstance>>,
}

impl Default for ModalStack {
    fn default() -> Self {
        ModalStack::new()
    }
}

impl ModalStack {
    pub fn new() -> Self {
        let stack = Observable::new(Vec::new());
        let active = Derived::new(&stack, |s: &Vec<ModalInstance>| s.last().cloned());
        ModalStack { stack, active }
    }

    /// Open a modal on top of the stack. Returns its id.
    pub fn push(&self, kind: &str, payload: Option<ModalPayload>) -> String {
        let instance = ModalInstance {
            id: Uuid::new_v4().to_string(),
            kind: kind.to_string(),
            payload,
            opened_at: Utc::now(),
        };
        let id = instance.id.clone();
        debug!(kind, id = %id, "open modal");
        self.stack.update(|s| {
            let mut next = s.clone();
            next.push(instance);
            next
        });
        id
    }

    /// Close the instance with `id` wherever it sits, or the top one when `id` is `None`.
    pub fn pop(&self, id: Option<&str>) {
        self.stack.update(|s| {
            let mut next = s.clone();
            match id {
                Some(id) => next.retain(|m| m.id != id),
                None => {
                    next.pop();
                }
            }
            next
        });
    }

    /// Close every instance of `kind`, keeping the rest in order.
    pub fn close_type(&self, kind: &str) {
        self.stack
            .update(|s| s.iter().filter(|m| m.kind != kind).cloned().collect());
    }

    pub fn close_all(&self) {
        self.stack.set(Vec::new());
    }

    pub fn top(&self) -> Option<ModalInstance> {
        self.stack.get().last().cloned()
    }

    pub fn get_by_id(&self, id: &str) -> Option<ModalInstance> {
        self.stack.get().iter().find(|m| m.id == id).cloned()
    }

    pub fn has_modals(&self) -> bool {
        !self.stack.get().is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.get().len()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_modals()
    }

    /// Top of the stack, or `None` when nothing is open.
    pub fn active(&self) -> &Derived<Option<ModalInstance>> {
        &self.active
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Vec<ModalInstance>) + 'static,
    {
        self.stack.subscribe(callback)
    }

    /// Typed facade for modals of one kind.
    pub fn handler<S: 'static>(&self, kind: &str) -> ModalHandler<S> {
        ModalHandler {
            stack: self.clone(),
            kind: kind.to_string(),
            _state: PhantomData,
        }
    }

    /// Most recently opened instance of `kind`.
    fn last_of_kind(&self, kind: &str) -> Option<ModalInstance> {
        self.stack.get().iter().rev().find(|m| m.kind == kind).cloned()
    }
}

/// Open/close/query modals of a single kind with state of type `S`.
///
/// Calls without an id target the most recently opened instance of the kind,
/// so several instances (e.g. stacked confirmations) can coexist.
pub struct ModalHandler<S> {
    stack: ModalStack,
    kind: String,
    _state: PhantomData<fn() -> S>,
}

impl<S> fmt::Debug for ModalHandler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalHandler").field("kind", &self.kind).finish()
    }
}

impl<S: 'static> ModalHandler<S> {
    pub fn open(&self, state: Option<S>) -> String {
        let payload = state.map(|s| Rc::new(s) as ModalPayload);
        self.stack.push(&self.kind, payload)
    }

    pub fn close(&self, id: Option<&str>) {
        if let Some(instance) = self.resolve(id) {
            self.stack.pop(Some(&instance.id));
        }
    }

    pub fn is_open(&self, id: Option<&str>) -> bool {
        self.resolve(id).is_some()
    }

    pub fn get_state(&self, id: Option<&str>) -> Option<S>
    where
        S: Clone,
    {
        self.resolve(id)
            .and_then(|instance| instance.payload_as::<S>().cloned())
    }

    fn resolve(&self, id: Option<&str>) -> Option<ModalInstance> {
        match id {
            Some(id) => self.stack.get_by_id(id).filter(|m| m.kind == self.kind),
            None => self.stack.last_of_kind(&self.kind),
        }
    }
}
