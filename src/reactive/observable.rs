use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use super::Readable;

type Callback<T> = Rc<dyn Fn(&T)>;

struct Slot<T> {
    id: u64,
    callback: Callback<T>,
}

/// A value waiting to be delivered, with the subscribers registered when it was set.
type Pending<T> = (Rc<T>, Vec<Callback<T>>);

struct Shared<T> {
    value: RefCell<Rc<T>>,
    subscribers: RefCell<Vec<Slot<T>>>,
    next_id: Cell<u64>,
    queue: RefCell<VecDeque<Pending<T>>>,
    draining: Cell<bool>,
}

/// Clears the draining flag even if a callback panics.
struct DrainGuard<'a>(&'a Cell<bool>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A single mutable value with synchronous subscribers.
///
/// Cloning an `Observable` yields another handle to the same value.
pub struct Observable<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Observable {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.shared.value.borrow())
            .field("subscribers", &self.shared.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Observable::new(T::default())
    }
}

impl<T: 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Observable {
            shared: Rc::new(Shared {
                value: RefCell::new(Rc::new(value)),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                queue: RefCell::new(VecDeque::new()),
                draining: Cell::new(false),
            }),
        }
    }

    /// Snapshot of the current value. The snapshot is not affected by later sets.
    pub fn get(&self) -> Rc<T> {
        Rc::clone(&self.shared.value.borrow())
    }

    /// Replace the value and notify every subscriber, even if nothing changed.
    ///
    /// A `set` made from inside a subscriber is queued and delivered after the
    /// current notification finishes, so every subscriber sees values in set
    /// order and ends on the latest one.
    pub fn set(&self, value: T) {
        *self.shared.value.borrow_mut() = Rc::new(value);
        self.notify();
    }

    /// Compute the next value from the current one, then behave like [`set`](Self::set).
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let current = self.get();
        self.set(f(&current));
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);

        let callback: Callback<T> = Rc::new(callback);
        self.shared.subscribers.borrow_mut().push(Slot {
            id,
            callback: Rc::clone(&callback),
        });
        callback(&self.get());

        let weak: Weak<Shared<T>> = Rc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = weak.upgrade() {
                // Drop the callback after releasing the borrow; it may own
                // subscriptions to this same observable.
                let removed = {
                    let mut subscribers = shared.subscribers.borrow_mut();
                    subscribers
                        .iter()
                        .position(|slot| slot.id == id)
                        .map(|i| subscribers.remove(i))
                };
                drop(removed);
            }
        })
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.borrow().len()
    }

    fn notify(&self) {
        let shared = &self.shared;
        let callbacks: Vec<Callback<T>> = shared
            .subscribers
            .borrow()
            .iter()
            .map(|slot| Rc::clone(&slot.callback))
            .collect();
        shared.queue.borrow_mut().push_back((self.get(), callbacks));
        if shared.draining.replace(true) {
            return;
        }

        let _guard = DrainGuard(&shared.draining);
        loop {
            // Release the borrow before dispatching; callbacks may enqueue.
            let next = shared.queue.borrow_mut().pop_front();
            let Some((value, callbacks)) = next else {
                break;
            };
            for callback in callbacks {
                callback(&value);
            }
        }
    }
}

impl<T: 'static> Readable<T> for Observable<T> {
    fn get(&self) -> Rc<T> {
        Observable::get(self)
    }

    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        Observable::subscribe(self, callback)
    }
}

/// Handle to a registered subscriber. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the callback"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the callback registered for as long as the source lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
