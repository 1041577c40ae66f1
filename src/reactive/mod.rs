//! Synchronous push-based reactivity.
//!
//! An [`Observable`] holds one value and notifies its subscribers, in
//! registration order, every time it is set. A [`Derived`] view recomputes
//! from one or two upstream views on every upstream notification and then
//! notifies its own subscribers. Everything runs on the calling thread and
//! has finished by the time `set` returns.

pub mod derived;
pub mod observable;

pub use derived::Derived;
pub use observable::{Observable, Subscription};

use std::rc::Rc;

/// Anything that can be read and subscribed to: observables and derived views.
pub trait Readable<T>: Clone + 'static {
    /// Snapshot of the current value.
    fn get(&self) -> Rc<T>;

    /// Register `callback`. It is invoked once immediately with the current
    /// value, then after every update until the subscription is dropped.
    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static;
}
