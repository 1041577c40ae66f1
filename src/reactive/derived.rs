use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::observable::{Observable, Subscription};
use super::Readable;

/// A read-only view computed from one or two upstream views.
///
/// The view recomputes on every upstream notification and keeps its sources
/// alive. When the last handle is dropped it unsubscribes from them.
pub struct Derived<T> {
    output: Observable<T>,
    _links: Rc<Vec<Box<dyn Any>>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Derived {
            output: self.output.clone(),
            _links: Rc::clone(&self._links),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Derived").field(&self.output).finish()
    }
}

impl<T: 'static> Derived<T> {
    /// View over a single source.
    pub fn new<S, R, F>(source: &R, compute: F) -> Self
    where
        S: 'static,
        R: Readable<S>,
        F: Fn(&S) -> T + 'static,
    {
        let output = Observable::new(compute(&source.get()));
        let sink = output.clone();
        let primed = Cell::new(false);
        let subscription = source.subscribe(move |value| {
            // The replay from subscribe() matches the value computed above.
            if !primed.replace(true) {
                return;
            }
            sink.set(compute(value));
        });

        let links: Vec<Box<dyn Any>> = vec![Box::new(subscription), Box::new(source.clone())];
        Derived {
            output,
            _links: Rc::new(links),
        }
    }

    /// View over two sources; recomputes when either notifies.
    pub fn combine<A, B, RA, RB, F>(a: &RA, b: &RB, compute: F) -> Self
    where
        A: 'static,
        B: 'static,
        RA: Readable<A>,
        RB: Readable<B>,
        F: Fn(&A, &B) -> T + 'static,
    {
        let compute = Rc::new(compute);
        let output = Observable::new(compute(&a.get(), &b.get()));

        let sub_a = {
            let sink = output.clone();
            let other = b.clone();
            let compute = Rc::clone(&compute);
            let primed = Cell::new(false);
            a.subscribe(move |value| {
                if !primed.replace(true) {
                    return;
                }
                sink.set(compute(value, &other.get()));
            })
        };
        let sub_b = {
            let sink = output.clone();
            let other = a.clone();
            let compute = Rc::clone(&compute);
            let primed = Cell::new(false);
            b.subscribe(move |value| {
                if !primed.replace(true) {
                    return;
                }
                sink.set(compute(&other.get(), value));
            })
        };

        let links: Vec<Box<dyn Any>> = vec![
            Box::new(sub_a),
            Box::new(sub_b),
            Box::new(a.clone()),
            Box::new(b.clone()),
        ];
        Derived {
            output,
            _links: Rc::new(links),
        }
    }

    pub fn get(&self) -> Rc<T> {
        self.output.get()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        self.output.subscribe(callback)
    }
}

impl<T: 'static> Readable<T> for Derived<T> {
    fn get(&self) -> Rc<T> {
        Derived::get(self)
    }

    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        Derived::subscribe(self, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn derived_tracks_source() {
        let count = Observable::new(2);
        let doubled = Derived::new(&count, |n: &i32| n * 2);
        assert_eq!(*doubled.get(), 4);
        count.set(5);
        assert_eq!(*doubled.get(), 10);
    }

    #[test]
    fn derived_notifies_on_every_upstream_set() {
        let count = Observable::new(1);
        let parity = Derived::new(&count, |n: &i32| n % 2);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = parity.subscribe(move |_| h.set(h.get() + 1));

        count.set(3);
        count.set(5);
        // replay + two upstream sets, no deduplication
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn combine_recomputes_from_either_side() {
        let a = Observable::new(1);
        let b = Observable::new(10);
        let sum = Derived::combine(&a, &b, |x: &i32, y: &i32| x + y);
        assert_eq!(*sum.get(), 11);
        a.set(2);
        assert_eq!(*sum.get(), 12);
        b.set(20);
        assert_eq!(*sum.get(), 22);
    }

    #[test]
    fn chained_views_stay_alive_through_outer_handle() {
        let base = Observable::new(3);
        let outer = {
            let inner = Derived::new(&base, |n: &i32| n + 1);
            Derived::new(&inner, |n: &i32| n * 10)
        };
        base.set(4);
        assert_eq!(*outer.get(), 50);
    }

    #[test]
    fn dropping_view_unsubscribes_from_source() {
        let base = Observable::new(0);
        let view = Derived::new(&base, |n: &i32| *n);
        assert_eq!(base.subscriber_count(), 1);
        let copy = view.clone();
        drop(view);
        assert_eq!(base.subscriber_count(), 1);
        drop(copy);
        assert_eq!(base.subscriber_count(), 0);
    }

    #[test]
    fn compute_runs_once_at_construction() {
        let base = Observable::new(0);
        let calls = Rc::new(RefCell::new(0));
        let c = Rc::clone(&calls);
        let _view = Derived::new(&base, move |n: &i32| {
            *c.borrow_mut() += 1;
            *n
        });
        assert_eq!(*calls.borrow(), 1);
    }
}
