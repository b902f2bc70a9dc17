//! UI-confined cache of the last known state.
//!
//! The mirror lives on one thread (`Rc` + `RefCell`), so reads are
//! synchronous and never wait on the state owner. Writers are the bridge,
//! the optimistic dispatch path and binding writes.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Observer<S> = Rc<dyn Fn(&S)>;

pub struct ObservableMirror<S> {
    inner: Rc<MirrorInner<S>>,
}

pub(crate) struct MirrorInner<S> {
    value: RefCell<S>,
    version: Cell<u64>,
    observers: RefCell<Vec<(u64, Observer<S>)>>,
    next_id: Cell<u64>,
}

impl<S> Clone for ObservableMirror<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Clone + 'static> ObservableMirror<S> {
    pub fn new(initial: S) -> Self {
        Self {
            inner: Rc::new(MirrorInner {
                value: RefCell::new(initial),
                version: Cell::new(0),
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Clone of the current value.
    pub fn get(&self) -> S {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Number of assignments so far.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Call `observer` after every assignment until the returned
    /// subscription is dropped.
    pub fn subscribe(&self, observer: impl Fn(&S) + 'static) -> MirrorSubscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .observers
            .borrow_mut()
            .push((id, Rc::new(observer)));

        let weak = Rc::downgrade(&self.inner);
        MirrorSubscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.observers.borrow_mut().retain(|(other, _)| *other != id);
                }
            })),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Assign a new value and notify observers.
    ///
    /// Observers get their own copy, so they may read or write the mirror
    /// re-entrantly.
    pub(crate) fn set(&self, value: S) {
        *self.inner.value.borrow_mut() = value;
        self.inner.version.set(self.inner.version.get() + 1);

        let observers: Vec<Observer<S>> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        if observers.is_empty() {
            return;
        }
        let current = self.get();
        for observer in observers {
            observer(&current);
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<MirrorInner<S>> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<MirrorInner<S>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }
}

/// Keeps a mirror observer registered; dropping it unsubscribes.
pub struct MirrorSubscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Drop for MirrorSubscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_updates_value_and_version() {
        let mirror = ObservableMirror::new(1);
        assert_eq!(mirror.get(), 1);
        assert_eq!(mirror.version(), 0);
        mirror.set(7);
        assert_eq!(mirror.get(), 7);
        assert_eq!(mirror.with(|v| v * 2), 14);
        assert_eq!(mirror.version(), 1);
    }

    #[test]
    fn observers_fire_until_dropped() {
        let mirror = ObservableMirror::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = mirror.subscribe(move |v| sink.borrow_mut().push(*v));

        mirror.set(1);
        mirror.set(2);
        drop(subscription);
        mirror.set(3);

        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(mirror.observer_count(), 0);
    }

    #[test]
    fn observer_may_write_back() {
        let mirror = ObservableMirror::new(0);
        let handle = mirror.clone();
        let _subscription = mirror.subscribe(move |v| {
            if *v == 1 {
                handle.set(2);
            }
        });
        mirror.set(1);
        assert_eq!(mirror.get(), 2);
        assert_eq!(mirror.version(), 2);
    }

    #[test]
    fn weak_handle_dies_with_mirror() {
        let mirror = ObservableMirror::new(String::from("a"));
        let weak = mirror.downgrade();
        assert!(ObservableMirror::upgrade(&weak).is_some());
        drop(mirror);
        assert!(ObservableMirror::upgrade(&weak).is_none());
    }
}
