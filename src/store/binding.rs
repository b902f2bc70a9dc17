//! Paired get/set accessor for two-way binding.

use std::rc::Rc;

use super::task::StoreTask;

/// Reads come from the mirror; writes update the mirror immediately and
/// overwrite canonical state without running the reducer.
pub struct Binding<T> {
    get: Rc<dyn Fn() -> T>,
    set: Rc<dyn Fn(T) -> StoreTask>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            get: Rc::clone(&self.get),
            set: Rc::clone(&self.set),
        }
    }
}

impl<T: 'static> Binding<T> {
    pub(crate) fn new(get: impl Fn() -> T + 'static, set: impl Fn(T) -> StoreTask + 'static) -> Self {
        Self {
            get: Rc::new(get),
            set: Rc::new(set),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        (self.get)()
    }

    /// Write `value`. The returned task completes once the owner has applied
    /// the overwrite.
    pub fn set(&self, value: T) -> StoreTask {
        (self.set)(value)
    }
}
