//! `Property<T>`: a shared, observable value.
//!
//! Clones share the same cell, so a property handed to a child component or
//! bound to a listener observes every later `set`. Listeners run after the
//! value has been stored and never while the cell is borrowed, so a listener
//! may read or write the property again.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::subscriber::Subscription;

type Listener<T> = Rc<dyn Fn(&T, &T)>;

struct PropertyState<T> {
    value: RefCell<T>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    next_listener: Cell<u64>,
}

/// A shared, observable value.
pub struct Property<T> {
    state: Rc<PropertyState<T>>,
}

impl<T: Clone + 'static> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            state: Rc::new(PropertyState {
                value: RefCell::new(value),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    /// Current value (cloned).
    pub fn get(&self) -> T {
        self.state.value.borrow().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.value.borrow())
    }

    /// Store `value` and notify listeners with `(old, new)`.
    pub fn set(&self, value: T) {
        let old = self.state.value.replace(value);
        let new = self.get();
        let listeners: Vec<Listener<T>> = self
            .state
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(&old, &new);
        }
    }

    /// Modify the value in place, then notify.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// Listen for changes. Disposing the returned subscription removes the
    /// listener.
    pub fn listen(&self, listener: impl Fn(&T, &T) + 'static) -> Subscription {
        let id = self.state.next_listener.get();
        self.state.next_listener.set(id + 1);
        self.state
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let weak: Weak<PropertyState<T>> = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.state.listeners.borrow().len()
    }

    /// Whether both handles share one cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone + Default + 'static> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.state.value.borrow())
            .field("listeners", &self.state.listeners.borrow().len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set() {
        let p = Property::new(1);
        assert_eq!(p.get(), 1);
        p.set(5);
        assert_eq!(p.get(), 5);
        p.update(|v| *v += 1);
        assert_eq!(p.with(|v| *v), 6);
    }

    #[test]
    fn clones_share_state() {
        let a = Property::new(String::from("x"));
        let b = a.clone();
        b.set("y".into());
        assert_eq!(a.get(), "y");
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Property::new(String::new())));
    }

    #[test]
    fn listener_sees_old_and_new() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let p = Property::new(0);
        let _sub = p.listen(move |old, new| log.borrow_mut().push((*old, *new)));

        p.set(3);
        p.set(4);
        assert_eq!(*seen.borrow(), vec![(0, 3), (3, 4)]);
    }

    #[test]
    fn disposing_removes_listener() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let p = Property::new(0);
        let sub = p.listen(move |_, _| counter.set(counter.get() + 1));
        assert_eq!(p.listener_count(), 1);

        p.set(1);
        sub.dispose();
        p.set(2);

        assert_eq!(hits.get(), 1);
        assert_eq!(p.listener_count(), 0);
    }

    #[test]
    fn listener_may_write_back() {
        let p = Property::new(0);
        let handle = p.clone();
        let _sub = p.listen(move |_, new| {
            if *new > 10 {
                handle.set(10);
            }
        });
        p.set(42);
        assert_eq!(p.get(), 10);
    }
}
