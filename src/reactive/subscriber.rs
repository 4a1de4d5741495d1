//! Subscription disposers.
//!
//! A component keeps a [`Subscriber`] field, adds every listener or
//! background task it starts during `init`/`render`, and disposes it in an
//! on-destroy hook. In development mode the lifecycle manager warns about
//! subscribers that are still live after destroy.

use std::cell::{Cell, RefCell};
use std::fmt;

use tokio::task::JoinHandle;

use super::property::Property;

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A single disposable registration. Disposing runs the disposer once.
pub struct Subscription {
    disposer: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub fn new(disposer: impl FnOnce() + 'static) -> Self {
        Self {
            disposer: RefCell::new(Some(Box::new(disposer))),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self {
            disposer: RefCell::new(None),
        }
    }

    pub fn dispose(&self) {
        let disposer = self.disposer.borrow_mut().take();
        if let Some(disposer) = disposer {
            disposer();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposer.borrow().is_none()
    }
}

impl<T: 'static> From<JoinHandle<T>> for Subscription {
    /// Disposing aborts the task.
    fn from(handle: JoinHandle<T>) -> Self {
        Self::new(move || handle.abort())
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Subscriber
// ---------------------------------------------------------------------------

/// A composite disposer.
///
/// A fresh subscriber is not disposed. After [`dispose`](Self::dispose) it is,
/// until something new is added, which starts a fresh batch.
#[derive(Default)]
pub struct Subscriber {
    subscriptions: RefCell<Vec<Subscription>>,
    disposed: Cell<bool>,
}

impl Subscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a subscription.
    pub fn add(&self, subscription: Subscription) {
        self.disposed.set(false);
        self.subscriptions.borrow_mut().push(subscription);
    }

    /// Run `disposer` when this subscriber is disposed.
    pub fn on_dispose(&self, disposer: impl FnOnce() + 'static) {
        self.add(Subscription::new(disposer));
    }

    /// Listen to `property` until disposed.
    pub fn listen<T: Clone + 'static>(
        &self,
        property: &Property<T>,
        listener: impl Fn(&T, &T) + 'static,
    ) {
        self.add(property.listen(listener));
    }

    /// Keep `target` equal to `source` until disposed.
    pub fn bind<T: Clone + 'static>(&self, target: &Property<T>, source: &Property<T>) {
        target.set(source.get());
        let target = target.clone();
        self.add(source.listen(move |_, new| target.set(new.clone())));
    }

    /// Abort `task` when disposed.
    pub fn add_task<T: 'static>(&self, task: JoinHandle<T>) {
        self.add(Subscription::from(task));
    }

    /// Dispose every tracked subscription, most recent first.
    pub fn dispose(&self) {
        let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
        for subscription in subscriptions.iter().rev() {
            subscription.dispose();
        }
        self.disposed.set(true);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.borrow().is_empty()
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("subscriptions", &self.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
