//! One component per list item.
//!
//! A [`ForEach`] keeps a list of items and, while attached to a
//! [`LifecycleManager`], one live component per item: created from a
//! provider, handed its item through the before-init callback, then
//! initialized and rendered with the loop's parameters. Removing an item
//! destroys its component. Detaching destroys them all but keeps the items,
//! so the next attach brings them back.
//!
//! A component usually declares its loops with
//! [`Descriptor::for_each`](crate::component::Descriptor::for_each): the loop
//! is attached while the owner renders and detached when it is destroyed.
//!
//! ```ignore
//! #[derive(Default)]
//! struct TodoListController {
//!     rows: ForEach<TodoRow, String>,
//! }
//!
//! impl Component for TodoListController {
//!     fn descriptor() -> Descriptor<Self> {
//!         Descriptor::<Self>::controller()
//!             .on_init("load", 0, |c, _| {
//!                 let _ = c.rows.set_items(["milk".to_string()]);
//!             })
//!             .for_each("rows", |c| &c.rows)
//!     }
//! }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use super::manager::{LifecycleManager, WeakManager};
use crate::component::{Component, Instance, Provider, TypeInfo, ViewNode};
use crate::error::{Error, Result};
use crate::params::Params;
use crate::reactive::Subscriber;

type BeforeInit<C, I> = Rc<dyn Fn(&mut C, &I)>;

struct Row<C> {
    instance: Rc<RefCell<C>>,
    view: ViewNode,
}

struct Entry<C, I> {
    item: I,
    row: Option<Row<C>>,
}

struct LoopState<C, I> {
    provider: Provider,
    params: Params,
    before_init: Option<BeforeInit<C, I>>,
    entries: Vec<Entry<C, I>>,
    manager: Option<WeakManager>,
    owner: &'static str,
}

// ---------------------------------------------------------------------------
// ForEach
// ---------------------------------------------------------------------------

/// A list of items of type `I`, each displayed by a component `C`.
///
/// Clones share the same list.
pub struct ForEach<C, I> {
    state: Rc<RefCell<LoopState<C, I>>>,
}

impl<C, I> Clone for ForEach<C, I> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<C: Component + Default, I: Clone + PartialEq + fmt::Debug + 'static> Default
    for ForEach<C, I>
{
    fn default() -> Self {
        Self::new(Provider::of::<C>())
    }
}

impl<C: Component, I: Clone + PartialEq + fmt::Debug + 'static> ForEach<C, I> {
    /// An empty, detached loop drawing components from `provider`.
    pub fn new(provider: Provider) -> Self {
        Self {
            state: Rc::new(RefCell::new(LoopState {
                provider,
                params: Params::new(),
                before_init: None,
                entries: Vec::new(),
                manager: None,
                owner: "ForEach",
            })),
        }
    }

    /// Parameters every item component is initialized and rendered with
    /// (builder). Empty by default.
    pub fn with_params(self, params: Params) -> Self {
        self.state.borrow_mut().params = params;
        self
    }

    /// Called with each new component and its item before the component is
    /// initialized (builder).
    pub fn before_init(self, f: impl Fn(&mut C, &I) + 'static) -> Self {
        self.state.borrow_mut().before_init = Some(Rc::new(f));
        self
    }

    // -----------------------------------------------------------------------
    // Attachment
    // -----------------------------------------------------------------------

    /// Bring up a component for every item that has none yet. Later changes
    /// to the list take effect immediately.
    pub fn attach(&self, manager: &LifecycleManager) -> Result<()> {
        self.attach_as(manager, "ForEach")
    }

    pub(crate) fn attach_as(&self, manager: &LifecycleManager, owner: &'static str) -> Result<()> {
        let provider = {
            let mut state = self.state.borrow_mut();
            state.manager = Some(manager.downgrade());
            state.owner = owner;
            state.provider.clone()
        };
        provider.register(manager)?;
        self.materialize(manager)
    }

    /// Destroy every item component, in list order. The items stay.
    ///
    /// All components are destroyed even if one fails; the first error is
    /// returned.
    pub fn detach(&self) -> Result<()> {
        let (manager, rows) = {
            let mut state = self.state.borrow_mut();
            let manager = state.manager.take();
            let rows: Vec<Row<C>> = state
                .entries
                .iter_mut()
                .filter_map(|entry| entry.row.take())
                .collect();
            (manager, rows)
        };
        let Some(manager) = manager.and_then(|weak| weak.upgrade()) else {
            return Ok(());
        };
        destroy_rows(&manager, rows)
    }

    pub fn is_attached(&self) -> bool {
        self.manager().is_some()
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Append `item`.
    pub fn push(&self, item: I) -> Result<()> {
        let len = self.len();
        self.insert(len, item)
    }

    /// Insert `item` at `index`, clamped to the list length. An item that is
    /// already in the list is rejected.
    pub fn insert(&self, index: usize, item: I) -> Result<()> {
        self.reject_duplicate(&item)?;
        let row = match self.manager() {
            Some(manager) => Some(self.build(&manager, &item)?),
            None => None,
        };
        let mut state = self.state.borrow_mut();
        let index = index.min(state.entries.len());
        state.entries.insert(index, Entry { item, row });
        Ok(())
    }

    /// Remove `item` and destroy its component. Returns whether the item
    /// was in the list.
    pub fn remove(&self, item: &I) -> Result<bool> {
        let removed = {
            let mut state = self.state.borrow_mut();
            let position = state.entries.iter().position(|entry| entry.item == *item);
            position.map(|index| state.entries.remove(index))
        };
        let Some(entry) = removed else {
            return Ok(false);
        };
        if let (Some(row), Some(manager)) = (entry.row, self.manager()) {
            destroy_rows(&manager, vec![row])?;
        }
        Ok(true)
    }

    /// Replace the list with `items`. Components of items that stay are
    /// kept and reordered, the rest are destroyed, new items get new
    /// components.
    pub fn set_items(&self, items: impl IntoIterator<Item = I>) -> Result<()> {
        let items: Vec<I> = items.into_iter().collect();
        for (index, item) in items.iter().enumerate() {
            if items[..index].contains(item) {
                return Err(self.duplicate(item));
            }
        }

        let mut old = std::mem::take(&mut self.state.borrow_mut().entries);
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let row = old
                .iter()
                .position(|entry| entry.item == item)
                .and_then(|index| old.remove(index).row);
            entries.push(Entry { item, row });
        }
        self.state.borrow_mut().entries = entries;

        let stale: Vec<Row<C>> = old.into_iter().filter_map(|entry| entry.row).collect();
        match self.manager() {
            Some(manager) => {
                destroy_rows(&manager, stale)?;
                self.materialize(&manager)
            }
            None => Ok(()),
        }
    }

    /// Remove every item, destroying their components.
    pub fn clear(&self) -> Result<()> {
        self.set_items(Vec::new())
    }

    /// Clear the list when `subscriber` is disposed.
    pub fn dispose_with(&self, subscriber: &Subscriber) {
        let this = self.clone();
        subscriber.on_dispose(move || {
            if let Err(err) = this.clear() {
                warn!(%err, "clearing for-each list on dispose failed");
            }
        });
    }

    // -----------------------------------------------------------------------
    // Query
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> Vec<I> {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|entry| entry.item.clone())
            .collect()
    }

    /// Live item components, in list order.
    pub fn instances(&self) -> Vec<Rc<RefCell<C>>> {
        self.rows(|row| Rc::clone(&row.instance))
    }

    /// Views of the live item components, in list order.
    pub fn views(&self) -> Vec<ViewNode> {
        self.rows(|row| row.view.clone())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn rows<R>(&self, f: impl Fn(&Row<C>) -> R) -> Vec<R> {
        self.state
            .borrow()
            .entries
            .iter()
            .filter_map(|entry| entry.row.as_ref().map(&f))
            .collect()
    }

    fn manager(&self) -> Option<LifecycleManager> {
        let weak = self.state.borrow().manager.clone();
        weak.and_then(|weak| weak.upgrade())
    }

    fn duplicate(&self, item: &I) -> Error {
        Error::DuplicateItem {
            item: format!("{item:?}"),
            owner: self.state.borrow().owner.to_string(),
        }
    }

    fn reject_duplicate(&self, item: &I) -> Result<()> {
        let present = self
            .state
            .borrow()
            .entries
            .iter()
            .any(|entry| entry.item == *item);
        if present {
            Err(self.duplicate(item))
        } else {
            Ok(())
        }
    }

    fn build(&self, manager: &LifecycleManager, item: &I) -> Result<Row<C>> {
        let (provider, params, before_init, owner) = {
            let state = self.state.borrow();
            (
                state.provider.clone(),
                state.params.clone(),
                state.before_init.clone(),
                state.owner,
            )
        };
        let instance = provider.get();
        let Some(typed) = instance.downcast::<C>() else {
            return Err(Error::SubComponentMismatch {
                declared: TypeInfo::of::<C>().short_name().to_string(),
                produced: instance.type_info().short_name().to_string(),
                owner: owner.to_string(),
            });
        };
        if let Some(before_init) = before_init {
            let mut target = typed.try_borrow_mut().map_err(|_| Error::InstanceBusy {
                owner: TypeInfo::of::<C>().short_name().to_string(),
            })?;
            before_init(&mut *target, item);
        }
        manager.init(&instance, &params)?;
        let view = manager.render(&instance, &params)?;
        debug!(owner, item = ?item, "for-each component created");
        Ok(Row {
            instance: typed,
            view,
        })
    }

    fn materialize(&self, manager: &LifecycleManager) -> Result<()> {
        loop {
            let pending = self
                .state
                .borrow()
                .entries
                .iter()
                .find(|entry| entry.row.is_none())
                .map(|entry| entry.item.clone());
            let Some(item) = pending else {
                return Ok(());
            };
            let row = self.build(manager, &item)?;
            let orphan = {
                let mut state = self.state.borrow_mut();
                match state.entries.iter_mut().find(|entry| entry.item == item) {
                    Some(entry) => {
                        entry.row = Some(row);
                        None
                    }
                    None => Some(row),
                }
            };
            if let Some(row) = orphan {
                destroy_rows(manager, vec![row])?;
            }
        }
    }
}

fn destroy_rows<C: Component>(manager: &LifecycleManager, rows: Vec<Row<C>>) -> Result<()> {
    let mut first = None;
    for row in rows {
        if let Err(err) = manager.destroy(&Instance::from_shared(row.instance)) {
            first.get_or_insert(err);
        }
    }
    first.map_or(Ok(()), Err)
}

impl<C, I: fmt::Debug> fmt::Debug for ForEach<C, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        let items: Vec<&I> = state.entries.iter().map(|entry| &entry.item).collect();
        f.debug_struct("ForEach")
            .field("provider", &state.provider)
            .field("items", &items)
            .field("attached", &state.manager.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// LoopSlot
// ---------------------------------------------------------------------------

/// A declared loop as the owner's sidecar sees it.
pub(crate) trait LoopSlot {
    fn attach(&self, manager: &LifecycleManager, owner: &'static str) -> Result<()>;
    fn detach(&self) -> Result<()>;
}

impl<C: Component, I: Clone + PartialEq + fmt::Debug + 'static> LoopSlot for ForEach<C, I> {
    fn attach(&self, manager: &LifecycleManager, owner: &'static str) -> Result<()> {
        self.attach_as(manager, owner)
    }

    fn detach(&self) -> Result<()> {
        ForEach::detach(self)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
