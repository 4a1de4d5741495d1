//! Type-erased component instances and provider handles.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::view::{ResourceBundle, ViewNode};
use super::Component;
use crate::error::{ConfigError, Result};
use crate::lifecycle::LifecycleManager;
use crate::params::Params;

// ---------------------------------------------------------------------------
// TypeInfo
// ---------------------------------------------------------------------------

/// Identity and name of a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment, generic arguments removed.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// ---------------------------------------------------------------------------
// InstanceId
// ---------------------------------------------------------------------------

/// Identity of a live instance, stable while it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(usize);

impl InstanceId {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: usize) -> Self {
        Self(raw)
    }
}

// ---------------------------------------------------------------------------
// InstanceCell
// ---------------------------------------------------------------------------

/// Lifecycle dispatch for a concrete `RefCell<T>`, reached through the
/// type-erased [`Instance`].
pub(crate) trait InstanceCell {
    fn type_info(&self) -> TypeInfo;
    fn register(&self, manager: &LifecycleManager) -> Result<(), ConfigError>;
    fn init(self: Rc<Self>, manager: &LifecycleManager, params: &Params) -> Result<()>;
    fn render(self: Rc<Self>, manager: &LifecycleManager, params: &Params) -> Result<ViewNode>;
    fn destroy(self: Rc<Self>, manager: &LifecycleManager) -> Result<()>;
    fn title(self: Rc<Self>, manager: &LifecycleManager) -> Result<Option<String>>;
    fn resources(self: Rc<Self>, manager: &LifecycleManager) -> Option<Rc<dyn ResourceBundle>>;
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Component> InstanceCell for RefCell<T> {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn register(&self, manager: &LifecycleManager) -> Result<(), ConfigError> {
        manager.register::<T>()
    }

    fn init(self: Rc<Self>, manager: &LifecycleManager, params: &Params) -> Result<()> {
        manager.sidecar::<T>()?.init(manager, &self, params)
    }

    fn render(self: Rc<Self>, manager: &LifecycleManager, params: &Params) -> Result<ViewNode> {
        manager.sidecar::<T>()?.render(manager, &self, params)
    }

    fn destroy(self: Rc<Self>, manager: &LifecycleManager) -> Result<()> {
        manager.sidecar::<T>()?.destroy(manager, &self)
    }

    fn title(self: Rc<Self>, manager: &LifecycleManager) -> Result<Option<String>> {
        manager.sidecar::<T>()?.title(manager, &self)
    }

    fn resources(self: Rc<Self>, manager: &LifecycleManager) -> Option<Rc<dyn ResourceBundle>> {
        match manager.sidecar::<T>() {
            Ok(sidecar) => sidecar.resources(manager, &self),
            Err(_) => manager.default_resources(),
        }
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

// ---------------------------------------------------------------------------
// Instance
// ---------------------------------------------------------------------------

/// A shared, type-erased component instance.
///
/// Cloning shares the instance. The concrete `Rc<RefCell<T>>` is recovered
/// with [`downcast`](Self::downcast).
#[derive(Clone)]
pub struct Instance(Rc<dyn InstanceCell>);

impl Instance {
    /// Wrap a freshly constructed component.
    pub fn new<T: Component>(component: T) -> Self {
        Self(Rc::new(RefCell::new(component)))
    }

    /// Wrap an instance the caller keeps a typed handle to.
    pub fn from_shared<T: Component>(shared: Rc<RefCell<T>>) -> Self {
        Self(shared)
    }

    pub fn downcast<T: Component>(&self) -> Option<Rc<RefCell<T>>> {
        Rc::clone(&self.0).into_any().downcast::<RefCell<T>>().ok()
    }

    pub fn is<T: Component>(&self) -> bool {
        self.type_info().id() == TypeId::of::<T>()
    }

    pub fn type_info(&self) -> TypeInfo {
        self.0.type_info()
    }

    pub fn id(&self) -> InstanceId {
        InstanceId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        self.id() == other.id()
    }

    pub(crate) fn cell(&self) -> Rc<dyn InstanceCell> {
        Rc::clone(&self.0)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance<{}>({:#x})", self.type_info(), self.id().0)
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// A way to obtain instances of a declared component type.
///
/// Whether each call constructs a new instance or hands out a cached one is
/// up to the provider; the framework does not assume either.
#[derive(Clone)]
pub struct Provider {
    declared: TypeInfo,
    factory: Rc<dyn Fn() -> Instance>,
    register: fn(&LifecycleManager) -> Result<(), ConfigError>,
}

fn register_type<T: Component>(manager: &LifecycleManager) -> Result<(), ConfigError> {
    manager.register::<T>()
}

impl Provider {
    /// Construct a new instance on every call.
    pub fn new<T: Component>(factory: impl Fn() -> T + 'static) -> Self {
        Self::erased::<T>(move || Instance::new(factory()))
    }

    /// Construct with `T::default()` on every call.
    pub fn of<T: Component + Default>() -> Self {
        Self::new(T::default)
    }

    /// Hand out the same instance on every call.
    pub fn shared<T: Component>(instance: Rc<RefCell<T>>) -> Self {
        Self::erased::<T>(move || Instance::from_shared(Rc::clone(&instance)))
    }

    /// Build from a factory returning typed shared instances.
    pub fn from_fn<T: Component>(factory: impl Fn() -> Rc<RefCell<T>> + 'static) -> Self {
        Self::erased::<T>(move || Instance::from_shared(factory()))
    }

    /// Build from an untyped factory declared to produce `T`. Navigation
    /// checks that the produced instance really is a `T`.
    pub fn erased<T: Component>(factory: impl Fn() -> Instance + 'static) -> Self {
        Self {
            declared: TypeInfo::of::<T>(),
            factory: Rc::new(factory),
            register: register_type::<T>,
        }
    }

    pub fn get(&self) -> Instance {
        (self.factory)()
    }

    pub fn declared_type(&self) -> TypeInfo {
        self.declared
    }

    /// Register the declared type's lifecycle metadata.
    pub fn register(&self, manager: &LifecycleManager) -> Result<(), ConfigError> {
        (self.register)(manager)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Provider<{}>", self.declared)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
