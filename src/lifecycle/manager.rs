//! The lifecycle manager: sidecar registry, lifecycle dispatch, key routing.
//!
//! Every call takes `&self`. Sidecars re-enter the manager while a call is in
//! flight (a parent initializes its sub-components through it), so mutable
//! state lives behind `RefCell`s whose borrows never span a callback.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use super::sidecar::{DescriptorSidecar, Sidecar};
use crate::component::{
    Component, Instance, InstanceId, RenderContext, ResourceBundle, TemplateLoader, TypeInfo,
    ViewNode,
};
use crate::config::FrameworkConfig;
use crate::error::{ConfigError, Error, Result};
use crate::event::binding::KeyCallback;
use crate::event::{KeyEvent, KeyHandlerRegistry, KeyMatch};
use crate::params::Params;

/// Drives component instances through init, render and destroy.
///
/// Cloning yields another handle to the same manager.
#[derive(Clone)]
pub struct LifecycleManager {
    state: Rc<ManagerState>,
}

struct ManagerState {
    config: FrameworkConfig,
    /// `TypeId` of `T` → `Rc<dyn Sidecar<T>>`.
    sidecars: RefCell<HashMap<TypeId, Box<dyn Any>>>,
    loader: RefCell<Option<Rc<dyn TemplateLoader>>>,
    default_resources: RefCell<Option<Rc<dyn ResourceBundle>>>,
    keys: RefCell<KeyHandlerRegistry>,
    /// Sub-components created through providers, by parent.
    created: RefCell<HashMap<InstanceId, Vec<Instance>>>,
    /// Instances brought up with `init_and_render`, in order.
    main: RefCell<Vec<Instance>>,
}

/// A handle that does not keep the manager alive.
#[derive(Clone)]
pub(crate) struct WeakManager(Weak<ManagerState>);

impl WeakManager {
    pub(crate) fn upgrade(&self) -> Option<LifecycleManager> {
        self.0.upgrade().map(|state| LifecycleManager { state })
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new(FrameworkConfig::default())
    }
}

impl LifecycleManager {
    pub fn new(config: FrameworkConfig) -> Self {
        let default_resources = config.default_resources.clone();
        Self {
            state: Rc::new(ManagerState {
                config,
                sidecars: RefCell::new(HashMap::new()),
                loader: RefCell::new(None),
                default_resources: RefCell::new(default_resources),
                keys: RefCell::new(KeyHandlerRegistry::new()),
                created: RefCell::new(HashMap::new()),
                main: RefCell::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakManager {
        WeakManager(Rc::downgrade(&self.state))
    }

    /// Install the template loader (builder).
    pub fn with_template_loader(self, loader: Rc<dyn TemplateLoader>) -> Self {
        self.set_template_loader(loader);
        self
    }

    pub fn set_template_loader(&self, loader: Rc<dyn TemplateLoader>) {
        *self.state.loader.borrow_mut() = Some(loader);
    }

    pub fn config(&self) -> &FrameworkConfig {
        &self.state.config
    }

    pub fn is_dev_mode(&self) -> bool {
        self.state.config.dev_mode
    }

    /// Bundle used for instances that declare none.
    pub fn default_resources(&self) -> Option<Rc<dyn ResourceBundle>> {
        self.state.default_resources.borrow().clone()
    }

    pub fn set_default_resources(&self, bundle: Option<Rc<dyn ResourceBundle>>) {
        *self.state.default_resources.borrow_mut() = bundle;
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register `T` and, transitively, its sub-component types.
    ///
    /// Registering an already registered type is a no-op. On failure nothing
    /// is left registered for `T`.
    pub fn register<T: Component>(&self) -> Result<(), ConfigError> {
        self.install::<T>().map(|_| ())
    }

    /// Register the type of an existing instance.
    pub fn register_instance(&self, instance: &Instance) -> Result<(), ConfigError> {
        instance.cell().register(self)
    }

    pub fn is_registered<T: Component>(&self) -> bool {
        self.state.sidecars.borrow().contains_key(&TypeId::of::<T>())
    }

    /// The sidecar of `T`, registering the type on first use.
    pub fn sidecar<T: Component>(&self) -> Result<Rc<dyn Sidecar<T>>, ConfigError> {
        self.install::<T>()
    }

    fn cached<T: Component>(&self) -> Option<Rc<dyn Sidecar<T>>> {
        self.state
            .sidecars
            .borrow()
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Rc<dyn Sidecar<T>>>())
            .cloned()
    }

    fn install<T: Component>(&self) -> Result<Rc<dyn Sidecar<T>>, ConfigError> {
        if let Some(sidecar) = self.cached::<T>() {
            return Ok(sidecar);
        }

        let ty = TypeInfo::of::<T>();
        let (sidecar, children): (Rc<dyn Sidecar<T>>, _) = match T::sidecar() {
            Some(custom) => (Rc::from(custom), Vec::new()),
            None => {
                let generated = DescriptorSidecar::new(T::descriptor(), &self.state.config)?;
                let children = generated.child_registrars();
                (Rc::new(generated), children)
            }
        };

        // Insert before the children so self-referencing types terminate.
        self.state
            .sidecars
            .borrow_mut()
            .insert(ty.id(), Box::new(Rc::clone(&sidecar)));
        for register in children {
            if let Err(err) = register(self) {
                self.state.sidecars.borrow_mut().remove(&ty.id());
                return Err(err);
            }
        }
        debug!(component = ty.short_name(), "registered");
        Ok(sidecar)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Inject `params`, run on-init hooks, initialize sub-components.
    pub fn init(&self, instance: &Instance, params: &Params) -> Result<()> {
        debug!(component = instance.type_info().short_name(), "init");
        instance.cell().init(self, params)
    }

    /// Render sub-components, produce the view, run on-render hooks.
    pub fn render(&self, instance: &Instance, params: &Params) -> Result<ViewNode> {
        debug!(component = instance.type_info().short_name(), "render");
        instance.cell().render(self, params)
    }

    /// Destroy provider-created and declared sub-components in reverse
    /// order, run on-destroy hooks, drop the instance's key handlers.
    pub fn destroy(&self, instance: &Instance) -> Result<()> {
        debug!(component = instance.type_info().short_name(), "destroy");
        let created = self
            .state
            .created
            .borrow_mut()
            .remove(&instance.id())
            .unwrap_or_default();
        for child in created.iter().rev() {
            self.destroy(child)?;
        }
        instance.cell().destroy(self)?;
        self.state.keys.borrow_mut().unregister(instance.id());
        Ok(())
    }

    /// Init and render a main instance, remembering it for [`cleanup`].
    ///
    /// [`cleanup`]: Self::cleanup
    pub fn init_and_render(&self, instance: &Instance, params: &Params) -> Result<ViewNode> {
        self.init(instance, params)?;
        let view = self.render(instance, params)?;
        self.state.main.borrow_mut().push(instance.clone());
        Ok(view)
    }

    /// Destroy every main instance, in the order they were rendered.
    ///
    /// All instances are destroyed even if one fails; the first error is
    /// returned.
    pub fn cleanup(&self) -> Result<()> {
        let main = std::mem::take(&mut *self.state.main.borrow_mut());
        let mut first = None;
        for instance in &main {
            if let Err(err) = self.destroy(instance) {
                warn!(component = instance.type_info().short_name(), %err, "destroy failed");
                first.get_or_insert(err);
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Main instances currently alive.
    pub fn main_instances(&self) -> Vec<Instance> {
        self.state.main.borrow().clone()
    }

    pub fn title(&self, instance: &Instance) -> Result<Option<String>> {
        instance.cell().title(self)
    }

    pub fn resources(&self, instance: &Instance) -> Option<Rc<dyn ResourceBundle>> {
        instance.cell().resources(self)
    }

    // -----------------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------------

    /// Load `template` for `owner` through the installed loader.
    pub fn load_view(
        &self,
        template: &str,
        owner: &Instance,
        root: bool,
        ctx: &mut RenderContext<'_>,
    ) -> Result<ViewNode> {
        let loader = self.state.loader.borrow().clone();
        let Some(loader) = loader else {
            return Err(Error::NoTemplateLoader {
                template: template.to_string(),
                owner: owner.type_info().short_name().to_string(),
            });
        };
        debug!(template, owner = owner.type_info().short_name(), root, "loading template");
        loader.load_view(template, owner, root, ctx)
    }

    pub(crate) fn track_created(&self, parent: InstanceId, created: Vec<Instance>) {
        if created.is_empty() {
            return;
        }
        self.state
            .created
            .borrow_mut()
            .entry(parent)
            .or_default()
            .extend(created);
    }

    // -----------------------------------------------------------------------
    // Keys
    // -----------------------------------------------------------------------

    pub fn register_key_handler(
        &self,
        owner: InstanceId,
        owner_type: &'static str,
        member: &str,
        matcher: KeyMatch,
        callback: KeyCallback,
    ) {
        self.state
            .keys
            .borrow_mut()
            .register(owner, owner_type, member, matcher, callback);
    }

    pub fn clear_key_handlers(&self, owner: InstanceId) -> usize {
        self.state.keys.borrow_mut().unregister(owner)
    }

    pub fn key_handler_count(&self) -> usize {
        self.state.keys.borrow().len()
    }

    /// Run every handler matching `event`. Returns how many ran.
    pub fn dispatch_key(&self, event: &KeyEvent) -> usize {
        let matched = self.state.keys.borrow().matching(event);
        let mut handled = 0;
        for handler in matched {
            if (handler.callback)(event) {
                handled += 1;
            } else {
                warn!(
                    owner = handler.owner_type,
                    member = handler.member.as_str(),
                    "key handler owner is gone or busy"
                );
            }
        }
        handled
    }
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("config", &self.state.config)
            .field("registered", &self.state.sidecars.borrow().len())
            .field("main", &self.state.main.borrow().len())
            .field("key_handlers", &self.state.keys.borrow().len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
