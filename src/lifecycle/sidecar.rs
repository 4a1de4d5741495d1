//! Sidecars: per-type implementations of the lifecycle contract.
//!
//! [`DescriptorSidecar`] drives a type from its [`Descriptor`]. A type can
//! replace it with a hand-written (or generated) [`Sidecar`] by returning
//! one from [`Component::sidecar`].

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use tracing::{debug, warn};

use super::for_each::LoopSlot;
use super::manager::LifecycleManager;
use super::pool::SubComponentPool;
use crate::component::descriptor::{ChildSource, Hook, Registrar};
use crate::component::view::strip_role_suffix;
use crate::component::{
    default_template_name, Component, Descriptor, Instance, Kind, RenderContext, ResourceBundle,
    Title, TypeInfo, ViewNode, ViewSpec,
};
use crate::config::FrameworkConfig;
use crate::error::{ConfigError, Error, Result};
use crate::event::KeyEvent;
use crate::params::{Params, Value};

// ---------------------------------------------------------------------------
// Sidecar
// ---------------------------------------------------------------------------

/// The lifecycle contract for one component type.
///
/// `init` injects parameters, runs on-init hooks, then initializes
/// sub-components in declaration order. `render` renders sub-components
/// first, then produces the instance's own view and runs on-render hooks.
/// `destroy` destroys sub-components in reverse order, then runs on-destroy
/// hooks.
pub trait Sidecar<T: Component> {
    fn init(
        &self,
        manager: &LifecycleManager,
        instance: &Rc<RefCell<T>>,
        params: &Params,
    ) -> Result<()>;

    fn render(
        &self,
        manager: &LifecycleManager,
        instance: &Rc<RefCell<T>>,
        params: &Params,
    ) -> Result<ViewNode>;

    fn destroy(&self, manager: &LifecycleManager, instance: &Rc<RefCell<T>>) -> Result<()>;

    /// The instance's resource bundle, falling back to the default one.
    fn resources(
        &self,
        manager: &LifecycleManager,
        _instance: &Rc<RefCell<T>>,
    ) -> Option<Rc<dyn ResourceBundle>> {
        manager.default_resources()
    }

    fn title(
        &self,
        _manager: &LifecycleManager,
        _instance: &Rc<RefCell<T>>,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// DescriptorSidecar
// ---------------------------------------------------------------------------

/// Sidecar driven by a validated [`Descriptor`], hooks pre-sorted by
/// priority.
pub struct DescriptorSidecar<T> {
    descriptor: Descriptor<T>,
    dev_mode: bool,
    template_extension: String,
}

impl<T: Component> DescriptorSidecar<T> {
    /// Validate `descriptor` and sort its hooks. Equal priorities keep
    /// declaration order.
    pub fn new(mut descriptor: Descriptor<T>, config: &FrameworkConfig) -> Result<Self, ConfigError> {
        descriptor.validate()?;
        descriptor.init_hooks.sort_by_key(|h| h.priority);
        descriptor.render_hooks.sort_by_key(|h| h.priority);
        descriptor.destroy_hooks.sort_by_key(|h| h.priority);
        Ok(Self {
            descriptor,
            dev_mode: config.dev_mode,
            template_extension: config.template_extension.clone(),
        })
    }

    /// Registration functions of every sub-component type.
    pub(crate) fn child_registrars(&self) -> Vec<Registrar> {
        self.descriptor
            .sub_components
            .iter()
            .map(|sub| sub.register)
            .chain(self.descriptor.loops.iter().map(|field| field.register))
            .collect()
    }

    fn owner(&self) -> &'static str {
        TypeInfo::of::<T>().short_name()
    }

    fn borrow<'a>(&self, instance: &'a Rc<RefCell<T>>) -> Result<Ref<'a, T>> {
        instance.try_borrow().map_err(|_| Error::InstanceBusy {
            owner: self.owner().to_string(),
        })
    }

    fn borrow_mut<'a>(&self, instance: &'a Rc<RefCell<T>>) -> Result<RefMut<'a, T>> {
        instance.try_borrow_mut().map_err(|_| Error::InstanceBusy {
            owner: self.owner().to_string(),
        })
    }

    /// Declared sub-component instances, in declaration order. Bindings
    /// that yield nothing are skipped with a warning.
    fn children(&self, instance: &Rc<RefCell<T>>, phase: &'static str) -> Result<Vec<Instance>> {
        let target = self.borrow(instance)?;
        let mut children = Vec::new();
        for sub in &self.descriptor.sub_components {
            if let ChildSource::Instance(get) = &sub.source {
                match get(&*target) {
                    Some(child) => children.push(child),
                    None => warn!(
                        owner = self.owner(),
                        member = sub.member.as_str(),
                        phase,
                        "sub-component binding yielded no instance, skipping"
                    ),
                }
            }
        }
        Ok(children)
    }

    /// Declared for-each lists, in declaration order.
    fn loops(&self, instance: &Rc<RefCell<T>>) -> Result<Vec<Box<dyn LoopSlot>>> {
        if self.descriptor.loops.is_empty() {
            return Ok(Vec::new());
        }
        let target = self.borrow(instance)?;
        Ok(self
            .descriptor
            .loops
            .iter()
            .map(|field| (field.get)(&*target))
            .collect())
    }

    fn inject(&self, target: &mut T, params: &Params) -> Result<()> {
        let owner = self.owner();
        let d = &self.descriptor;

        for entry in &d.param_fields {
            if let Some(value) = params.get(&entry.param) {
                (entry.apply)(target, value, &entry.site(owner))?;
            }
        }
        for entry in &d.map_fields {
            (entry.apply)(target, params);
        }

        let null = Value::null();
        for entry in &d.param_methods {
            let value = params.get(&entry.param).unwrap_or(&null);
            (entry.apply)(target, value, &entry.site(owner))?;
        }
        for entry in &d.params_methods {
            (entry.apply)(target, params, owner)?;
        }
        for entry in &d.map_methods {
            (entry.apply)(target, params);
        }
        Ok(())
    }

    fn produce_view(
        &self,
        manager: &LifecycleManager,
        instance: &Rc<RefCell<T>>,
        params: &Params,
        rendered: Vec<(Instance, ViewNode)>,
    ) -> Result<ViewNode> {
        match &self.descriptor.view {
            ViewSpec::Own => Ok(ViewNode::of_instance(&Instance::from_shared(Rc::clone(
                instance,
            )))),
            ViewSpec::Method(name) => {
                let method = self
                    .descriptor
                    .view_methods
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, f)| f)
                    .ok_or_else(|| ConfigError::MissingViewMethod {
                        method: name.clone(),
                        owner: self.owner().to_string(),
                    })?;
                let mut target = self.borrow_mut(instance)?;
                Ok(method(&mut *target))
            }
            ViewSpec::Template(template) => {
                let root = self.descriptor.kind == Kind::Component;
                self.load_template(manager, instance, params, template, root, rendered)
            }
            ViewSpec::Default => {
                let template = default_template_name(TypeInfo::of::<T>(), &self.template_extension);
                self.load_template(manager, instance, params, &template, false, rendered)
            }
        }
    }

    fn load_template(
        &self,
        manager: &LifecycleManager,
        instance: &Rc<RefCell<T>>,
        params: &Params,
        template: &str,
        root: bool,
        rendered: Vec<(Instance, ViewNode)>,
    ) -> Result<ViewNode> {
        let mut pool = SubComponentPool::new();
        for (child, view) in rendered {
            pool.push_instance(child, view);
        }
        {
            let target = self.borrow(instance)?;
            for sub in &self.descriptor.sub_components {
                if let ChildSource::Provider(get) = &sub.source {
                    let provider = get(&*target);
                    if provider.declared_type() != sub.ty {
                        warn!(
                            owner = self.owner(),
                            member = sub.member.as_str(),
                            expected = sub.ty.short_name(),
                            declared = provider.declared_type().short_name(),
                            "sub-component provider declares another type, skipping"
                        );
                        continue;
                    }
                    pool.add_provider(sub.ty, provider);
                }
            }
        }

        let owner = Instance::from_shared(Rc::clone(instance));
        let resources = self.resources(manager, instance);
        let mut ctx = RenderContext::new(manager, TypeInfo::of::<T>(), params, pool, resources);
        let view = manager.load_view(template, &owner, root, &mut ctx);

        let (created, unused) = ctx.finish();
        manager.track_created(owner.id(), created);
        if unused > 0 {
            debug!(
                owner = self.owner(),
                template, unused, "template did not use every declared sub-component"
            );
        }
        view
    }

    fn register_key_handlers(&self, manager: &LifecycleManager, instance: &Rc<RefCell<T>>) {
        if self.descriptor.key_handlers.is_empty() {
            return;
        }
        let id = Instance::from_shared(Rc::clone(instance)).id();
        manager.clear_key_handlers(id);
        for decl in &self.descriptor.key_handlers {
            let weak = Rc::downgrade(instance);
            let handler = Rc::clone(&decl.handler);
            manager.register_key_handler(
                id,
                self.owner(),
                &decl.member,
                decl.matcher,
                Rc::new(move |event: &KeyEvent| {
                    let Some(cell) = weak.upgrade() else {
                        return false;
                    };
                    let Ok(mut target) = cell.try_borrow_mut() else {
                        return false;
                    };
                    handler(&mut *target, event);
                    true
                }),
            );
        }
    }

    fn warn_undisposed(&self, instance: &Rc<RefCell<T>>) {
        let Ok(target) = instance.try_borrow() else {
            return;
        };
        for field in &self.descriptor.subscribers {
            let subscriber = (field.get)(&*target);
            if !subscriber.is_empty() {
                warn!(
                    owner = self.owner(),
                    member = field.member.as_str(),
                    live = subscriber.len(),
                    "subscriber was not disposed when its owner was destroyed"
                );
            }
        }
    }
}

fn run_hooks<T>(hooks: &[Hook<T>], target: &mut T, params: &Params) {
    for hook in hooks {
        (hook.run)(target, params);
    }
}

impl<T: Component> Sidecar<T> for DescriptorSidecar<T> {
    fn init(
        &self,
        manager: &LifecycleManager,
        instance: &Rc<RefCell<T>>,
        params: &Params,
    ) -> Result<()> {
        {
            let mut target = self.borrow_mut(instance)?;
            self.inject(&mut *target, params)?;
            run_hooks(&self.descriptor.init_hooks, &mut *target, params);
        }
        for child in self.children(instance, "init")? {
            manager.init(&child, params)?;
        }
        Ok(())
    }

    fn render(
        &self,
        manager: &LifecycleManager,
        instance: &Rc<RefCell<T>>,
        params: &Params,
    ) -> Result<ViewNode> {
        let children = self.children(instance, "render")?;
        let mut rendered = Vec::with_capacity(children.len());
        for child in children {
            let view = manager.render(&child, params)?;
            rendered.push((child, view));
        }
        for slot in self.loops(instance)? {
            slot.attach(manager, self.owner())?;
        }

        let view = self.produce_view(manager, instance, params, rendered)?;
        {
            let mut target = self.borrow_mut(instance)?;
            run_hooks(&self.descriptor.render_hooks, &mut *target, params);
        }
        self.register_key_handlers(manager, instance);
        Ok(view)
    }

    fn destroy(&self, manager: &LifecycleManager, instance: &Rc<RefCell<T>>) -> Result<()> {
        for slot in self.loops(instance)?.iter().rev() {
            slot.detach()?;
        }
        let children = self.children(instance, "destroy")?;
        for child in children.iter().rev() {
            manager.destroy(child)?;
        }
        {
            let mut target = self.borrow_mut(instance)?;
            run_hooks(&self.descriptor.destroy_hooks, &mut *target, &Params::new());
        }
        if self.dev_mode {
            self.warn_undisposed(instance);
        }
        Ok(())
    }

    fn resources(
        &self,
        manager: &LifecycleManager,
        instance: &Rc<RefCell<T>>,
    ) -> Option<Rc<dyn ResourceBundle>> {
        let own = self.descriptor.resources.first().and_then(|get| {
            let target = instance.try_borrow().ok()?;
            get(&*target)
        });
        own.or_else(|| manager.default_resources())
    }

    fn title(
        &self,
        manager: &LifecycleManager,
        instance: &Rc<RefCell<T>>,
    ) -> Result<Option<String>> {
        let Some(title) = &self.descriptor.title else {
            return Ok(None);
        };
        match title {
            Title::Literal(text) => Ok(Some(text.clone())),
            Title::TypeName => Ok(Some(strip_role_suffix(self.owner()))),
            Title::Key(key) => {
                let bundle = self.resources(manager, instance).ok_or_else(|| {
                    Error::MissingResourceBundle {
                        title: title.to_string(),
                        owner: self.owner().to_string(),
                    }
                })?;
                bundle
                    .get(key)
                    .map(Some)
                    .ok_or_else(|| Error::MissingResourceKey {
                        key: key.clone(),
                        owner: self.owner().to_string(),
                    })
            }
        }
    }
}
