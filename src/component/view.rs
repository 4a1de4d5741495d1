//! View nodes, the template loader boundary, resource bundles.
//!
//! Parsing and rendering templates is not part of this crate. A
//! [`TemplateLoader`] turns a template reference into a [`ViewNode`]; while
//! doing so it may ask the [`RenderContext`] for the parent's pre-built
//! sub-components so they are embedded instead of freshly constructed.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::instance::{Instance, TypeInfo};
use crate::error::Result;
use crate::lifecycle::pool::{Pooled, SubComponentPool};
use crate::lifecycle::LifecycleManager;
use crate::params::Params;

// ---------------------------------------------------------------------------
// ViewNode
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum ViewContent {
    Empty,
    Instance(Instance),
    Value(Rc<dyn Any>),
}

/// An opaque node of the produced view tree.
#[derive(Clone)]
pub struct ViewNode {
    name: String,
    content: ViewContent,
    children: Vec<ViewNode>,
}

impl ViewNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: ViewContent::Empty,
            children: Vec::new(),
        }
    }

    /// A component acting as its own view.
    pub fn of_instance(instance: &Instance) -> Self {
        Self {
            name: instance.type_info().short_name().to_string(),
            content: ViewContent::Instance(instance.clone()),
            children: Vec::new(),
        }
    }

    /// Attach a native payload (builder).
    pub fn with_payload<V: Any>(mut self, payload: V) -> Self {
        self.content = ViewContent::Value(Rc::new(payload));
        self
    }

    /// Append a child node (builder).
    pub fn with_child(mut self, child: ViewNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The instance this node is the view of, for self-viewing components.
    pub fn instance(&self) -> Option<&Instance> {
        match &self.content {
            ViewContent::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn payload<V: Any>(&self) -> Option<&V> {
        match &self.content {
            ViewContent::Value(value) => value.downcast_ref(),
            _ => None,
        }
    }

    pub fn children(&self) -> &[ViewNode] {
        &self.children
    }
}

impl fmt::Debug for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ViewNode");
        s.field("name", &self.name);
        if let ViewContent::Instance(instance) = &self.content {
            s.field("instance", instance);
        }
        if !self.children.is_empty() {
            s.field("children", &self.children);
        }
        s.finish()
    }
}

// ---------------------------------------------------------------------------
// ResourceBundle
// ---------------------------------------------------------------------------

/// Localized strings, looked up by key.
pub trait ResourceBundle {
    fn get(&self, key: &str) -> Option<String>;
}

impl ResourceBundle for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

// ---------------------------------------------------------------------------
// TemplateLoader / RenderContext
// ---------------------------------------------------------------------------

/// Loads a template for an instance.
///
/// `root` is set when the instance itself should become the template's root
/// node (components with a template) rather than merely its controller.
pub trait TemplateLoader {
    fn load_view(
        &self,
        template: &str,
        instance: &Instance,
        root: bool,
        ctx: &mut RenderContext<'_>,
    ) -> Result<ViewNode>;
}

/// A sub-component handed to a template loader, with its rendered view.
#[derive(Debug, Clone)]
pub struct ProvidedChild {
    pub instance: Instance,
    pub view: ViewNode,
}

/// Rendering state for one template load.
pub struct RenderContext<'a> {
    manager: &'a LifecycleManager,
    owner: TypeInfo,
    params: &'a Params,
    pool: SubComponentPool,
    resources: Option<Rc<dyn ResourceBundle>>,
    created: Vec<Instance>,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(
        manager: &'a LifecycleManager,
        owner: TypeInfo,
        params: &'a Params,
        pool: SubComponentPool,
        resources: Option<Rc<dyn ResourceBundle>>,
    ) -> Self {
        Self {
            manager,
            owner,
            params,
            pool,
            resources,
            created: Vec::new(),
        }
    }

    /// Hand out the next sub-component of type `ty`.
    ///
    /// Declared sub-component instances are consumed first-in first-out and
    /// each is handed out at most once per pass. Once they are used up, a
    /// declared provider for the type supplies fresh instances, which are
    /// initialized and rendered with the current parameters and destroyed
    /// together with the parent.
    pub fn resolve_provided(&mut self, ty: TypeInfo) -> Result<ProvidedChild> {
        match self.pool.take(ty, self.owner)? {
            Pooled::Rendered(instance, view) => Ok(ProvidedChild { instance, view }),
            Pooled::Fresh(instance) => {
                self.manager.init(&instance, self.params)?;
                self.created.push(instance.clone());
                let view = self.manager.render(&instance, self.params)?;
                Ok(ProvidedChild { instance, view })
            }
        }
    }

    /// Bundle of the instance being rendered.
    pub fn resources(&self) -> Option<&Rc<dyn ResourceBundle>> {
        self.resources.as_ref()
    }

    pub fn params(&self) -> &Params {
        self.params
    }

    /// Type of the instance being rendered.
    pub fn owner(&self) -> TypeInfo {
        self.owner
    }

    /// Instances created through providers during this load, and the
    /// number of declared sub-components the loader never asked for.
    pub(crate) fn finish(self) -> (Vec<Instance>, usize) {
        (self.created, self.pool.remaining())
    }
}

/// Default template name for a type: the short name without `Controller`
/// or `Component`, plus `extension`.
pub fn default_template_name(ty: TypeInfo, extension: &str) -> String {
    format!("{}.{}", strip_role_suffix(ty.short_name()), extension)
}

/// `HomeController` → `Home`, `BadgeComponent` → `Badge`.
pub fn strip_role_suffix(name: &str) -> String {
    name.replace("Controller", "").replace("Component", "")
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, Descriptor};

    struct SettingsController;

    impl Component for SettingsController {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::controller()
        }
    }

    #[test]
    fn template_names() {
        let ty = TypeInfo::of::<SettingsController>();
        assert_eq!(default_template_name(ty, "view"), "Settings.view");
        assert_eq!(strip_role_suffix("BadgeComponent"), "Badge");
        assert_eq!(strip_role_suffix("Plain"), "Plain");
    }

    #[test]
    fn view_node_payload_and_children() {
        let node = ViewNode::new("root")
            .with_payload(42u8)
            .with_child(ViewNode::new("leaf"));
        assert_eq!(node.name(), "root");
        assert_eq!(node.payload::<u8>(), Some(&42));
        assert_eq!(node.payload::<u16>(), None);
        assert!(node.instance().is_none());
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].name(), "leaf");
    }

    #[test]
    fn view_node_of_instance() {
        let instance = Instance::new(SettingsController);
        let node = ViewNode::of_instance(&instance);
        assert_eq!(node.name(), "SettingsController");
        assert!(node.instance().is_some_and(|i| i.ptr_eq(&instance)));
    }

    #[test]
    fn map_resource_bundle() {
        let bundle: HashMap<String, String> = [("k".to_string(), "v".to_string())].into();
        assert_eq!(ResourceBundle::get(&bundle, "k"), Some("v".to_string()));
        assert_eq!(ResourceBundle::get(&bundle, "x"), None);
    }
}
