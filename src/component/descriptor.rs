//! Per-type lifecycle metadata.
//!
//! A [`Descriptor`] lists everything the lifecycle manager does with a
//! component type: which parameters are injected where, which hooks run in
//! which phase, which sub-components it owns, how its view and title are
//! produced. It is built once per type (see
//! [`Component::descriptor`](super::Component::descriptor)), validated when
//! the type is registered, and never re-read per call.
//!
//! ```ignore
//! impl Component for CounterController {
//!     fn descriptor() -> Descriptor<Self> {
//!         Descriptor::controller()
//!             .view("counter.view")
//!             .title("%counter.title")
//!             .param("start", |c: &mut Self, v: i32| c.count = v)
//!             .on_init("reset", 0, |c, _| c.clicks = 0)
//!             .on_key("increment", KeyMatch::character('+'), |c, _| c.count += 1)
//!             .subscriber("subscriber", |c| &c.subscriber)
//!     }
//! }
//! ```

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::instance::{Instance, Provider, TypeInfo};
use super::view::{ResourceBundle, ViewNode};
use super::Component;
use crate::error::{ConfigError, Result};
use crate::event::{KeyEvent, KeyMatch};
use crate::lifecycle::for_each::LoopSlot;
use crate::lifecycle::{ForEach, LifecycleManager};
use crate::params::{ParamSite, ParamTuple, Params, Value};
use crate::reactive::{Property, Subscriber};

// ---------------------------------------------------------------------------
// Kind / ViewSpec / Title
// ---------------------------------------------------------------------------

/// What a type is tagged as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A visible unit that is its own view unless it declares a template.
    Component,
    /// A logic unit bound to a template or a view method.
    Controller,
}

/// How the view of an instance is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSpec {
    /// The instance is its own view.
    Own,
    /// Load the named template.
    Template(String),
    /// Call the named view method.
    Method(String),
    /// Load the template derived from the type name.
    Default,
}

impl ViewSpec {
    /// `"#name"` selects a view method, `""` the kind's default view,
    /// anything else a template.
    pub fn parse(view: &str) -> Self {
        match view.strip_prefix('#') {
            Some(method) => Self::Method(method.to_string()),
            None if view.is_empty() => Self::Default,
            None => Self::Template(view.to_string()),
        }
    }
}

/// A declared title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Title {
    /// Used verbatim.
    Literal(String),
    /// `$name`: the type's short name without its role suffix.
    TypeName,
    /// `%key`: looked up in the resource bundle.
    Key(String),
}

impl Title {
    pub fn parse(title: &str) -> Self {
        if title == "$name" {
            Self::TypeName
        } else if let Some(key) = title.strip_prefix('%') {
            Self::Key(key.to_string())
        } else {
            Self::Literal(title.to_string())
        }
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(s) => f.write_str(s),
            Self::TypeName => f.write_str("$name"),
            Self::Key(k) => write!(f, "%{k}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

type ApplyValue<T> = Box<dyn Fn(&mut T, &Value, &ParamSite<'_>) -> Result<()>>;
type ApplyParams<T> = Box<dyn Fn(&mut T, &Params, &str) -> Result<()>>;
pub(crate) type HookFn<T> = Rc<dyn Fn(&mut T, &Params)>;
pub(crate) type KeyFn<T> = Rc<dyn Fn(&mut T, &KeyEvent)>;
type ChildFn<T> = Box<dyn Fn(&T) -> Option<Instance>>;
type ProviderFn<T> = Box<dyn Fn(&T) -> Provider>;
type SubscriberFn<T> = Box<dyn Fn(&T) -> &Subscriber>;
type LoopFn<T> = Box<dyn Fn(&T) -> Box<dyn LoopSlot>>;
type ResourcesFn<T> = Box<dyn Fn(&T) -> Option<Rc<dyn ResourceBundle>>>;
type ViewFn<T> = Box<dyn Fn(&mut T) -> ViewNode>;
pub(crate) type Registrar = fn(&LifecycleManager) -> Result<(), ConfigError>;

/// A single named parameter, injected into a field or passed to a method.
pub(crate) struct ParamEntry<T> {
    pub param: String,
    pub member: String,
    pub apply: ApplyValue<T>,
}

impl<T> ParamEntry<T> {
    pub(crate) fn site<'a>(&'a self, owner: &'a str) -> ParamSite<'a> {
        ParamSite {
            param: &self.param,
            member: &self.member,
            owner,
        }
    }
}

/// Several named parameters passed positionally to one method.
pub(crate) struct ParamsEntry<T> {
    pub member: String,
    pub names: Vec<String>,
    pub arity: usize,
    pub apply: ApplyParams<T>,
}

/// The whole parameter map, injected into a field or passed to a method.
pub(crate) struct MapEntry<T> {
    pub member: String,
    pub apply: Box<dyn Fn(&mut T, &Params)>,
}

pub(crate) struct Hook<T> {
    pub name: String,
    pub priority: i32,
    pub run: HookFn<T>,
}

pub(crate) struct KeyHandler<T> {
    pub member: String,
    pub matcher: KeyMatch,
    pub handler: KeyFn<T>,
}

pub(crate) enum ChildSource<T> {
    Instance(ChildFn<T>),
    Provider(ProviderFn<T>),
}

pub(crate) struct SubComponent<T> {
    pub member: String,
    pub ty: TypeInfo,
    pub source: ChildSource<T>,
    pub register: Registrar,
}

pub(crate) struct SubscriberField<T> {
    pub member: String,
    pub get: SubscriberFn<T>,
}

pub(crate) struct LoopField<T> {
    pub member: String,
    pub get: LoopFn<T>,
    pub register: Registrar,
}

fn register_type<C: Component>(manager: &LifecycleManager) -> Result<(), ConfigError> {
    manager.register::<C>()
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Lifecycle metadata of a component type `T`.
pub struct Descriptor<T> {
    pub(crate) kind: Kind,
    pub(crate) view: ViewSpec,
    pub(crate) view_methods: Vec<(String, ViewFn<T>)>,
    pub(crate) title: Option<Title>,
    pub(crate) resources: Vec<ResourcesFn<T>>,
    pub(crate) param_fields: Vec<ParamEntry<T>>,
    pub(crate) map_fields: Vec<MapEntry<T>>,
    pub(crate) param_methods: Vec<ParamEntry<T>>,
    pub(crate) params_methods: Vec<ParamsEntry<T>>,
    pub(crate) map_methods: Vec<MapEntry<T>>,
    pub(crate) init_hooks: Vec<Hook<T>>,
    pub(crate) render_hooks: Vec<Hook<T>>,
    pub(crate) destroy_hooks: Vec<Hook<T>>,
    pub(crate) key_handlers: Vec<KeyHandler<T>>,
    pub(crate) sub_components: Vec<SubComponent<T>>,
    pub(crate) subscribers: Vec<SubscriberField<T>>,
    pub(crate) loops: Vec<LoopField<T>>,
}

impl<T: 'static> Descriptor<T> {
    fn with_kind(kind: Kind, view: ViewSpec) -> Self {
        Self {
            kind,
            view,
            view_methods: Vec::new(),
            title: None,
            resources: Vec::new(),
            param_fields: Vec::new(),
            map_fields: Vec::new(),
            param_methods: Vec::new(),
            params_methods: Vec::new(),
            map_methods: Vec::new(),
            init_hooks: Vec::new(),
            render_hooks: Vec::new(),
            destroy_hooks: Vec::new(),
            key_handlers: Vec::new(),
            sub_components: Vec::new(),
            subscribers: Vec::new(),
            loops: Vec::new(),
        }
    }

    /// A component: its own view unless a template is declared.
    pub fn component() -> Self {
        Self::with_kind(Kind::Component, ViewSpec::Own)
    }

    /// A controller: uses the default template unless told otherwise.
    pub fn controller() -> Self {
        Self::with_kind(Kind::Controller, ViewSpec::Default)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn view_spec(&self) -> &ViewSpec {
        &self.view
    }

    pub fn title_spec(&self) -> Option<&Title> {
        self.title.as_ref()
    }

    // -- view / title / resources ---------------------------------------

    /// Declare the view: a template reference, or `"#method"` for a view
    /// method. `""` keeps the kind's default: a component stays its own
    /// view, a controller uses the derived template.
    pub fn view(mut self, view: &str) -> Self {
        self.view = match (self.kind, ViewSpec::parse(view)) {
            (Kind::Component, ViewSpec::Default) => ViewSpec::Own,
            (_, spec) => spec,
        };
        self
    }

    /// Declare a view method, selected with `view("#name")`.
    pub fn view_method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&mut T) -> ViewNode + 'static,
    ) -> Self {
        self.view_methods.push((name.into(), Box::new(method)));
        self
    }

    /// Declare the title: literal, `$name` or `%key`.
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(Title::parse(title));
        self
    }

    /// Declare where the instance keeps its resource bundle.
    pub fn resources(
        mut self,
        accessor: impl Fn(&T) -> Option<Rc<dyn ResourceBundle>> + 'static,
    ) -> Self {
        self.resources.push(Box::new(accessor));
        self
    }

    // -- parameter fields -----------------------------------------------

    /// Inject a non-null `V` into a field. Null is a type error.
    pub fn param<V: Any + Clone>(
        mut self,
        key: impl Into<String>,
        setter: impl Fn(&mut T, V) + 'static,
    ) -> Self {
        let key = key.into();
        self.param_fields.push(ParamEntry {
            member: key.clone(),
            param: key,
            apply: Box::new(move |target: &mut T, value: &Value, site: &ParamSite<'_>| {
                setter(target, site.require::<V>(value)?);
                Ok(())
            }),
        });
        self
    }

    /// Inject a `V` or null into a field.
    pub fn param_nullable<V: Any + Clone>(
        mut self,
        key: impl Into<String>,
        setter: impl Fn(&mut T, Option<V>) + 'static,
    ) -> Self {
        let key = key.into();
        self.param_fields.push(ParamEntry {
            member: key.clone(),
            param: key,
            apply: Box::new(move |target: &mut T, value: &Value, site: &ParamSite<'_>| {
                setter(target, site.nullable::<V>(value)?);
                Ok(())
            }),
        });
        self
    }

    /// Inject into a [`Property`] field.
    ///
    /// A plain `V` goes through the property's setter so existing listeners
    /// keep working; an incoming `Property<V>` replaces the field.
    pub fn param_property<V: Any + Clone>(
        mut self,
        key: impl Into<String>,
        accessor: impl Fn(&mut T) -> &mut Property<V> + 'static,
    ) -> Self {
        let key = key.into();
        self.param_fields.push(ParamEntry {
            member: key.clone(),
            param: key,
            apply: Box::new(move |target: &mut T, value: &Value, site: &ParamSite<'_>| {
                match value.downcast_ref::<Property<V>>() {
                    Some(incoming) => *accessor(target) = incoming.clone(),
                    None => accessor(target).set(site.require::<V>(value)?),
                }
                Ok(())
            }),
        });
        self
    }

    /// Replace a [`Params`] field with the navigation's parameter map.
    pub fn params_map(
        mut self,
        member: impl Into<String>,
        accessor: impl Fn(&mut T) -> &mut Params + 'static,
    ) -> Self {
        self.map_fields.push(MapEntry {
            member: member.into(),
            apply: Box::new(move |target: &mut T, params: &Params| {
                *accessor(target) = params.clone()
            }),
        });
        self
    }

    /// Clear a map field owned by the instance and copy every parameter in.
    pub fn params_map_into(
        mut self,
        member: impl Into<String>,
        accessor: impl Fn(&mut T) -> &mut HashMap<String, Value> + 'static,
    ) -> Self {
        self.map_fields.push(MapEntry {
            member: member.into(),
            apply: Box::new(move |target: &mut T, params: &Params| {
                let map = accessor(target);
                map.clear();
                params.copy_into(map);
            }),
        });
        self
    }

    // -- parameter methods ----------------------------------------------

    /// Call `method` with the non-null `V` named `key`. An absent key is
    /// passed as null, which is a type error here.
    pub fn param_method<V: Any + Clone>(
        mut self,
        method: impl Into<String>,
        key: impl Into<String>,
        f: impl Fn(&mut T, V) + 'static,
    ) -> Self {
        self.param_methods.push(ParamEntry {
            member: method.into(),
            param: key.into(),
            apply: Box::new(move |target: &mut T, value: &Value, site: &ParamSite<'_>| {
                f(target, site.require::<V>(value)?);
                Ok(())
            }),
        });
        self
    }

    /// Call `method` with the `V` named `key`, or `None` when it is null or
    /// absent.
    pub fn param_method_nullable<V: Any + Clone>(
        mut self,
        method: impl Into<String>,
        key: impl Into<String>,
        f: impl Fn(&mut T, Option<V>) + 'static,
    ) -> Self {
        self.param_methods.push(ParamEntry {
            member: method.into(),
            param: key.into(),
            apply: Box::new(move |target: &mut T, value: &Value, site: &ParamSite<'_>| {
                f(target, site.nullable::<V>(value)?);
                Ok(())
            }),
        });
        self
    }

    /// Call `method` with several named parameters, positionally. The
    /// tuple's arity must equal the number of names.
    pub fn params_method<P: ParamTuple + 'static>(
        mut self,
        method: impl Into<String>,
        names: &[&str],
        f: impl Fn(&mut T, P) + 'static,
    ) -> Self {
        let member = method.into();
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let bound_names = names.clone();
        let bound_member = member.clone();
        self.params_methods.push(ParamsEntry {
            member,
            arity: P::ARITY,
            apply: Box::new(move |target: &mut T, params: &Params, owner: &str| {
                let args = P::extract(params, &bound_names, &bound_member, owner)?;
                f(target, args);
                Ok(())
            }),
            names,
        });
        self
    }

    /// Call `method` with the whole parameter map.
    pub fn params_map_method(
        mut self,
        method: impl Into<String>,
        f: impl Fn(&mut T, &Params) + 'static,
    ) -> Self {
        self.map_methods.push(MapEntry {
            member: method.into(),
            apply: Box::new(f),
        });
        self
    }

    // -- hooks ----------------------------------------------------------

    /// Run after parameters are injected. Lower priorities run first.
    pub fn on_init(
        mut self,
        name: impl Into<String>,
        priority: i32,
        hook: impl Fn(&mut T, &Params) + 'static,
    ) -> Self {
        self.init_hooks.push(Hook {
            name: name.into(),
            priority,
            run: Rc::new(hook),
        });
        self
    }

    /// Run after the view is produced. Lower priorities run first.
    pub fn on_render(
        mut self,
        name: impl Into<String>,
        priority: i32,
        hook: impl Fn(&mut T, &Params) + 'static,
    ) -> Self {
        self.render_hooks.push(Hook {
            name: name.into(),
            priority,
            run: Rc::new(hook),
        });
        self
    }

    /// Run after the sub-components are destroyed. Lower priorities run
    /// first.
    pub fn on_destroy(
        mut self,
        name: impl Into<String>,
        priority: i32,
        hook: impl Fn(&mut T) + 'static,
    ) -> Self {
        self.destroy_hooks.push(Hook {
            name: name.into(),
            priority,
            run: Rc::new(move |target: &mut T, _: &Params| hook(target)),
        });
        self
    }

    /// Handle key events matching `matcher` while the instance is rendered.
    pub fn on_key(
        mut self,
        member: impl Into<String>,
        matcher: KeyMatch,
        handler: impl Fn(&mut T, &KeyEvent) + 'static,
    ) -> Self {
        self.key_handlers.push(KeyHandler {
            member: member.into(),
            matcher,
            handler: Rc::new(handler),
        });
        self
    }

    // -- composition ----------------------------------------------------

    /// Declare a sub-component held by the instance. It goes through the
    /// lifecycle together with its parent, in declaration order.
    pub fn sub_component<C: Component>(
        mut self,
        member: impl Into<String>,
        accessor: impl Fn(&T) -> Option<Rc<RefCell<C>>> + 'static,
    ) -> Self {
        self.sub_components.push(SubComponent {
            member: member.into(),
            ty: TypeInfo::of::<C>(),
            source: ChildSource::Instance(Box::new(move |parent: &T| {
                accessor(parent).map(Instance::from_shared)
            })),
            register: register_type::<C>,
        });
        self
    }

    /// Declare a provider the template loader may draw additional
    /// sub-components of type `C` from.
    pub fn sub_component_provider<C: Component>(
        mut self,
        member: impl Into<String>,
        accessor: impl Fn(&T) -> Provider + 'static,
    ) -> Self {
        self.sub_components.push(SubComponent {
            member: member.into(),
            ty: TypeInfo::of::<C>(),
            source: ChildSource::Provider(Box::new(accessor)),
            register: register_type::<C>,
        });
        self
    }

    /// Declare a for-each list. Its item components are brought up after the
    /// instance's sub-components render and destroyed before they are.
    pub fn for_each<C, I>(
        mut self,
        member: impl Into<String>,
        accessor: impl Fn(&T) -> &ForEach<C, I> + 'static,
    ) -> Self
    where
        C: Component,
        I: Clone + PartialEq + std::fmt::Debug + 'static,
    {
        self.loops.push(LoopField {
            member: member.into(),
            get: Box::new(move |parent: &T| {
                Box::new(accessor(parent).clone()) as Box<dyn LoopSlot>
            }),
            register: register_type::<C>,
        });
        self
    }

    /// Declare a subscriber expected to be disposed by the time the instance
    /// is destroyed.
    pub fn subscriber(
        mut self,
        member: impl Into<String>,
        accessor: impl Fn(&T) -> &Subscriber + 'static,
    ) -> Self {
        self.subscribers.push(SubscriberField {
            member: member.into(),
            get: Box::new(accessor),
        });
        self
    }

    // -- validation -----------------------------------------------------

    /// Check the declarations for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let owner = || TypeInfo::of::<T>().short_name().to_string();

        let single: HashSet<&str> = self
            .param_fields
            .iter()
            .chain(&self.param_methods)
            .map(|e| e.member.as_str())
            .chain(self.params_methods.iter().map(|e| e.member.as_str()))
            .collect();
        if let Some(conflict) = self
            .map_fields
            .iter()
            .chain(&self.map_methods)
            .find(|e| single.contains(e.member.as_str()))
        {
            return Err(ConfigError::ConflictingParamTags {
                member: conflict.member.clone(),
                owner: owner(),
            });
        }

        if let Some(entry) = self.params_methods.iter().find(|e| e.names.len() != e.arity) {
            return Err(ConfigError::ParamsArity {
                member: entry.member.clone(),
                owner: owner(),
                names: entry.names.len(),
                arity: entry.arity,
            });
        }

        for (phase, hooks) in [
            ("init", &self.init_hooks),
            ("render", &self.render_hooks),
            ("destroy", &self.destroy_hooks),
        ] {
            let mut seen = HashSet::new();
            if let Some(dup) = hooks.iter().find(|h| !seen.insert(h.name.as_str())) {
                return Err(ConfigError::DuplicateHook {
                    hook: dup.name.clone(),
                    phase,
                    owner: owner(),
                });
            }
        }

        if self.resources.len() > 1 {
            return Err(ConfigError::DuplicateResource { owner: owner() });
        }

        if let ViewSpec::Method(method) = &self.view {
            if self.kind == Kind::Component {
                return Err(ConfigError::MethodViewOnComponent { owner: owner() });
            }
            if !self.view_methods.iter().any(|(name, _)| name == method) {
                return Err(ConfigError::MissingViewMethod {
                    method: method.clone(),
                    owner: owner(),
                });
            }
        }

        let mut provided = HashSet::new();
        for sub in &self.sub_components {
            if matches!(sub.source, ChildSource::Provider(_)) && !provided.insert(sub.ty) {
                return Err(ConfigError::DuplicateSubComponentProvider {
                    type_name: sub.ty.short_name().to_string(),
                    owner: owner(),
                });
            }
        }

        Ok(())
    }
}

impl<T> std::fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("type", &type_name::<T>())
            .field("kind", &self.kind)
            .field("view", &self.view)
            .field("title", &self.title)
            .field("params", &(self.param_fields.len() + self.param_methods.len()))
            .field("hooks", &(self.init_hooks.len() + self.render_hooks.len() + self.destroy_hooks.len()))
            .field("sub_components", &self.sub_components.len())
            .field("loops", &self.loops.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct FormController {
        name: String,
        all: Params,
    }

    impl Component for FormController {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::controller()
        }
    }

    // ── Parsing ──────────────────────────────────────────────────────

    #[test]
    fn view_spec_parsing() {
        assert_eq!(ViewSpec::parse("#build"), ViewSpec::Method("build".into()));
        assert_eq!(ViewSpec::parse(""), ViewSpec::Default);
        assert_eq!(ViewSpec::parse("form.view"), ViewSpec::Template("form.view".into()));
    }

    #[test]
    fn title_parsing() {
        assert_eq!(Title::parse("$name"), Title::TypeName);
        assert_eq!(Title::parse("%app.title"), Title::Key("app.title".into()));
        assert_eq!(Title::parse("Hello"), Title::Literal("Hello".into()));
        assert_eq!(Title::parse("%k").to_string(), "%k");
    }

    #[test]
    fn kinds_pick_default_views() {
        assert_eq!(Descriptor::<FormController>::component().view_spec(), &ViewSpec::Own);
        assert_eq!(Descriptor::<FormController>::controller().view_spec(), &ViewSpec::Default);
        assert_eq!(
            Descriptor::<FormController>::component().view("x.view").view_spec(),
            &ViewSpec::Template("x.view".into())
        );
        assert_eq!(Descriptor::<FormController>::component().view("").view_spec(), &ViewSpec::Own);
        assert_eq!(
            Descriptor::<FormController>::controller().view("").view_spec(),
            &ViewSpec::Default
        );
    }

    // ── Validation ───────────────────────────────────────────────────

    #[test]
    fn valid_descriptor() {
        let d = Descriptor::<FormController>::controller()
            .param("name", |c: &mut FormController, v: String| c.name = v)
            .params_map("all", |c| &mut c.all)
            .on_init("a", 0, |_, _| {})
            .on_render("a", 0, |_, _| {});
        assert!(d.validate().is_ok());
    }

    #[test]
    fn conflicting_param_tags() {
        let d = Descriptor::<FormController>::controller()
            .param_method("apply", "name", |c: &mut FormController, v: String| c.name = v)
            .params_map_method("apply", |_, _| {});
        insta::assert_snapshot!(d.validate().unwrap_err().to_string(), @"member 'apply' of FormController is declared both as a single parameter and as a parameter map");
    }

    #[test]
    fn params_arity_mismatch() {
        let d = Descriptor::<FormController>::controller().params_method(
            "set",
            &["a", "b"],
            |_: &mut FormController, _: (Option<i32>,)| {},
        );
        assert_eq!(
            d.validate(),
            Err(ConfigError::ParamsArity {
                member: "set".into(),
                owner: "FormController".into(),
                names: 2,
                arity: 1,
            })
        );
    }

    #[test]
    fn duplicate_hook_in_phase() {
        let d = Descriptor::<FormController>::controller()
            .on_init("setup", 0, |_, _| {})
            .on_init("setup", 5, |_, _| {});
        insta::assert_snapshot!(d.validate().unwrap_err().to_string(), @"init hook 'setup' of FormController is declared more than once");
    }

    #[test]
    fn duplicate_resources() {
        let d = Descriptor::<FormController>::controller()
            .resources(|_| None)
            .resources(|_| None);
        assert_eq!(
            d.validate(),
            Err(ConfigError::DuplicateResource {
                owner: "FormController".into()
            })
        );
    }

    #[test]
    fn view_method_checks() {
        let missing = Descriptor::<FormController>::controller().view("#build");
        assert!(matches!(
            missing.validate(),
            Err(ConfigError::MissingViewMethod { .. })
        ));

        let on_component = Descriptor::<FormController>::component()
            .view("#build")
            .view_method("build", |_| ViewNode::new("built"));
        assert!(matches!(
            on_component.validate(),
            Err(ConfigError::MethodViewOnComponent { .. })
        ));

        let ok = Descriptor::<FormController>::controller()
            .view("#build")
            .view_method("build", |_| ViewNode::new("built"));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn duplicate_sub_component_provider() {
        let d = Descriptor::<FormController>::controller()
            .sub_component_provider::<FormController>("a", |_| Provider::of::<FormController>())
            .sub_component_provider::<FormController>("b", |_| Provider::of::<FormController>());
        assert!(matches!(
            d.validate(),
            Err(ConfigError::DuplicateSubComponentProvider { .. })
        ));
    }
}
