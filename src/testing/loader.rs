//! A template loader that records what it was asked to load.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::component::{Instance, RenderContext, TemplateLoader, TypeInfo, ViewNode};
use crate::error::{Error, Result};

/// One `load_view` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRecord {
    pub template: String,
    pub owner: &'static str,
    pub root: bool,
}

/// Returns a [`ViewNode`] named after the template and records every call.
///
/// Templates can be told to embed sub-components: each listed type is
/// resolved through the render context and its view appended as a child, in
/// the order given.
#[derive(Debug, Default)]
pub struct RecordingLoader {
    loads: RefCell<Vec<LoadRecord>>,
    embeds: HashMap<String, Vec<TypeInfo>>,
    failing: HashSet<String>,
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one sub-component of type `ty` whenever `template` loads
    /// (builder). Repeat to resolve several.
    pub fn embedding(mut self, template: &str, ty: TypeInfo) -> Self {
        self.embeds.entry(template.to_string()).or_default().push(ty);
        self
    }

    /// Fail every load of `template` (builder).
    pub fn failing(mut self, template: &str) -> Self {
        self.failing.insert(template.to_string());
        self
    }

    pub fn loads(&self) -> Vec<LoadRecord> {
        self.loads.borrow().clone()
    }

    /// Loaded templates, in call order.
    pub fn templates(&self) -> Vec<String> {
        self.loads.borrow().iter().map(|l| l.template.clone()).collect()
    }
}

impl TemplateLoader for RecordingLoader {
    fn load_view(
        &self,
        template: &str,
        instance: &Instance,
        root: bool,
        ctx: &mut RenderContext<'_>,
    ) -> Result<ViewNode> {
        let owner = instance.type_info().short_name();
        self.loads.borrow_mut().push(LoadRecord {
            template: template.to_string(),
            owner,
            root,
        });
        if self.failing.contains(template) {
            return Err(Error::Template {
                template: template.to_string(),
                owner: owner.to_string(),
                message: "rejected by test loader".to_string(),
            });
        }

        let mut node = ViewNode::new(template);
        for &ty in self.embeds.get(template).into_iter().flatten() {
            node = node.with_child(ctx.resolve_provided(ty)?.view);
        }
        Ok(node)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, Descriptor};
    use crate::lifecycle::LifecycleManager;
    use crate::params::Params;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    struct Badge;

    impl Component for Badge {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::component().view("badge.view")
        }
    }

    struct ProfileController;

    impl Component for ProfileController {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::controller()
        }
    }

    #[test]
    fn records_template_owner_and_root_flag() {
        let loader = Rc::new(RecordingLoader::new());
        let manager = LifecycleManager::default().with_template_loader(loader.clone());
        manager
            .init_and_render(&Instance::new(Badge), &Params::new())
            .unwrap();
        manager
            .init_and_render(&Instance::new(ProfileController), &Params::new())
            .unwrap();

        assert_eq!(
            loader.loads(),
            vec![
                LoadRecord {
                    template: "badge.view".into(),
                    owner: "Badge",
                    root: true,
                },
                LoadRecord {
                    template: "Profile.view".into(),
                    owner: "ProfileController",
                    root: false,
                },
            ]
        );
    }

    #[test]
    fn failing_template() {
        let loader = Rc::new(RecordingLoader::new().failing("badge.view"));
        let manager = LifecycleManager::default().with_template_loader(loader);
        let err = manager
            .init_and_render(&Instance::new(Badge), &Params::new())
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"failed to load template 'badge.view' for Badge: rejected by test loader");
    }

    #[test]
    fn embedding_without_declared_sub_component() {
        let loader = Rc::new(
            RecordingLoader::new().embedding("Profile.view", TypeInfo::of::<Badge>()),
        );
        let manager = LifecycleManager::default().with_template_loader(loader);
        let err = manager
            .init_and_render(&Instance::new(ProfileController), &Params::new())
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"ProfileController has no sub-component or provider of type Badge");
    }
}
