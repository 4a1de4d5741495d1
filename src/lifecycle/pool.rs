//! Per-type pool of sub-components for one template load.

use std::any::TypeId;
use std::collections::{HashMap, VecDeque};

use crate::component::{Instance, Provider, TypeInfo, ViewNode};
use crate::error::{Error, Result};

/// What the pool handed out.
#[derive(Debug)]
pub(crate) enum Pooled {
    /// A declared sub-component, already initialized and rendered.
    Rendered(Instance, ViewNode),
    /// A fresh instance from a declared provider; not yet initialized.
    Fresh(Instance),
}

/// Declared sub-components grouped by type, consumed first-in first-out,
/// plus at most one provider per type.
#[derive(Default)]
pub(crate) struct SubComponentPool {
    instances: HashMap<TypeId, VecDeque<(Instance, ViewNode)>>,
    handed_out: HashMap<TypeId, usize>,
    providers: HashMap<TypeId, Provider>,
}

impl SubComponentPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_instance(&mut self, instance: Instance, view: ViewNode) {
        self.instances
            .entry(instance.type_info().id())
            .or_default()
            .push_back((instance, view));
    }

    pub(crate) fn add_provider(&mut self, ty: TypeInfo, provider: Provider) {
        self.providers.insert(ty.id(), provider);
    }

    /// Next sub-component of type `ty`.
    pub(crate) fn take(&mut self, ty: TypeInfo, owner: TypeInfo) -> Result<Pooled> {
        if let Some((instance, view)) = self
            .instances
            .get_mut(&ty.id())
            .and_then(VecDeque::pop_front)
        {
            *self.handed_out.entry(ty.id()).or_default() += 1;
            return Ok(Pooled::Rendered(instance, view));
        }
        let owner = owner.short_name().to_string();
        if let Some(provider) = self.providers.get(&ty.id()) {
            let instance = provider.get();
            if instance.type_info() != ty {
                return Err(Error::SubComponentMismatch {
                    declared: ty.short_name().to_string(),
                    produced: instance.type_info().short_name().to_string(),
                    owner,
                });
            }
            return Ok(Pooled::Fresh(instance));
        }

        let type_name = ty.short_name().to_string();
        if self.handed_out.contains_key(&ty.id()) {
            Err(Error::SubComponentExhausted { type_name, owner })
        } else {
            Err(Error::NoSubComponent { type_name, owner })
        }
    }

    /// Declared instances not handed out yet.
    pub(crate) fn remaining(&self) -> usize {
        self.instances.values().map(VecDeque::len).sum()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, Descriptor};

    #[derive(Default)]
    struct Badge;

    impl Component for Badge {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::component()
        }
    }

    struct Panel;

    impl Component for Panel {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::controller()
        }
    }

    fn owner() -> TypeInfo {
        TypeInfo::of::<Panel>()
    }

    #[test]
    fn instances_are_fifo_and_single_use() {
        let first = Instance::new(Badge);
        let second = Instance::new(Badge);
        let mut pool = SubComponentPool::new();
        pool.push_instance(first.clone(), ViewNode::new("first"));
        pool.push_instance(second.clone(), ViewNode::new("second"));
        assert_eq!(pool.remaining(), 2);

        let ty = TypeInfo::of::<Badge>();
        match pool.take(ty, owner()).unwrap() {
            Pooled::Rendered(i, v) => {
                assert!(i.ptr_eq(&first));
                assert_eq!(v.name(), "first");
            }
            Pooled::Fresh(_) => panic!("expected a pooled instance"),
        }
        assert!(matches!(pool.take(ty, owner()).unwrap(), Pooled::Rendered(i, _) if i.ptr_eq(&second)));

        let err = pool.take(ty, owner()).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Panel has no more sub-components of type Badge to provide");
    }

    #[test]
    fn provider_takes_over_when_exhausted() {
        let mut pool = SubComponentPool::new();
        let ty = TypeInfo::of::<Badge>();
        pool.push_instance(Instance::new(Badge), ViewNode::new("declared"));
        pool.add_provider(ty, Provider::of::<Badge>());

        assert!(matches!(pool.take(ty, owner()).unwrap(), Pooled::Rendered(..)));
        assert!(matches!(pool.take(ty, owner()).unwrap(), Pooled::Fresh(_)));
        assert!(matches!(pool.take(ty, owner()).unwrap(), Pooled::Fresh(_)));
    }

    #[test]
    fn provider_producing_another_type_is_rejected() {
        let mut pool = SubComponentPool::new();
        let ty = TypeInfo::of::<Badge>();
        pool.add_provider(ty, Provider::erased::<Badge>(|| Instance::new(Panel)));
        let err = pool.take(ty, owner()).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"sub-component provider of Panel for Badge produced Panel");
    }

    #[test]
    fn unknown_type() {
        let mut pool = SubComponentPool::new();
        let err = pool.take(TypeInfo::of::<Badge>(), owner()).unwrap_err();
        assert!(matches!(err, Error::NoSubComponent { .. }));
    }
}
