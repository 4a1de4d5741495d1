//! Components: the `Component` trait, instances, providers, descriptors and
//! the view boundary.
//!
//! A type becomes manageable by implementing [`Component`]: its
//! [`Descriptor`] says whether it is a component or a controller and lists
//! its parameters, hooks, key handlers and sub-components.

pub mod descriptor;
pub mod instance;
pub mod view;

pub use descriptor::{Descriptor, Kind, Title, ViewSpec};
pub use instance::{Instance, InstanceId, Provider, TypeInfo};
pub use view::{
    default_template_name, ProvidedChild, RenderContext, ResourceBundle, TemplateLoader, ViewNode,
};

use crate::lifecycle::Sidecar;

/// A type whose instances the lifecycle manager can drive.
pub trait Component: Sized + 'static {
    /// Lifecycle metadata, read once when the type is registered.
    fn descriptor() -> Descriptor<Self>;

    /// A hand-written or generated sidecar replacing the descriptor-driven
    /// one. When this returns `Some`, [`descriptor`](Self::descriptor) is
    /// not consulted.
    fn sidecar() -> Option<Box<dyn Sidecar<Self>>> {
        None
    }
}
