//! Lifecycle management: registration, init/render/destroy dispatch,
//! sub-component pooling, for-each lists.

pub mod for_each;
pub mod manager;
pub(crate) mod pool;
pub mod sidecar;

pub use for_each::ForEach;
pub use manager::LifecycleManager;
pub use sidecar::{DescriptorSidecar, Sidecar};
