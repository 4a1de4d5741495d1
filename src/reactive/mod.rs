//! Reactive state: writable value holders and subscription disposers.
//!
//! - [`Property`]: a shared, observable value. Parameter injection calls its
//!   setter so listeners attached before `init` keep working.
//! - [`Subscription`]: a single disposable registration.
//! - [`Subscriber`]: a composite disposer a component fills during `init` or
//!   `render` and disposes in an on-destroy hook.

pub mod property;
pub mod subscriber;

pub use property::Property;
pub use subscriber::{Subscriber, Subscription};
