//! # stagehand
//!
//! Declarative component lifecycle and route navigation for desktop UI
//! applications.
//!
//! Components and controllers declare, once per type, which parameters they
//! take, which hooks run in which phase and which sub-components they own.
//! The lifecycle manager drives instances through init, render and destroy
//! in a deterministic order; the router maps paths to providers and keeps a
//! bounded back/forward history.
//!
//! ## Core Systems
//!
//! - **[`route`]**: slotmap-backed route tree with a cursor
//! - **[`history`]**: bounded, traversable navigation history
//! - **[`component`]**: the `Component` trait, instances, providers, descriptors, views
//! - **[`lifecycle`]**: sidecars, sub-component pooling, for-each lists, the lifecycle manager
//! - **[`router`]**: route registration, navigation, history replay
//! - **[`app`]**: application shell with title, key input and hot reload
//! - **[`modal`]**: components opened standalone, outside navigation
//! - **[`params`]**: type-erased, nullable navigation parameters
//! - **[`reactive`]**: observable properties and subscription disposers
//! - **[`event`]**: key events and key handler matching
//! - **[`reload`]**: cross-thread refresh requests
//! - **[`testing`]**: recording template loader and the Pilot

// Foundation
pub mod config;
pub mod error;
pub mod params;

// Navigation structures
pub mod history;
pub mod route;

// Components and lifecycle
pub mod component;
pub mod lifecycle;

// Events and reactivity
pub mod event;
pub mod reactive;

// Application
pub mod app;
pub mod modal;
pub mod reload;
pub mod router;

// Headless testing
pub mod testing;

pub use app::App;
pub use component::{Component, Descriptor, Instance, Provider, ViewNode};
pub use config::FrameworkConfig;
pub use error::{ConfigError, Error, Result};
pub use lifecycle::{ForEach, LifecycleManager};
pub use modal::{Modal, ModalBuilder};
pub use params::Params;
pub use router::{RouteDecl, Router, Routes};
