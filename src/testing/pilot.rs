//! Pilot: drive an [`App`] from tests.
//!
//! The `Pilot` owns an [`App`] wired to a [`RecordingLoader`], and offers
//! short-hands for navigating, pressing keys and inspecting what is
//! displayed.

use std::rc::Rc;

use super::loader::RecordingLoader;
use crate::app::App;
use crate::component::{Component, Instance, ViewNode};
use crate::config::FrameworkConfig;
use crate::error::Result;
use crate::event::{Key, KeyEvent, Modifiers};
use crate::params::Params;
use crate::router::Routes;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless app driver for tests.
///
/// # Examples
///
/// ```ignore
/// use stagehand::testing::Pilot;
/// use stagehand::event::Key;
///
/// let mut pilot = Pilot::new(&AppRoutes);
/// pilot.show("/counter");
/// pilot.press_key(Key::Char('+'));
/// assert_eq!(pilot.title(), Some("Counter"));
/// ```
pub struct Pilot {
    app: App,
    loader: Rc<RecordingLoader>,
}

impl Pilot {
    /// A pilot with default configuration and `routes` registered.
    ///
    /// Panics if the routes are rejected.
    pub fn new<R: Routes>(routes: &R) -> Self {
        Self::with_loader(routes, FrameworkConfig::new(), RecordingLoader::new())
    }

    /// A pilot with an explicit configuration and loader.
    ///
    /// Panics if the configuration or the routes are rejected.
    pub fn with_loader<R: Routes>(
        routes: &R,
        config: FrameworkConfig,
        loader: RecordingLoader,
    ) -> Self {
        let loader = Rc::new(loader);
        let mut app = match App::new(config) {
            Ok(app) => app.with_template_loader(loader.clone()),
            Err(err) => panic!("invalid pilot configuration: {err}"),
        };
        if let Err(err) = app.register_routes(routes) {
            panic!("routes rejected: {err}");
        }
        Self { app, loader }
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Show `path` without parameters. Panics on failure.
    pub fn show(&mut self, path: &str) -> &ViewNode {
        self.show_with(path, Params::new())
    }

    /// Show `path` with `params`. Panics on failure.
    pub fn show_with(&mut self, path: &str, params: Params) -> &ViewNode {
        match self.app.show(path, params) {
            Ok(view) => view,
            Err(err) => panic!("showing '{path}' failed: {err}"),
        }
    }

    /// Show `path`, returning the error instead of panicking.
    pub fn try_show(&mut self, path: &str, params: Params) -> Result<&ViewNode> {
        self.app.show(path, params)
    }

    pub fn back(&mut self) -> Result<bool> {
        self.app.back()
    }

    pub fn forward(&mut self) -> Result<bool> {
        self.app.forward()
    }

    pub fn refresh(&mut self) -> Result<bool> {
        self.app.refresh()
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Press `key` without modifiers. Returns how many handlers ran.
    pub fn press_key(&mut self, key: Key) -> usize {
        self.press_key_with(key, Modifiers::NONE)
    }

    pub fn press_key_with(&mut self, key: Key, modifiers: Modifiers) -> usize {
        self.app.dispatch_key(&KeyEvent::new(key, modifiers))
    }

    /// Press each character of `text` in turn.
    pub fn type_text(&mut self, text: &str) -> usize {
        text.chars().map(|ch| self.press_key(Key::Char(ch))).sum()
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn loader(&self) -> &RecordingLoader {
        &self.loader
    }

    pub fn title(&self) -> Option<&str> {
        self.app.title()
    }

    pub fn view(&self) -> Option<&ViewNode> {
        self.app.view()
    }

    pub fn displayed(&self) -> Option<&Instance> {
        self.app.displayed()
    }

    /// Run `f` on the displayed instance if it is a `T`.
    pub fn inspect<T: Component, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let shared = self.displayed()?.downcast::<T>()?;
        let target = shared.try_borrow().ok()?;
        Some(f(&*target))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
