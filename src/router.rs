//! Router: route registration, navigation, history replay.
//!
//! The router owns its route tree (and the tree's cursor), the navigation
//! history and the lifecycle manager. Every navigation destroys whatever was
//! displayed before, then initializes and renders the new main instance.
//!
//! ```ignore
//! struct AppRoutes;
//!
//! impl Routes for AppRoutes {
//!     fn routes(&self) -> Vec<RouteDecl> {
//!         vec![
//!             RouteDecl::new("home", Provider::of::<HomeController>()),
//!             RouteDecl::new("settings", Provider::of::<SettingsController>())
//!                 .with_path("/home/settings"),
//!         ]
//!     }
//! }
//!
//! let mut router = Router::new(FrameworkConfig::from_env())?;
//! router.register_routes(&AppRoutes)?;
//! let rendered = router.render_route("/home", Params::new().with("user", 7))?;
//! ```

use std::any::type_name;
use std::rc::Rc;

use tracing::debug;

use crate::component::{Instance, Provider, TemplateLoader, ViewNode};
use crate::config::FrameworkConfig;
use crate::error::{ConfigError, Error, HistoryError, Result};
use crate::history::HistoryQueue;
use crate::lifecycle::LifecycleManager;
use crate::params::Params;
use crate::route::node::is_absolute;
use crate::route::{RouteNodeId, RouteTree};

// ---------------------------------------------------------------------------
// Route declarations
// ---------------------------------------------------------------------------

/// A route: an absolute path bound to a provider.
#[derive(Debug, Clone)]
pub struct RouteDecl {
    path: String,
    provider: Provider,
}

impl RouteDecl {
    /// A route at `/<name>`.
    pub fn new(name: &str, provider: Provider) -> Self {
        Self {
            path: absolute(name),
            provider,
        }
    }

    /// Bind to an explicit path instead (builder). A missing leading `/` is
    /// added.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = absolute(path);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }
}

fn absolute(path: &str) -> String {
    if is_absolute(path) {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// A set of routes, registered in one go with
/// [`Router::register_routes`].
pub trait Routes: 'static {
    fn routes(&self) -> Vec<RouteDecl>;
}

// ---------------------------------------------------------------------------
// History entries
// ---------------------------------------------------------------------------

/// What a history entry navigates to.
#[derive(Debug, Clone)]
pub enum HistoryTarget {
    /// A route node; replay asks its provider for an instance again.
    Route(RouteNodeId),
    /// An instance shown directly; replay shows it again.
    Instance(Instance),
}

/// One navigation: its target and the parameters it was made with.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub target: HistoryTarget,
    pub params: Params,
}

/// A displayed main instance and its view.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub instance: Instance,
    pub view: ViewNode,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Navigation entry point.
pub struct Router {
    tree: RouteTree<Provider>,
    history: HistoryQueue<HistoryEntry>,
    manager: LifecycleManager,
    routes_owner: Option<&'static str>,
    displayed: Option<Instance>,
}

impl Router {
    /// A router with no routes.
    ///
    /// Fails if `config.history_size` is zero.
    pub fn new(config: FrameworkConfig) -> Result<Self> {
        let history = HistoryQueue::new(config.history_size)?;
        Ok(Self {
            tree: RouteTree::new(),
            history,
            manager: LifecycleManager::new(config),
            routes_owner: None,
            displayed: None,
        })
    }

    /// Install the template loader (builder).
    pub fn with_template_loader(self, loader: Rc<dyn TemplateLoader>) -> Self {
        self.manager.set_template_loader(loader);
        self
    }

    pub fn manager(&self) -> &LifecycleManager {
        &self.manager
    }

    pub fn tree(&self) -> &RouteTree<Provider> {
        &self.tree
    }

    pub fn history(&self) -> &HistoryQueue<HistoryEntry> {
        &self.history
    }

    /// The main instance currently displayed.
    pub fn displayed(&self) -> Option<&Instance> {
        self.displayed.as_ref()
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register every route of `routes`. A router accepts a single routes
    /// object.
    pub fn register_routes<R: Routes>(&mut self, routes: &R) -> Result<(), ConfigError> {
        if let Some(owner) = self.routes_owner {
            return Err(ConfigError::RoutesAlreadyRegistered {
                owner: owner.to_string(),
            });
        }
        self.routes_owner = Some(type_name::<R>());
        for decl in routes.routes() {
            self.register_route(&decl.path, decl.provider)?;
        }
        Ok(())
    }

    /// Bind `provider` to `path` and register its declared type.
    pub fn register_route(
        &mut self,
        path: &str,
        provider: Provider,
    ) -> Result<RouteNodeId, ConfigError> {
        let path = absolute(path);
        if let Some(existing) = self.tree.get(&path) {
            return Err(ConfigError::DuplicateRoute {
                path,
                existing: existing.declared_type().to_string(),
                new: provider.declared_type().to_string(),
            });
        }
        provider.register(&self.manager)?;
        let id = self.tree.insert(&path, provider)?;
        debug!(route = path.as_str(), "route registered");
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Navigate to `path`, relative to the current route unless absolute.
    ///
    /// Resolution failures leave the cursor and the history untouched.
    pub fn render_route(&mut self, path: &str, params: Params) -> Result<Rendered> {
        let id = self.resolve(path)?;
        let instance = self.instance_at(id, path)?;
        self.tree.set_current(id);
        self.history.insert(HistoryEntry {
            target: HistoryTarget::Route(id),
            params: params.clone(),
        });
        debug!(route = path, component = %instance.type_info(), "navigating");
        self.display(instance, &params)
    }

    /// Display `instance` directly, recording it in the history.
    pub fn show_instance(&mut self, instance: Instance, params: Params) -> Result<Rendered> {
        self.manager.register_instance(&instance)?;
        self.history.insert(HistoryEntry {
            target: HistoryTarget::Instance(instance.clone()),
            params: params.clone(),
        });
        debug!(component = %instance.type_info(), "showing instance");
        self.display(instance, &params)
    }

    /// Replay the previous history entry. `Ok(None)` if there is none.
    pub fn back(&mut self) -> Result<Option<Rendered>> {
        let moved = self.history.back().map(|_| ());
        self.replay_after(moved)
    }

    /// Replay the next history entry. `Ok(None)` if there is none.
    pub fn forward(&mut self) -> Result<Option<Rendered>> {
        let moved = self.history.forward().map(|_| ());
        self.replay_after(moved)
    }

    /// Destroy and re-display the displayed instance with the parameters of
    /// the current history entry. The history does not move.
    pub fn refresh(&mut self) -> Result<Option<Rendered>> {
        let Some(instance) = self.displayed.clone() else {
            return Ok(None);
        };
        let params = match self.history.current() {
            Ok(entry) => entry.params.clone(),
            Err(HistoryError::Empty) => Params::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(component = %instance.type_info(), "refreshing");
        self.display(instance, &params).map(Some)
    }

    /// The entry at the history's current index.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.history.current().ok()
    }

    /// An instance for `path` from its provider, without running any
    /// lifecycle phase.
    pub fn get_instance(&self, path: &str) -> Result<Instance> {
        let path = absolute(path);
        let id = self.resolve(&path)?;
        self.instance_at(id, &path)
    }

    /// Change the history capacity.
    pub fn set_history_size(&mut self, size: usize) -> Result<(), HistoryError> {
        self.history.set_capacity(size)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn resolve(&self, path: &str) -> Result<RouteNodeId> {
        match self.tree.find(path) {
            Some(id) if self.tree.value(id).is_some() => Ok(id),
            _ => {
                let hint = Some(absolute(path))
                    .filter(|candidate| candidate != path && self.tree.contains_path(candidate));
                Err(Error::RouteNotFound {
                    path: path.to_string(),
                    hint,
                })
            }
        }
    }

    fn instance_at(&self, id: RouteNodeId, path: &str) -> Result<Instance> {
        let Some(provider) = self.tree.value(id) else {
            return Err(Error::RouteNotFound {
                path: path.to_string(),
                hint: None,
            });
        };
        let instance = provider.get();
        if instance.type_info() != provider.declared_type() {
            return Err(Error::ProviderMismatch {
                path: self.tree.path_of(id),
                declared: provider.declared_type().to_string(),
                produced: instance.type_info().to_string(),
            });
        }
        Ok(instance)
    }

    fn replay_after(&mut self, moved: Result<(), HistoryError>) -> Result<Option<Rendered>> {
        match moved {
            Ok(()) => self.replay().map(Some),
            Err(err) if err.is_bounds() => {
                debug!(%err, "history replay skipped");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn replay(&mut self) -> Result<Rendered> {
        let entry = self.history.current()?.clone();
        let instance = match entry.target {
            HistoryTarget::Route(id) => {
                self.tree.set_current(id);
                let path = self.tree.path_of(id);
                self.instance_at(id, &path)?
            }
            HistoryTarget::Instance(instance) => instance,
        };
        debug!(component = %instance.type_info(), "replaying history entry");
        self.display(instance, &entry.params)
    }

    fn display(&mut self, instance: Instance, params: &Params) -> Result<Rendered> {
        self.manager.cleanup()?;
        self.displayed = None;
        let view = self.manager.init_and_render(&instance, params)?;
        self.displayed = Some(instance.clone());
        Ok(Rendered { instance, view })
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.tree.paths())
            .field("history", &self.history.len())
            .field("displayed", &self.displayed)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
