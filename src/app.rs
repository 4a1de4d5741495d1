//! App shell: what is displayed, the window title, key input, hot reload.
//!
//! [`App`] wraps a [`Router`] and keeps the state a window needs: the view
//! of the displayed main instance and its formatted title. It has no
//! windowing backend of its own; the embedding toolkit reads
//! [`view`](App::view) and [`title`](App::title) after each navigation.

use std::rc::Rc;

use tracing::{debug, info};

use crate::component::{Instance, ResourceBundle, TemplateLoader, ViewNode};
use crate::config::FrameworkConfig;
use crate::error::{ConfigError, HistoryError, Result};
use crate::event::KeyEvent;
use crate::modal::{Modal, ModalBuilder};
use crate::params::Params;
use crate::reload::{RefreshQueue, RefreshTrigger};
use crate::router::{Rendered, Router, Routes};

type TitlePattern = Box<dyn Fn(&str) -> String>;

/// The application shell.
pub struct App {
    router: Router,
    title_pattern: TitlePattern,
    view: Option<ViewNode>,
    title: Option<String>,
    reload: RefreshQueue,
}

impl App {
    /// Create an app. Fails if `config.history_size` is zero.
    pub fn new(config: FrameworkConfig) -> Result<Self> {
        Ok(Self {
            router: Router::new(config)?,
            title_pattern: Box::new(|title: &str| title.to_string()),
            view: None,
            title: None,
            reload: RefreshQueue::new(),
        })
    }

    /// Install the template loader (builder).
    pub fn with_template_loader(self, loader: Rc<dyn TemplateLoader>) -> Self {
        self.router.manager().set_template_loader(loader);
        self
    }

    /// Format resolved titles before they are applied (builder).
    pub fn with_title_pattern(mut self, pattern: impl Fn(&str) -> String + 'static) -> Self {
        self.set_title_pattern(pattern);
        self
    }

    pub fn set_title_pattern(&mut self, pattern: impl Fn(&str) -> String + 'static) {
        self.title_pattern = Box::new(pattern);
    }

    pub fn register_routes<R: Routes>(&mut self, routes: &R) -> Result<(), ConfigError> {
        self.router.register_routes(routes)
    }

    pub fn set_default_resources(&self, bundle: Option<Rc<dyn ResourceBundle>>) {
        self.router.manager().set_default_resources(bundle);
    }

    pub fn set_history_size(&mut self, size: usize) -> Result<(), HistoryError> {
        self.router.set_history_size(size)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Display the route at `path`.
    pub fn show(&mut self, path: &str, params: Params) -> Result<&ViewNode> {
        let rendered = self.router.render_route(path, params)?;
        self.present(rendered)
    }

    /// Display `instance` directly.
    pub fn show_instance(&mut self, instance: Instance, params: Params) -> Result<&ViewNode> {
        let rendered = self.router.show_instance(instance, params)?;
        self.present(rendered)
    }

    /// Go back one history entry. Returns whether anything changed.
    pub fn back(&mut self) -> Result<bool> {
        let rendered = self.router.back()?;
        self.present_if_some(rendered)
    }

    /// Go forward one history entry. Returns whether anything changed.
    pub fn forward(&mut self) -> Result<bool> {
        let rendered = self.router.forward()?;
        self.present_if_some(rendered)
    }

    /// Re-run the lifecycle of the displayed instance with its current
    /// parameters. Returns whether anything was displayed.
    pub fn refresh(&mut self) -> Result<bool> {
        let rendered = self.router.refresh()?;
        self.present_if_some(rendered)
    }

    fn present_if_some(&mut self, rendered: Option<Rendered>) -> Result<bool> {
        match rendered {
            Some(rendered) => self.present(rendered).map(|_| true),
            None => Ok(false),
        }
    }

    /// The router has committed by now, so the view is stored before the
    /// title is resolved. A title error leaves the previous title in place.
    fn present(&mut self, rendered: Rendered) -> Result<&ViewNode> {
        let view = self.view.insert(rendered.view);
        if let Some(title) = self.router.manager().title(&rendered.instance)? {
            self.title = Some((self.title_pattern)(&title));
        }
        debug!(component = %rendered.instance.type_info(), title = ?self.title, "displayed");
        Ok(&*view)
    }

    // -----------------------------------------------------------------------
    // Modals
    // -----------------------------------------------------------------------

    /// Open a modal. The displayed instance becomes its owner unless one was
    /// set, and its title goes through the title pattern.
    pub fn show_modal(&self, builder: ModalBuilder) -> Result<Modal> {
        let builder = match self.displayed() {
            Some(displayed) if !builder.has_owner() => builder.with_owner(displayed.clone()),
            _ => builder,
        };
        let mut modal = builder.open(self.router.manager())?;
        modal.map_title(|title| (self.title_pattern)(title));
        Ok(modal)
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    /// The displayed main instance.
    pub fn displayed(&self) -> Option<&Instance> {
        self.router.displayed()
    }

    /// The view of the displayed main instance.
    pub fn view(&self) -> Option<&ViewNode> {
        self.view.as_ref()
    }

    /// The formatted window title. Kept from the previous display when the
    /// current instance declares none.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Apply the title pattern to `title`.
    pub fn format_title(&self, title: &str) -> String {
        (self.title_pattern)(title)
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Route a key event to the handlers of rendered instances. Returns how
    /// many handlers ran.
    pub fn dispatch_key(&self, event: &KeyEvent) -> usize {
        self.router.manager().dispatch_key(event)
    }

    /// Convert and route a crossterm key event.
    pub fn handle_crossterm_key(&self, event: crossterm::event::KeyEvent) -> usize {
        match KeyEvent::from_crossterm(event) {
            Some(event) => self.dispatch_key(&event),
            None => 0,
        }
    }

    // -----------------------------------------------------------------------
    // Hot reload
    // -----------------------------------------------------------------------

    /// A trigger for a file watcher running on another thread.
    pub fn refresh_trigger(&self) -> RefreshTrigger {
        self.reload.trigger()
    }

    /// Handle pending refresh requests with at most one refresh. Returns
    /// whether a refresh ran.
    pub fn process_refresh_requests(&mut self) -> Result<bool> {
        let pending = self.reload.drain();
        if pending.is_empty() {
            return Ok(false);
        }
        let sources: Vec<&str> = pending.iter().map(|r| r.source.as_str()).collect();
        info!(?sources, "hot reload: refreshing displayed component");
        self.refresh()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("router", &self.router)
            .field("title", &self.title)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, Descriptor, Provider};
    use crate::error::Error;
    use crate::event::{Key, KeyMatch, Modifiers};
    use crate::router::RouteDecl;
    use crate::testing::RecordingLoader;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct CounterController {
        count: i32,
        renders: Rc<Cell<u32>>,
    }

    impl Component for CounterController {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::controller()
                .title("Counter")
                .param("count", |c: &mut Self, v: i32| c.count = v)
                .on_render("count_renders", 0, |c, _| c.renders.set(c.renders.get() + 1))
                .on_key("increment", KeyMatch::character('+'), |c, _| c.count += 1)
        }
    }

    #[derive(Default)]
    struct AboutController;

    impl Component for AboutController {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::controller().title("$name")
        }
    }

    struct Untitled;

    impl Component for Untitled {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::component()
        }
    }

    struct AppRoutes;

    impl Routes for AppRoutes {
        fn routes(&self) -> Vec<RouteDecl> {
            vec![
                RouteDecl::new("counter", Provider::of::<CounterController>()),
                RouteDecl::new("about", Provider::of::<AboutController>()),
            ]
        }
    }

    fn app() -> App {
        let mut app = App::new(FrameworkConfig::new())
            .unwrap()
            .with_template_loader(Rc::new(RecordingLoader::new()))
            .with_title_pattern(|t| format!("{t} - Demo"));
        app.register_routes(&AppRoutes).unwrap();
        app
    }

    fn count(app: &App) -> i32 {
        let counter = app.displayed().unwrap().downcast::<CounterController>().unwrap();
        let count = counter.borrow().count;
        count
    }

    #[test]
    fn show_sets_view_and_title() {
        let mut app = app();
        let view = app.show("/counter", Params::new()).unwrap();
        assert_eq!(view.name(), "Counter.view");
        assert_eq!(app.title(), Some("Counter - Demo"));

        app.show("about", Params::new()).unwrap();
        assert_eq!(app.title(), Some("About - Demo"));
        assert_eq!(app.format_title("x"), "x - Demo");
    }

    #[test]
    fn untitled_instance_keeps_previous_title() {
        let mut app = app();
        app.show("/about", Params::new()).unwrap();
        app.show_instance(Instance::new(Untitled), Params::new())
            .unwrap();
        assert_eq!(app.title(), Some("About - Demo"));
        assert_eq!(app.view().map(ViewNode::name), Some("Untitled"));
    }

    #[derive(Default)]
    struct LocalizedController;

    impl Component for LocalizedController {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::controller().title("%missing")
        }
    }

    #[test]
    fn title_error_keeps_view_in_step_with_router() {
        let mut app = app();
        app.router_mut()
            .register_route("/localized", Provider::of::<LocalizedController>())
            .unwrap();
        app.show("/about", Params::new()).unwrap();

        let err = app.show("/localized", Params::new()).unwrap_err();
        assert!(matches!(err, Error::MissingResourceBundle { .. }));
        assert!(app.displayed().unwrap().is::<LocalizedController>());
        assert_eq!(app.view().map(ViewNode::name), Some("Localized.view"));
        assert_eq!(app.title(), Some("About - Demo"));
        assert_eq!(app.router().history().len(), 2);

        assert!(app.back().unwrap());
        assert_eq!(app.view().map(ViewNode::name), Some("About.view"));
    }

    #[derive(Default)]
    struct ConfirmDialog {
        owner: Option<Instance>,
        destroyed: Rc<Cell<u32>>,
    }

    impl Component for ConfirmDialog {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::<Self>::component()
                .title("Confirm")
                .param_nullable("owner", |d: &mut Self, v: Option<Instance>| d.owner = v)
                .on_destroy("count", 0, |d| d.destroyed.set(d.destroyed.get() + 1))
        }
    }

    #[test]
    fn modals_live_outside_navigation() {
        let mut app = app();
        app.show("/counter", Params::new()).unwrap();
        let destroyed = Rc::new(Cell::new(0));
        let dialog = Rc::new(RefCell::new(ConfirmDialog {
            owner: None,
            destroyed: Rc::clone(&destroyed),
        }));

        let mut modal = app
            .show_modal(ModalBuilder::new(Instance::from_shared(Rc::clone(&dialog))))
            .unwrap();
        assert_eq!(modal.title(), Some("Confirm - Demo"));
        assert_eq!(app.title(), Some("Counter - Demo"));
        let owner = dialog.borrow().owner.clone().unwrap();
        assert!(owner.is::<CounterController>());

        app.show("/about", Params::new()).unwrap();
        assert_eq!(destroyed.get(), 0);
        assert!(modal.close().unwrap());
        assert_eq!(destroyed.get(), 1);
    }

    #[test]
    fn back_forward_report_changes() {
        let mut app = app();
        assert!(!app.back().unwrap());
        app.show("/counter", Params::new().with("count", 1)).unwrap();
        app.show("/about", Params::new()).unwrap();
        assert!(app.back().unwrap());
        assert_eq!(count(&app), 1);
        assert!(!app.back().unwrap());
        assert!(app.forward().unwrap());
        assert!(app.displayed().unwrap().is::<AboutController>());
    }

    #[test]
    fn keys_reach_the_displayed_instance() {
        let mut app = app();
        app.show("/counter", Params::new().with("count", 10)).unwrap();
        let plus = KeyEvent::new(Key::Char('+'), Modifiers::NONE);
        assert_eq!(app.dispatch_key(&plus), 1);
        assert_eq!(app.dispatch_key(&plus), 1);
        assert_eq!(count(&app), 12);

        let ct = crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('+'),
            crossterm::event::KeyModifiers::NONE,
        );
        assert_eq!(app.handle_crossterm_key(ct), 1);
        assert_eq!(count(&app), 13);

        // Handlers of destroyed instances are gone.
        app.show("/about", Params::new()).unwrap();
        assert_eq!(app.dispatch_key(&plus), 0);
    }

    #[test]
    fn refresh_requests_coalesce() {
        let renders = Rc::new(Cell::new(0));
        let mut app = app();
        let counter = CounterController {
            count: 0,
            renders: Rc::clone(&renders),
        };
        app.show_instance(Instance::new(counter), Params::new().with("count", 3))
            .unwrap();
        assert_eq!(renders.get(), 1);

        assert!(!app.process_refresh_requests().unwrap());
        let trigger = app.refresh_trigger();
        trigger.request("Counter.view");
        trigger.request("Counter.view");
        trigger.request("counter.css");
        assert!(app.process_refresh_requests().unwrap());
        assert_eq!(renders.get(), 2);
        assert_eq!(count(&app), 3);
        assert!(!app.process_refresh_requests().unwrap());
    }
}
