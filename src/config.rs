//! Framework configuration.

use std::fmt;
use std::rc::Rc;

use crate::component::ResourceBundle;

/// Environment variable enabling development mode when set to `true`
/// (any case).
pub const DEV_MODE_ENV: &str = "INDEV";

/// Configuration shared by the router and the lifecycle manager.
#[derive(Clone)]
pub struct FrameworkConfig {
    /// Capacity of the navigation history.
    pub history_size: usize,
    /// Enables diagnostics such as undisposed-subscriber warnings.
    pub dev_mode: bool,
    /// Extension appended to derived default template names.
    pub template_extension: String,
    /// Bundle used when a component declares none.
    pub default_resources: Option<Rc<dyn ResourceBundle>>,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            history_size: 5,
            dev_mode: false,
            template_extension: "view".to_string(),
            default_resources: None,
        }
    }
}

impl FrameworkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with `dev_mode` read from [`DEV_MODE_ENV`].
    pub fn from_env() -> Self {
        let dev_mode = std::env::var(DEV_MODE_ENV)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        Self::default().with_dev_mode(dev_mode)
    }

    /// Set the history capacity (builder). Values below one are clamped.
    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size.max(1);
        self
    }

    /// Set development mode (builder).
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Set the default template extension (builder).
    pub fn with_template_extension(mut self, extension: impl Into<String>) -> Self {
        self.template_extension = extension.into();
        self
    }

    /// Set the fallback resource bundle (builder).
    pub fn with_default_resources(mut self, bundle: impl ResourceBundle + 'static) -> Self {
        self.default_resources = Some(Rc::new(bundle));
        self
    }
}

impl fmt::Debug for FrameworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameworkConfig")
            .field("history_size", &self.history_size)
            .field("dev_mode", &self.dev_mode)
            .field("template_extension", &self.template_extension)
            .field("default_resources", &self.default_resources.is_some())
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

// ===========================================================================
// Tests
// ===========================================================================
