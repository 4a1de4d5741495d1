//! Modals: components shown in their own window, outside the router.
//!
//! A modal is initialized and rendered standalone. It is not recorded in
//! history and not tracked as a main instance, so navigation leaves it
//! alone. Closing it destroys the component unless told otherwise.
//!
//! ```ignore
//! let mut confirm = app.show_modal(
//!     ModalBuilder::new(Instance::new(ConfirmDialog::default()))
//!         .with_params(Params::new().with("question", "Quit?".to_string())),
//! )?;
//! // ... hand confirm.view() to the windowing backend ...
//! confirm.close()?;
//! ```

use tracing::{debug, warn};

use crate::component::{Instance, ViewNode};
use crate::error::Result;
use crate::lifecycle::manager::WeakManager;
use crate::lifecycle::LifecycleManager;
use crate::params::{Params, Value};

/// Parameter carrying the instance a modal was opened from.
pub const OWNER_PARAM: &str = "owner";

// ---------------------------------------------------------------------------
// ModalBuilder
// ---------------------------------------------------------------------------

/// Configuration of a modal before it is opened.
pub struct ModalBuilder {
    instance: Instance,
    params: Params,
    owner: Option<Instance>,
    destroy_on_close: bool,
}

impl ModalBuilder {
    pub fn new(instance: Instance) -> Self {
        Self {
            instance,
            params: Params::new(),
            owner: None,
            destroy_on_close: true,
        }
    }

    /// Parameters for init and render (builder).
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// The instance the modal belongs to, passed as the `owner` parameter
    /// unless the parameters already carry one (builder).
    pub fn with_owner(mut self, owner: Instance) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Whether closing destroys the component (builder). Defaults to true.
    pub fn destroy_on_close(mut self, destroy: bool) -> Self {
        self.destroy_on_close = destroy;
        self
    }

    pub(crate) fn has_owner(&self) -> bool {
        self.owner.is_some()
    }

    /// Register, init and render the component, then resolve its title.
    ///
    /// If the title cannot be resolved the component is destroyed again and
    /// the error returned.
    pub fn open(self, manager: &LifecycleManager) -> Result<Modal> {
        let mut params = self.params;
        if let Some(owner) = self.owner {
            if !params.contains_key(OWNER_PARAM) {
                params = params.with_value(OWNER_PARAM, Value::new(owner));
            }
        }

        manager.register_instance(&self.instance)?;
        manager.init(&self.instance, &params)?;
        let view = manager.render(&self.instance, &params)?;
        let title = match manager.title(&self.instance) {
            Ok(title) => title,
            Err(err) => {
                if let Err(destroy_err) = manager.destroy(&self.instance) {
                    warn!(%destroy_err, "destroying modal after a title error failed");
                }
                return Err(err);
            }
        };
        debug!(component = %self.instance.type_info(), ?title, "modal opened");
        Ok(Modal {
            instance: self.instance,
            view,
            title,
            destroy_on_close: self.destroy_on_close,
            manager: manager.downgrade(),
            open: true,
        })
    }
}

// ---------------------------------------------------------------------------
// Modal
// ---------------------------------------------------------------------------

/// An open (or closed) modal.
pub struct Modal {
    instance: Instance,
    view: ViewNode,
    title: Option<String>,
    destroy_on_close: bool,
    manager: WeakManager,
    open: bool,
}

impl Modal {
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn view(&self) -> &ViewNode {
        &self.view
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub(crate) fn map_title(&mut self, f: impl FnOnce(&str) -> String) {
        self.title = self.title.as_deref().map(f);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn destroys_on_close(&self) -> bool {
        self.destroy_on_close
    }

    /// Close the modal, destroying the component if configured to. Returns
    /// false if it was already closed.
    pub fn close(&mut self) -> Result<bool> {
        if !self.open {
            return Ok(false);
        }
        self.open = false;
        if self.destroy_on_close {
            match self.manager.upgrade() {
                Some(manager) => manager.destroy(&self.instance)?,
                None => warn!(
                    component = %self.instance.type_info(),
                    "lifecycle manager is gone, modal component not destroyed"
                ),
            }
        }
        debug!(component = %self.instance.type_info(), "modal closed");
        Ok(true)
    }
}

impl std::fmt::Debug for Modal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modal")
            .field("instance", &self.instance)
            .field("title", &self.title)
            .field("open", &self.open)
            .field("destroy_on_close", &self.destroy_on_close)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
