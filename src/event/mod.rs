//! Key events and the key-handler registry.

pub mod binding;
pub mod input;

pub use binding::{KeyHandlerRegistry, KeyMatch};
pub use input::{Key, KeyEvent, KeyEventKind, Modifiers};
