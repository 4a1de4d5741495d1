//! Headless testing helpers: a recording template loader, a log capture and
//! the Pilot.
//!
//! Use [`RecordingLoader`] wherever a [`TemplateLoader`](crate::component::TemplateLoader)
//! is needed and the produced views only have to be identifiable. Use
//! [`LogCapture`] to assert on logged warnings. Use the [`Pilot`] to drive a
//! whole [`App`](crate::app::App) from a test.

pub mod loader;
pub mod logs;
pub mod pilot;

pub use loader::{LoadRecord, RecordingLoader};
pub use logs::{CapturedEvent, LogCapture};
pub use pilot::Pilot;
