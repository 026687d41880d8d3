//! Event contract.
//!
//! ## Contents
//! - [`Event`] capability trait (type tag per concrete kind)
//! - [`EventType`] tag alias
//! - [`FrameworkEvent`] built-in lifecycle event (tag [`FRAMEWORK_EVENT`])

mod event;

pub use event::{Event, EventType, FrameworkEvent, FRAMEWORK_EVENT};
