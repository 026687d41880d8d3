//! # Event handlers.
//!
//! This module provides the [`Handler`] trait implemented by every subscriber
//! and, behind the `logging` feature, the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! publish(ev) ──► Group ──► consumer queue ──► Handler::on_event(ev)
//!                                                   │
//!                                        ┌──────────┼──────────┐
//!                                        ▼          ▼          ▼
//!                                    closure    LogWriter    custom
//! ```

mod handler;
#[cfg(feature = "logging")]
mod log;

pub use handler::Handler;
#[cfg(feature = "logging")]
pub use log::LogWriter;
