//! # Tracing handler for debugging and demos.
//!
//! [`LogWriter`] records every delivered event through `tracing::info!`.
//!
//! ## Output format
//! ```text
//! INFO evbus::subscribers::log: event delivered event_type=0 event=Started
//! ```
//!
//! ## Example
//! ```no_run
//! # #[tokio::main]
//! # async fn main() {
//! use evbus::{Dispatcher, FrameworkEvent, LogWriter};
//!
//! let bus = Dispatcher::new();
//! let _sub = bus.subscribe::<FrameworkEvent, _>(LogWriter);
//! bus.publish(FrameworkEvent::Started);
//! # }
//! ```

use std::fmt::Debug;

use async_trait::async_trait;

use crate::events::Event;
use crate::subscribers::Handler;

/// Handler that logs every event it receives.
///
/// Enabled via the `logging` feature. Not intended for production use -
/// implement a custom [`Handler`] for structured auditing or metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogWriter;

#[async_trait]
impl<T> Handler<T> for LogWriter
where
    T: Event + Debug,
{
    async fn on_event(&self, event: T) {
        tracing::info!(event_type = event.event_type(), event = ?event, "event delivered");
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
