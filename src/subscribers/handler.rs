//! # Event handler trait.
//!
//! Provides [`Handler`] the callback a consumer invokes for every delivered event.
//!
//! Each subscription gets:
//! - **Dedicated consumer task** (runs independently)
//! - **Private unbounded queue** (drained in batches on every group flush)
//! - **Sequential delivery** (one `on_event` at a time, FIFO)
//!
//! ## Architecture
//! ```text
//! Group ──► [consumer queue] ──► consumer task ──► handler.on_event(ev)
//!                                              └─► panic → logged, consumer detached
//! ```
//!
//! ## Rules
//! - A slow handler only grows its own queue.
//! - Handlers may publish (reentrancy is safe; the lock is not held).
//! - Any `Fn(T) + Send + Sync + 'static` closure is a handler. Closures are
//!   synchronous, so they run on Tokio's blocking pool and may block.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use evbus::{Event, EventType, Handler};
//!
//! #[derive(Clone)]
//! struct Tick(u64);
//!
//! impl Event for Tick {
//!     const TYPE: EventType = 1;
//! }
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Handler<Tick> for Audit {
//!     async fn on_event(&self, ev: Tick) {
//!         let _ = ev.0; // write to an audit sink, etc.
//!     }
//!
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event handler invoked by a consumer task.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor unless [`is_blocking`](Self::is_blocking) says so.
/// - Handle errors internally; a panic detaches the consumer.
#[async_trait]
pub trait Handler<T: Event>: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the consumer task, never in the publisher context.
    async fn on_event(&self, event: T);

    /// Returns the handler name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns true if `on_event` blocks the calling thread.
    ///
    /// Blocking handlers are driven on Tokio's blocking pool, one batch at a time,
    /// and their `on_event` future must complete without awaiting Tokio resources.
    fn is_blocking(&self) -> bool {
        false
    }
}

#[async_trait]
impl<T, F> Handler<T> for F
where
    T: Event,
    F: Fn(T) + Send + Sync + 'static,
{
    async fn on_event(&self, event: T) {
        (self)(event)
    }

    fn is_blocking(&self) -> bool {
        true
    }
}
