//! # Dispatcher: type-routed publish/subscribe with batched delivery.
//!
//! The [`Dispatcher`] owns the group registry, the configuration and the
//! shutdown signal shared by every group it creates.
//!
//! ## Architecture
//! ```text
//! subscribe::<T>(handler)
//!     └─► registry.get_or_create(T::TYPE)
//!            ├─ no live flush loop ──► spawn group.flush(interval, shutdown)
//!            └─ group.add(handler) ──► spawn consumer::listen(...)    (once per subscription)
//!
//! publish(ev)
//!     └─► registry.get(ev.event_type())
//!            ├─ none     ──► dropped (no subscribers yet)
//!            └─ group.broadcast(ev) ──► consumer queues               (returns immediately)
//!
//! close()
//!     └─► shutdown.cancel() ──► every flush loop exits, idle consumers exit
//! ```
//!
//! ## Rules
//! - **Fatal wiring faults**: `subscribe*` panics on a closed dispatcher or on a
//!   type-conflict; use `try_subscribe*` to get a [`DispatchError`] instead.
//! - **Publish never fails**: no group, a closed dispatcher or a kind mismatch
//!   all drop the event.
//! - **One-shot close**: the second `close()` returns [`DispatchError::Closed`].
//! - Dropping the last handle stops the flush loops, but a handler that
//!   captured a clone keeps the dispatcher alive: call `close()` to shut down.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use evbus::{Dispatcher, Event, EventType};
//!
//! #[derive(Clone, Debug)]
//! struct OrderPlaced(u64);
//!
//! impl Event for OrderPlaced {
//!     const TYPE: EventType = 0x20;
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = Dispatcher::builder()
//!         .flush_interval(Duration::from_millis(1))
//!         .build();
//!
//!     let sub = bus.subscribe(|ev: OrderPlaced| println!("order {}", ev.0));
//!     bus.publish(OrderPlaced(1));
//!
//!     tokio::time::sleep(Duration::from_millis(10)).await;
//!     sub.cancel();
//!     bus.close().expect("closed once");
//! }
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use super::builder::DispatcherBuilder;
use super::group::Group;
use super::registry::Registry;
use super::subscription::Subscription;
use crate::config::Config;
use crate::error::DispatchError;
use crate::events::{Event, EventType};
use crate::subscribers::Handler;

/// In-process event dispatcher.
///
/// Cheap to clone; clones share the same registry and lifecycle.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    cfg: Config,
    registry: Registry,
    shutdown: CancellationToken,
    closed: AtomicBool,
    runtime: Option<Handle>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl Dispatcher {
    /// Creates a dispatcher with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a dispatcher with the given configuration.
    pub fn with_config(cfg: Config) -> Self {
        Self::from_parts(cfg, None)
    }

    /// Returns a builder starting from the default configuration.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new(Config::default())
    }

    pub(crate) fn from_parts(cfg: Config, runtime: Option<Handle>) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                registry: Registry::new(),
                shutdown: CancellationToken::new(),
                closed: AtomicBool::new(false),
                runtime,
            }),
        }
    }

    /// Subscribes `handler` to events of kind `T`, routed by `T::TYPE`.
    ///
    /// # Panics
    /// If the dispatcher is closed, if `T::TYPE` is bound to another event kind,
    /// or if no Tokio runtime is available.
    pub fn subscribe<T, H>(&self, handler: H) -> Subscription
    where
        T: Event,
        H: Handler<T>,
    {
        self.subscribe_to(T::TYPE, handler)
    }

    /// Subscribes `handler` to events of kind `T` published under `event_type`.
    ///
    /// # Panics
    /// Same conditions as [`subscribe`](Self::subscribe).
    pub fn subscribe_to<T, H>(&self, event_type: EventType, handler: H) -> Subscription
    where
        T: Event,
        H: Handler<T>,
    {
        match self.try_subscribe_to(event_type, handler) {
            Ok(sub) => sub,
            Err(err) => panic!("{err}"),
        }
    }

    /// Non-panicking form of [`subscribe`](Self::subscribe).
    pub fn try_subscribe<T, H>(&self, handler: H) -> Result<Subscription, DispatchError>
    where
        T: Event,
        H: Handler<T>,
    {
        self.try_subscribe_to(T::TYPE, handler)
    }

    /// Non-panicking form of [`subscribe_to`](Self::subscribe_to).
    ///
    /// Creates the group for `event_type` on first use and starts its flush
    /// loop (again, if the runtime that ran it is gone), then spawns a consumer
    /// task for `handler`.
    pub fn try_subscribe_to<T, H>(
        &self,
        event_type: EventType,
        handler: H,
    ) -> Result<Subscription, DispatchError>
    where
        T: Event,
        H: Handler<T>,
    {
        if self.is_closed() {
            return Err(DispatchError::Closed);
        }
        let runtime = self.runtime()?;

        let capacity = self.inner.cfg.queue_capacity_clamped();
        let (group, created) = self
            .inner
            .registry
            .get_or_create::<T, _>(event_type, || Group::new(event_type, capacity))
            .inspect_err(|err| tracing::warn!(error = %err, "subscription rejected"))?;

        let interval = self.inner.cfg.flush_interval_clamped();
        if group.ensure_flush(&runtime, interval, self.inner.shutdown.clone()) {
            tracing::debug!(
                event_type,
                kind = type_name::<T>(),
                flush_interval = ?interval,
                created,
                "group flush loop started"
            );
        }

        let handler: Arc<dyn Handler<T>> = Arc::new(handler);
        let name = handler.name();
        let id = group.add(handler, &runtime, self.inner.shutdown.clone());
        tracing::debug!(event_type, consumer = id, handler = name, "subscribed");

        Ok(Subscription::new(event_type, id, group))
    }

    /// Queues `event` for every current subscriber of `event.event_type()`.
    ///
    /// Returns immediately; delivery happens on the consumer tasks within
    /// about one flush interval.
    pub fn publish<T: Event>(&self, event: T) {
        let event_type = event.event_type();
        if self.is_closed() {
            tracing::trace!(event_type, "dispatcher closed; event dropped");
            return;
        }

        match self.inner.registry.get::<T>(event_type) {
            Some(Ok(group)) => group.broadcast(event),
            Some(Err(err)) => tracing::warn!(error = %err, "event dropped"),
            None => tracing::trace!(event_type, "no subscribers; event dropped"),
        }
    }

    /// Stops every group's flush loop. Does not wait for queued events.
    ///
    /// Returns [`DispatchError::Closed`] if the dispatcher was already closed.
    pub fn close(&self) -> Result<(), DispatchError> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Err(DispatchError::Closed);
        }
        self.inner.shutdown.cancel();
        tracing::debug!(groups = self.inner.registry.len(), "event dispatcher closed");
        Ok(())
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Number of live subscribers for `event_type`.
    pub fn subscriber_count(&self, event_type: EventType) -> usize {
        self.inner.registry.count(event_type)
    }

    /// Effective flush interval (after clamping).
    pub fn flush_interval(&self) -> Duration {
        self.inner.cfg.flush_interval_clamped()
    }

    fn runtime(&self) -> Result<Handle, DispatchError> {
        match &self.inner.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|_| DispatchError::NoRuntime),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("flush_interval", &self.inner.cfg.flush_interval_clamped())
            .field("groups", &self.inner.registry.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
