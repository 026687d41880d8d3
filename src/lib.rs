//! # evbus
//!
//! **evbus** is a typed, in-process event dispatcher for Rust services.
//!
//! Producers publish plain values; every subscriber of that value's type tag
//! receives its own copy on a dedicated Tokio task. Delivery is asynchronous and
//! batched: a per-type flush loop wakes consumers on a fixed interval, so
//! publishing never waits on handlers and wakeups do not grow with publish rate.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producer A ──┐                     ┌────────────────────────────────┐
//!   producer B ──┼── publish(ev) ────► │ Dispatcher                     │
//!   producer N ──┘                     │  - Registry (type id → Group)  │
//!                                      │  - Config (flush interval)     │
//!                                      │  - shutdown token              │
//!                                      └──────────────┬─────────────────┘
//!                                                     ▼
//!                               ┌───────────────────────────────────────────┐
//!                               │ Group<T> (one per type id)                │
//!                               │  lock ─► [queue 1] [queue 2] ... [queue N]│
//!                               │  flush loop: tick ─► wake all consumers   │
//!                               └──────┬──────────────┬──────────────┬──────┘
//!                                      ▼              ▼              ▼
//!                                  consumer 1     consumer 2     consumer N
//!                                  swap queue,    swap queue,    swap queue,
//!                                  on_event(ev)   on_event(ev)   on_event(ev)
//! ```
//!
//! ### Guarantees
//! - **FIFO per subscriber**; no ordering across subscribers or types.
//! - **No replay**: a subscriber sees events published after it subscribed.
//! - **Bounded latency**: delivery within about one flush interval.
//! - **Unbounded queues**: a slow handler grows only its own queue.
//!
//! ## Features
//! | Area              | Description                                              | Key types / items                      |
//! |-------------------|----------------------------------------------------------|----------------------------------------|
//! | **Events**        | Type-tagged event contract and framework lifecycle event | [`Event`], [`FrameworkEvent`]          |
//! | **Dispatching**   | Subscribe, publish, cancel, close                        | [`Dispatcher`], [`Subscription`]       |
//! | **Handlers**      | Closures or async trait implementations                  | [`Handler`]                            |
//! | **Default bus**   | Process-wide dispatcher with `on` / `emit` wrappers      | [`global`]                             |
//! | **Errors**        | Typed wiring faults and configuration errors             | [`DispatchError`], [`ConfigError`]     |
//! | **Configuration** | Flush interval and queue sizing, env overrides           | [`Config`], [`DispatcherBuilder`]      |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a handler that traces every delivered event.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use evbus::{Dispatcher, Event, EventType};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Reading(u32);
//!
//! impl Event for Reading {
//!     const TYPE: EventType = 42;
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Dispatcher::builder()
//!         .flush_interval(Duration::from_millis(1))
//!         .build();
//!
//!     let seen = Arc::new(Mutex::new(Vec::new()));
//!     let sink = Arc::clone(&seen);
//!     let sub = bus.subscribe(move |ev: Reading| sink.lock().unwrap().push(ev.0));
//!
//!     bus.publish(Reading(1));
//!     bus.publish(Reading(2));
//!     bus.publish(Reading(3));
//!
//!     tokio::time::sleep(Duration::from_millis(20)).await;
//!     assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
//!
//!     sub.cancel();
//!     bus.close()?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod subscribers;

pub mod global;

// ---- Public re-exports ----

pub use crate::core::{Dispatcher, DispatcherBuilder, Subscription};
pub use config::{Config, MAX_QUEUE_CAPACITY, MIN_FLUSH_INTERVAL};
pub use error::{ConfigError, DispatchError};
pub use events::{Event, EventType, FrameworkEvent, FRAMEWORK_EVENT};
pub use subscribers::Handler;

// Optional: expose a tracing-backed handler.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
