//! # Process-wide default dispatcher.
//!
//! Convenience layer for call sites that do not carry their own [`Dispatcher`].
//! [`on`], [`on_type`], [`emit`] and [`close`] behave exactly like the
//! corresponding `Dispatcher` methods against one shared instance.
//!
//! ## Lifecycle
//! ```text
//! startup:   global::install(Dispatcher::builder()...build())   (optional)
//! anywhere:  global::on(handler) / global::emit(event)
//! shutdown:  global::close()
//! ```
//!
//! Without [`install`], the first use creates a dispatcher with the default
//! configuration; installing afterwards fails with
//! [`DispatchError::AlreadyInstalled`].

use std::sync::OnceLock;

use crate::core::{Dispatcher, Subscription};
use crate::error::DispatchError;
use crate::events::{Event, EventType};
use crate::subscribers::Handler;

static DEFAULT: OnceLock<Dispatcher> = OnceLock::new();

/// Installs `dispatcher` as the process-wide default.
pub fn install(dispatcher: Dispatcher) -> Result<(), DispatchError> {
    DEFAULT
        .set(dispatcher)
        .map_err(|_| DispatchError::AlreadyInstalled)
}

/// Returns the default dispatcher, creating it on first use.
pub fn dispatcher() -> &'static Dispatcher {
    DEFAULT.get_or_init(Dispatcher::new)
}

/// Subscribes to `T` on the default dispatcher. See [`Dispatcher::subscribe`].
///
/// # Panics
/// Same conditions as [`Dispatcher::subscribe`].
pub fn on<T, H>(handler: H) -> Subscription
where
    T: Event,
    H: Handler<T>,
{
    dispatcher().subscribe(handler)
}

/// Subscribes to `T` under an explicit type id on the default dispatcher.
/// See [`Dispatcher::subscribe_to`].
///
/// # Panics
/// Same conditions as [`Dispatcher::subscribe`].
pub fn on_type<T, H>(event_type: EventType, handler: H) -> Subscription
where
    T: Event,
    H: Handler<T>,
{
    dispatcher().subscribe_to(event_type, handler)
}

/// Publishes `event` on the default dispatcher. See [`Dispatcher::publish`].
pub fn emit<T: Event>(event: T) {
    dispatcher().publish(event)
}

/// Closes the default dispatcher. See [`Dispatcher::close`].
pub fn close() -> Result<(), DispatchError> {
    dispatcher().close()
}
