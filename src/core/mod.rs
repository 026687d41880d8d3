//! Dispatcher core: registry, groups and consumers.
//!
//! The public API from this module is [`Dispatcher`], its [`DispatcherBuilder`]
//! and the [`Subscription`] handle.
//!
//! Internal modules:
//! - [`dispatcher`]: subscribe/publish/close entry points;
//! - [`registry`]: type-erased map from type id to group, with checked downcast;
//! - [`group`]: per-type consumer slots, broadcast and the periodic flush loop;
//! - [`consumer`]: per-subscription drain loop (double-buffer swap);
//! - [`subscription`]: cancellation handle;
//! - [`builder`]: dispatcher construction.

mod builder;
mod consumer;
mod dispatcher;
mod group;
mod registry;
mod subscription;

pub use builder::DispatcherBuilder;
pub use dispatcher::Dispatcher;
pub use subscription::Subscription;
