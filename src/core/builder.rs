use std::time::Duration;

use tokio::runtime::Handle;

use super::dispatcher::Dispatcher;
use crate::config::Config;

/// Builder for constructing a [`Dispatcher`] with optional settings.
#[derive(Debug, Clone, Default)]
pub struct DispatcherBuilder {
    cfg: Config,
    runtime: Option<Handle>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self { cfg, runtime: None }
    }

    /// Sets the period on which groups wake their consumers.
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.cfg.flush_interval = interval;
        self
    }

    /// Sets the initial capacity of consumer queues.
    ///
    /// Clamped to [`MAX_QUEUE_CAPACITY`](crate::MAX_QUEUE_CAPACITY) when groups are created.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.cfg.queue_capacity = capacity;
        self
    }

    /// Pins consumer and flush tasks to the given runtime.
    ///
    /// Without it, tasks are spawned on the runtime current at subscribe time,
    /// which makes subscribing from outside Tokio fail with
    /// [`DispatchError::NoRuntime`](crate::DispatchError::NoRuntime).
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Builds the dispatcher. No task is spawned until the first subscription.
    pub fn build(self) -> Dispatcher {
        Dispatcher::from_parts(self.cfg, self.runtime)
    }
}
