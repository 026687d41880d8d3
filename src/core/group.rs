//! # Consumer group: every subscriber of one event type.
//!
//! A [`Group`] owns one lock guarding the ordered consumer slots (and with them
//! every consumer queue), plus the wake signal its flush loop fires.
//!
//! ## Architecture
//! ```text
//! publish(ev) ──► broadcast(ev) ──► lock ──► slot1.queue.push(ev)
//!                                        ├─► slot2.queue.push(ev)
//!                                        └─► slotN.queue.push(ev)   (stopped slots skipped)
//!
//! flush loop: every flush_interval ──► wake.notify_waiters()
//!                                          │
//!                          ┌───────────────┼───────────────┐
//!                          ▼               ▼               ▼
//!                      consumer 1      consumer 2      consumer N
//!                      take() → swap queue ↔ scratch, deliver outside the lock
//! ```
//!
//! ## Rules
//! - **Batched wakeups**: `broadcast()` never wakes consumers; only the flush loop does.
//!   Delivery latency is bounded by the flush interval.
//! - **Producers never wait on handlers**: the lock is held only to push or swap.
//! - **Stopped slots keep their queue** until the consumer drains it, then the
//!   consumer removes the slot.
//! - **One flush loop per group**: a loop lost with its runtime is restarted by
//!   the next subscription.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::consumer;
use crate::events::{Event, EventType};
use crate::subscribers::Handler;

/// Identifier of a consumer inside its group.
pub(crate) type ConsumerId = u64;

/// Per-consumer state guarded by the group lock.
#[derive(Debug)]
struct Slot<T> {
    id: ConsumerId,
    /// Live queue; producers append here.
    queue: Vec<T>,
    /// Set on unsubscribe; no further broadcasts reach this slot.
    stopped: bool,
}

/// Outcome of [`Group::take`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Take {
    /// Queue swapped into the scratch buffer; deliver it.
    Batch,
    /// Nothing queued; wait for the next flush.
    Empty,
    /// Stopped and drained (or already gone); the slot has been removed.
    Stopped,
}

/// Type-erased view of a group, used by the registry and subscriptions.
pub(crate) trait AnyGroup: Send + Sync + 'static {
    /// Marks a consumer stopped. Returns `false` if it was already stopped or gone.
    fn remove(&self, id: ConsumerId) -> bool;
    /// Returns true if the consumer still receives broadcasts.
    fn is_live(&self, id: ConsumerId) -> bool;
    /// Number of live consumers.
    fn count(&self) -> usize;
    /// Upcast for checked downcasting in the registry.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// All consumers subscribed to one event type.
#[derive(Debug)]
pub(crate) struct Group<T> {
    event_type: EventType,
    queue_capacity: usize,
    slots: Mutex<Vec<Slot<T>>>,
    wake: Notify,
    next_id: AtomicU64,
    flusher: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Event> Group<T> {
    /// Creates an empty group. Queues start with `queue_capacity` slots reserved.
    pub(crate) fn new(event_type: EventType, queue_capacity: usize) -> Self {
        Self {
            event_type,
            queue_capacity,
            slots: Mutex::new(Vec::new()),
            wake: Notify::new(),
            next_id: AtomicU64::new(1),
            flusher: Mutex::new(None),
        }
    }

    pub(crate) fn event_type(&self) -> EventType {
        self.event_type
    }

    pub(crate) fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Wake signal fired on every flush tick.
    pub(crate) fn wake(&self) -> &Notify {
        &self.wake
    }

    /// Poisoning is ignored: no handler ever runs under this lock.
    fn lock(&self) -> MutexGuard<'_, Vec<Slot<T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a new live slot and returns its id.
    pub(crate) fn attach(&self) -> ConsumerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push(Slot {
            id,
            queue: Vec::with_capacity(self.queue_capacity),
            stopped: false,
        });
        id
    }

    /// Attaches a consumer and spawns its drain task.
    pub(crate) fn add(
        self: &Arc<Self>,
        handler: Arc<dyn Handler<T>>,
        runtime: &Handle,
        shutdown: CancellationToken,
    ) -> ConsumerId {
        let id = self.attach();
        runtime.spawn(consumer::listen(Arc::clone(self), id, handler, shutdown));
        id
    }

    /// Drops a slot and whatever is still queued in it.
    pub(crate) fn detach(&self, id: ConsumerId) {
        self.lock().retain(|slot| slot.id != id);
    }

    /// Appends `event` to every live consumer queue.
    pub(crate) fn broadcast(&self, event: T) {
        let mut slots = self.lock();
        for slot in slots.iter_mut().filter(|slot| !slot.stopped) {
            slot.queue.push(event.clone());
        }
    }

    /// Double-buffer swap: moves the live queue into `pending` (which must be empty).
    pub(crate) fn take(&self, id: ConsumerId, pending: &mut Vec<T>) -> Take {
        debug_assert!(pending.is_empty());

        let mut slots = self.lock();
        let Some(pos) = slots.iter().position(|slot| slot.id == id) else {
            return Take::Stopped;
        };

        let slot = &mut slots[pos];
        if !slot.queue.is_empty() {
            std::mem::swap(&mut slot.queue, pending);
            return Take::Batch;
        }
        if slot.stopped {
            slots.remove(pos);
            return Take::Stopped;
        }
        Take::Empty
    }

    /// Spawns the flush loop on `runtime` unless one is still running.
    ///
    /// Returns true if a loop was spawned.
    pub(crate) fn ensure_flush(
        self: &Arc<Self>,
        runtime: &Handle,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> bool {
        let mut flusher = self.flusher.lock().unwrap_or_else(PoisonError::into_inner);
        if flusher.as_ref().is_some_and(|task| !task.is_finished()) {
            return false;
        }
        *flusher = Some(runtime.spawn(Arc::clone(self).flush(interval, shutdown)));
        true
    }

    /// Wakes every waiting consumer on each tick until `shutdown` fires.
    pub(crate) async fn flush(self: Arc<Self>, interval: Duration, shutdown: CancellationToken) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.wake.notify_waiters(),
            }
        }
        tracing::debug!(event_type = self.event_type, "group flush loop stopped");
    }
}

impl<T: Event> AnyGroup for Group<T> {
    fn remove(&self, id: ConsumerId) -> bool {
        let mut slots = self.lock();
        match slots.iter_mut().find(|slot| slot.id == id) {
            Some(slot) if !slot.stopped => {
                slot.stopped = true;
                true
            }
            _ => false,
        }
    }

    fn is_live(&self, id: ConsumerId) -> bool {
        self.lock().iter().any(|slot| slot.id == id && !slot.stopped)
    }

    fn count(&self) -> usize {
        self.lock().iter().filter(|slot| !slot.stopped).count()
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Num(u32);

    impl Event for Num {
        const TYPE: EventType = 42;
    }

    #[test]
    fn test_broadcast_reaches_every_live_consumer() {
        let group = Group::<Num>::new(42, 4);
        let a = group.attach();
        let b = group.attach();

        group.broadcast(Num(1));
        group.broadcast(Num(2));

        for id in [a, b] {
            let mut pending = Vec::new();
            assert_eq!(group.take(id, &mut pending), Take::Batch);
            assert_eq!(pending, vec![Num(1), Num(2)]);
        }
    }

    #[test]
    fn test_take_swaps_and_resets_live_queue() {
        let group = Group::<Num>::new(42, 4);
        let id = group.attach();
        group.broadcast(Num(1));

        let mut pending = Vec::new();
        assert_eq!(group.take(id, &mut pending), Take::Batch);
        assert_eq!(pending, vec![Num(1)]);

        pending.clear();
        assert_eq!(group.take(id, &mut pending), Take::Empty);
        assert!(pending.is_empty());

        group.broadcast(Num(2));
        assert_eq!(group.take(id, &mut pending), Take::Batch);
        assert_eq!(pending, vec![Num(2)]);
    }

    #[test]
    fn test_removed_consumer_drains_then_stops() {
        let group = Group::<Num>::new(42, 4);
        let id = group.attach();
        group.broadcast(Num(1));

        assert!(group.remove(id));
        assert!(!group.remove(id), "second remove is a no-op");
        assert!(!group.is_live(id));
        assert_eq!(group.count(), 0);

        group.broadcast(Num(2));

        let mut pending = Vec::new();
        assert_eq!(group.take(id, &mut pending), Take::Batch);
        assert_eq!(pending, vec![Num(1)], "only events queued before removal");

        pending.clear();
        assert_eq!(group.take(id, &mut pending), Take::Stopped);
        assert_eq!(group.take(id, &mut pending), Take::Stopped);
    }

    #[test]
    fn test_detach_drops_slot_and_queue() {
        let group = Group::<Num>::new(42, 4);
        let keep = group.attach();
        let gone = group.attach();
        group.broadcast(Num(1));

        group.detach(gone);
        assert_eq!(group.count(), 1);
        assert!(group.is_live(keep));

        let mut pending = Vec::new();
        assert_eq!(group.take(gone, &mut pending), Take::Stopped);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_erased_group_downcasts_to_own_kind_only() {
        let group: Arc<dyn AnyGroup> = Arc::new(Group::<Num>::new(42, 4));
        let any = group.as_any();
        assert!(Arc::clone(&any).downcast::<Group<Num>>().is_ok());
        assert!(any.downcast::<Group<Other>>().is_err());
    }

    #[test]
    fn test_flush_loop_restarts_after_its_runtime_is_gone() {
        let group = Arc::new(Group::<Num>::new(42, 4));
        let shutdown = CancellationToken::new();
        let interval = Duration::from_millis(1);

        let first = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        assert!(group.ensure_flush(first.handle(), interval, shutdown.clone()));
        assert!(!group.ensure_flush(first.handle(), interval, shutdown.clone()));
        drop(first);

        let second = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        assert!(group.ensure_flush(second.handle(), interval, shutdown.clone()));
        assert!(!group.ensure_flush(second.handle(), interval, shutdown));
    }

    #[derive(Clone)]
    struct Other;

    impl Event for Other {
        const TYPE: EventType = 42;
    }
}
