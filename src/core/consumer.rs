//! # Consumer drain loop.
//!
//! One task per subscription. It sleeps until the group's flush loop wakes it,
//! swaps its queue out under the group lock, and runs the handler for every
//! event of the batch without holding the lock.
//!
//! ## State machine
//! ```text
//!            ┌────────────── batch delivered ───────────────┐
//!            ▼                                              │
//!       ┌─────────┐  queue non-empty: swap ↔ scratch   ┌──────────┐
//!  ───► │ Waiting │ ─────────────────────────────────► │ Draining │
//!       └────┬────┘                                    └──────────┘
//!            │ stopped && queue empty, or shutdown
//!            ▼
//!       ┌─────────┐
//!       │ Stopped │  (slot removed, task exits)
//!       └─────────┘
//! ```
//!
//! ## Rules
//! - Interest in the wake signal is registered **before** the queue is checked,
//!   so a flush that lands in between is not lost.
//! - Events are delivered in enqueue order, one `on_event` at a time.
//! - A handler panic detaches the consumer: the rest of the batch is dropped and
//!   the panic is resumed on the task.
//! - Blocking handlers ([`Handler::is_blocking`]) drain their batch on Tokio's
//!   blocking pool, so the executor keeps serving other consumers meanwhile.
//! - The slot is removed however the task ends, including when it is dropped
//!   together with its runtime.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use super::group::{ConsumerId, Group, Take};
use crate::events::Event;
use crate::subscribers::Handler;

type Panic = Box<dyn Any + Send + 'static>;

/// Detaches the consumer's slot on drop.
struct Attached<T: Event> {
    group: Arc<Group<T>>,
    id: ConsumerId,
}

impl<T: Event> Drop for Attached<T> {
    fn drop(&mut self) {
        self.group.detach(self.id);
    }
}

/// Returns the drain loop for consumer `id`; it runs until the consumer is
/// stopped or the dispatcher shuts down.
///
/// The slot is owned by the returned future from the start, so dropping it
/// unpolled still detaches the consumer.
pub(crate) fn listen<T: Event>(
    group: Arc<Group<T>>,
    id: ConsumerId,
    handler: Arc<dyn Handler<T>>,
    shutdown: CancellationToken,
) -> impl Future<Output = ()> + Send + 'static {
    let attached = Attached { group, id };

    async move {
        let group = &attached.group;
        let mut pending: Vec<T> = Vec::with_capacity(group.queue_capacity());

        loop {
            let notified = group.wake().notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match group.take(id, &mut pending) {
                Take::Batch => deliver(group, id, &handler, &mut pending).await,
                Take::Stopped => break,
                Take::Empty => {
                    tokio::select! {
                        _ = &mut notified => {}
                        _ = shutdown.cancelled() => break,
                    }
                }
            }
        }

        tracing::debug!(
            event_type = group.event_type(),
            consumer = id,
            handler = handler.name(),
            "consumer stopped"
        );
    }
}

/// Invokes the handler for every pending event, leaving `pending` empty.
async fn deliver<T: Event>(
    group: &Group<T>,
    id: ConsumerId,
    handler: &Arc<dyn Handler<T>>,
    pending: &mut Vec<T>,
) {
    let outcome = if handler.is_blocking() {
        drain_blocking(handler, pending).await
    } else {
        drain(handler.as_ref(), pending).await
    };

    if let Err(panic_err) = outcome {
        tracing::error!(
            event_type = group.event_type(),
            consumer = id,
            handler = handler.name(),
            panic = %panic_message(panic_err.as_ref()),
            "event handler panicked; consumer detached"
        );
        std::panic::resume_unwind(panic_err);
    }
}

async fn drain<T: Event>(handler: &dyn Handler<T>, pending: &mut Vec<T>) -> Result<(), Panic> {
    for event in pending.drain(..) {
        AssertUnwindSafe(handler.on_event(event)).catch_unwind().await?;
    }
    Ok(())
}

/// Drains the batch on the blocking pool and hands the emptied buffer back.
async fn drain_blocking<T: Event>(
    handler: &Arc<dyn Handler<T>>,
    pending: &mut Vec<T>,
) -> Result<(), Panic> {
    let mut batch = std::mem::take(pending);
    let handler = Arc::clone(handler);

    let joined = tokio::task::spawn_blocking(move || {
        for event in batch.drain(..) {
            futures::executor::block_on(handler.on_event(event));
        }
        batch
    })
    .await;

    match joined {
        Ok(batch) => {
            *pending = batch;
            Ok(())
        }
        Err(err) if err.is_panic() => Err(err.into_panic()),
        // Cancelled: the runtime is shutting down.
        Err(_) => Ok(()),
    }
}

fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
