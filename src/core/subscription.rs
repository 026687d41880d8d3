use std::fmt;
use std::sync::Arc;

use super::group::{AnyGroup, ConsumerId};
use crate::events::EventType;

/// Cancellation handle returned by every subscribe call.
///
/// [`cancel`](Self::cancel) stops further broadcasts to the consumer; events
/// already queued for it are still delivered before its task exits.
/// Dropping the handle does **not** unsubscribe.
#[derive(Clone)]
pub struct Subscription {
    event_type: EventType,
    id: ConsumerId,
    group: Arc<dyn AnyGroup>,
}

impl Subscription {
    pub(crate) fn new(event_type: EventType, id: ConsumerId, group: Arc<dyn AnyGroup>) -> Self {
        Self {
            event_type,
            id,
            group,
        }
    }

    /// Unsubscribes. Calling it again is a no-op.
    pub fn cancel(&self) {
        if self.group.remove(self.id) {
            tracing::debug!(event_type = self.event_type, consumer = self.id, "unsubscribed");
        }
    }

    /// Type id this subscription listens to.
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Returns true until the subscription is cancelled or its consumer is detached.
    pub fn is_active(&self) -> bool {
        self.group.is_live(self.id)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event_type", &self.event_type)
            .field("consumer", &self.id)
            .finish()
    }
}
