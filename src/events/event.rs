//! # Event contract and the built-in framework event.
//!
//! Every type published through a [`Dispatcher`](crate::Dispatcher) implements [`Event`]:
//! it exposes a small integer type tag shared by all instances of the concrete kind.
//! The tag routes a publish to the group of consumers subscribed under it.
//!
//! ## Rules
//! - `TYPE` is the tag used when subscribing with type inference.
//! - `event_type()` is the tag used when publishing; it defaults to `TYPE`.
//! - One tag maps to exactly one concrete kind per dispatcher; reusing a tag for
//!   another kind is a wiring fault detected at subscribe time.
//!
//! ## Example
//! ```rust
//! use evbus::{Event, EventType};
//!
//! #[derive(Clone, Debug)]
//! struct UserCreated {
//!     id: u64,
//! }
//!
//! impl Event for UserCreated {
//!     const TYPE: EventType = 0x10;
//! }
//!
//! let ev = UserCreated { id: 7 };
//! assert_eq!(ev.event_type(), 0x10);
//! ```

/// Type identifier shared by all instances of one concrete event kind.
pub type EventType = u32;

/// Type id of [`FrameworkEvent`].
pub const FRAMEWORK_EVENT: EventType = 0;

/// Event contract.
///
/// Events are cloned once per consumer and never mutated by the dispatcher.
pub trait Event: Clone + Send + Sync + 'static {
    /// Type tag of this event kind.
    const TYPE: EventType;

    /// Returns the tag this instance is routed by.
    #[inline]
    fn event_type(&self) -> EventType {
        Self::TYPE
    }
}

/// Lifecycle notification emitted by the hosting framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkEvent {
    /// The application finished bootstrapping.
    Started,
    /// The application is about to shut down.
    Stopping,
}

impl Event for FrameworkEvent {
    const TYPE: EventType = FRAMEWORK_EVENT;
}

impl FrameworkEvent {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FrameworkEvent::Started => "framework_started",
            FrameworkEvent::Stopping => "framework_stopping",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Routed(EventType);

    impl Event for Routed {
        const TYPE: EventType = 5;

        fn event_type(&self) -> EventType {
            self.0
        }
    }

    #[test]
    fn test_framework_event_uses_reserved_tag() {
        assert_eq!(FrameworkEvent::Started.event_type(), FRAMEWORK_EVENT);
        assert_eq!(FrameworkEvent::Stopping.as_label(), "framework_stopping");
    }

    #[test]
    fn test_instance_tag_can_override_kind_tag() {
        assert_eq!(Routed::TYPE, 5);
        assert_eq!(Routed(9).event_type(), 9);
    }
}
