//! Error types used by the dispatcher and its configuration.
//!
//! This module defines two enums:
//!
//! - [`DispatchError`] — faults raised while wiring subscriptions or closing a dispatcher.
//! - [`ConfigError`] — invalid configuration values read from the environment.
//!
//! Both provide `as_label` for logs/metrics; [`DispatchError`] also has `as_message`.

use thiserror::Error;

use crate::events::EventType;

/// # Errors produced by the dispatcher.
///
/// `Closed` and `Conflict` are wiring faults: the panicking `subscribe*` methods
/// turn them into a panic, the `try_subscribe*` methods return them.
/// Publishing and cancelling never fail.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The dispatcher was already closed.
    #[error("event dispatcher is closed")]
    Closed,

    /// The event type id is already bound to a different concrete event kind.
    #[error("conflicting event type, want=<{want}>, registered=<{registered}>, event={event_type:#x}")]
    Conflict {
        /// Type id that was requested.
        event_type: EventType,
        /// Event kind the caller asked for.
        want: &'static str,
        /// Event kind the group was created with.
        registered: &'static str,
    },

    /// No Tokio runtime is available to spawn consumer tasks on.
    #[error("no tokio runtime available to spawn event consumers")]
    NoRuntime,

    /// A default dispatcher has already been installed (or lazily created).
    #[error("default event dispatcher is already installed")]
    AlreadyInstalled,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use evbus::DispatchError;
    ///
    /// assert_eq!(DispatchError::Closed.as_label(), "dispatcher_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Closed => "dispatcher_closed",
            DispatchError::Conflict { .. } => "event_type_conflict",
            DispatchError::NoRuntime => "no_runtime",
            DispatchError::AlreadyInstalled => "default_already_installed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::Closed => "dispatcher closed".to_string(),
            DispatchError::Conflict {
                event_type,
                want,
                registered,
            } => format!("event {event_type:#x} bound to {registered}, requested as {want}"),
            DispatchError::NoRuntime => "no tokio runtime".to_string(),
            DispatchError::AlreadyInstalled => "default dispatcher already set".to_string(),
        }
    }

    /// Indicates whether the error is a static wiring mistake.
    ///
    /// Wiring faults are never transient; retrying the same call fails again.
    pub fn is_wiring_fault(&self) -> bool {
        matches!(self, DispatchError::Closed | DispatchError::Conflict { .. })
    }
}

/// # Errors produced while reading [`Config`](crate::Config) from the environment.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable is set but cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    Invalid {
        /// Environment variable name.
        key: &'static str,
        /// Raw value found.
        value: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Invalid { .. } => "config_invalid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_display_names_both_kinds() {
        let err = DispatchError::Conflict {
            event_type: 42,
            want: "u64",
            registered: "alloc::string::String",
        };
        assert_eq!(
            err.to_string(),
            "conflicting event type, want=<u64>, registered=<alloc::string::String>, event=0x2a"
        );
        assert_eq!(err.as_label(), "event_type_conflict");
        assert!(err.is_wiring_fault());
    }

    #[test]
    fn test_runtime_errors_are_not_wiring_faults() {
        assert!(!DispatchError::NoRuntime.is_wiring_fault());
        assert!(!DispatchError::AlreadyInstalled.is_wiring_fault());
        assert!(DispatchError::Closed.is_wiring_fault());
    }

    #[test]
    fn test_config_error_label() {
        let err = ConfigError::Invalid {
            key: "EVBUS_QUEUE_CAPACITY",
            value: "lots".into(),
        };
        assert_eq!(err.as_label(), "config_invalid");
        assert_eq!(err.to_string(), "invalid value for EVBUS_QUEUE_CAPACITY: \"lots\"");
    }
}
