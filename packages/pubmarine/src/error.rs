//! Structured error types for pubmarine.
//!
//! The dispatcher has exactly one domain failure: using an event name that
//! is not part of a closed [`EventRegistry`](crate::EventRegistry). Every other
//! condition (publishing with no handlers, unsubscribing an unknown id, a
//! callback whose owner is gone) is a defined no-op, never an error.
//!
//! `InvalidConfig` only surfaces while loading a [`DispatcherConfig`](crate::DispatcherConfig)
//! from JSON, before any dispatcher exists.
//!
//! # Example
//!
//! ```
//! use pubmarine::{DispatchError, Dispatcher, TaskQueue};
//!
//! let queue = TaskQueue::new();
//! let dispatcher: Dispatcher<()> = Dispatcher::with_events(queue, ["tick"]);
//!
//! match dispatcher.publish("tock", ()) {
//!     Err(DispatchError::UnknownEvent { event }) => assert_eq!(event, "tock"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = DispatchError> = std::result::Result<T, E>;

/// Errors produced by the dispatcher.
///
/// `UnknownEvent` is a programming error (a typo or a missing registry
/// entry), not a transient condition; there is nothing to retry.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The event name is not a member of the configured registry.
    #[error("{event} is not a registered event")]
    UnknownEvent {
        /// The rejected event name.
        event: String,
    },

    /// A dispatcher configuration could not be parsed.
    #[error("invalid dispatcher config: {reason}")]
    InvalidConfig {
        /// Parser message.
        reason: String,
    },
}

impl DispatchError {
    /// Build an [`DispatchError::UnknownEvent`] for `event`.
    pub(crate) fn unknown_event(event: impl Into<String>) -> Self {
        DispatchError::UnknownEvent {
            event: event.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// ```
    /// use pubmarine::DispatchError;
    ///
    /// let err = DispatchError::UnknownEvent { event: "c".into() };
    /// assert_eq!(err.as_label(), "unknown_event");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::UnknownEvent { .. } => "unknown_event",
            DispatchError::InvalidConfig { .. } => "invalid_config",
        }
    }

    /// The rejected event name, if this error carries one.
    pub fn event(&self) -> Option<&str> {
        match self {
            DispatchError::UnknownEvent { event } => Some(event),
            DispatchError::InvalidConfig { .. } => None,
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        DispatchError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_event_mentions_name() {
        let err = DispatchError::unknown_event("test_event_bad");
        assert!(err.to_string().contains("test_event_bad"));
        assert_eq!(err.event(), Some("test_event_bad"));
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(DispatchError::unknown_event("x").as_label(), "unknown_event");

        let err = DispatchError::InvalidConfig {
            reason: "eof".into(),
        };
        assert_eq!(err.as_label(), "invalid_config");
        assert_eq!(err.event(), None);
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DispatchError = parse_err.into();
        assert!(matches!(err, DispatchError::InvalidConfig { .. }));
        assert!(err.to_string().starts_with("invalid dispatcher config"));
    }
}
