//! Error types for the blackboard dispatcher.
//!

use crate::config::ConfigurationError;
use std::fmt;
use thiserror::Error;

/// Result returned by [`Subscriber::receive`](crate::Subscriber::receive).
pub type SubscriberResult = anyhow::Result<()>;

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Type resolution found no key accepting the published value
    #[error("No subscriber registered for values of type {type_name}")]
    NoSubscriber { type_name: &'static str },

    /// The registration could not recover a concrete interest type
    #[error(
        "Could not determine the interest type of subscriber '{subscriber}'; register it with an explicit Interest instead"
    )]
    AmbiguousSubscriberType { subscriber: String },

    /// The interest accepts no concrete type, so no value could ever reach the subscriber
    #[error("Interest {key} of subscriber '{subscriber}' accepts no value type")]
    EmptyInterest {
        subscriber: String,
        key: &'static str,
    },

    /// A subscriber returned an error during synchronous fail-fast delivery
    #[error("Subscriber '{subscriber}' failed to receive {type_name}: {source}")]
    SubscriberFailed {
        subscriber: String,
        type_name: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// One or more subscribers failed during synchronous collect-all delivery
    #[error("{} subscriber(s) failed to receive {type_name}", .failures.len())]
    DeliveryFailed {
        type_name: &'static str,
        failures: Vec<DeliveryFailure>,
    },

    /// The worker queue is full and the overflow policy rejects new work
    #[error("Async executor is saturated (queue capacity {capacity})")]
    ExecutorSaturated { capacity: usize },

    /// Work was submitted after the executor stopped accepting tasks
    #[error("Async executor has been shut down")]
    ExecutorShutdown,

    /// A worker thread could not be started
    #[error("Failed to spawn worker thread: {source}")]
    WorkerSpawn {
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl DispatchError {
    /// Name of the published value's type, when the error concerns a delivery
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            DispatchError::NoSubscriber { type_name }
            | DispatchError::SubscriberFailed { type_name, .. }
            | DispatchError::DeliveryFailed { type_name, .. } => Some(*type_name),
            _ => None,
        }
    }
}

/// Why a single subscriber invocation did not complete
#[derive(Debug)]
pub enum FailureCause {
    /// `receive` returned `Err`
    Error(anyhow::Error),
    /// `receive` panicked; holds the panic message when it was a string
    Panicked(String),
    /// The executor evicted the queued delivery before it ran
    Discarded,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Error(e) => write!(f, "{e}"),
            FailureCause::Panicked(msg) => write!(f, "panicked: {msg}"),
            FailureCause::Discarded => write!(f, "discarded before running"),
        }
    }
}

/// A failed delivery of one published value to one subscriber
#[derive(Debug)]
pub struct DeliveryFailure {
    pub subscriber: String,
    pub type_name: &'static str,
    pub cause: FailureCause,
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subscriber '{}' failed on {}: {}",
            self.subscriber, self.type_name, self.cause
        )
    }
}

impl DeliveryFailure {
    pub fn is_panic(&self) -> bool {
        matches!(self.cause, FailureCause::Panicked(_))
    }

    /// Whether the subscriber never ran because its task was evicted
    pub fn is_discarded(&self) -> bool {
        matches!(self.cause, FailureCause::Discarded)
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subscriber_message_names_type() {
        let err = DispatchError::NoSubscriber {
            type_name: std::any::type_name::<String>(),
        };
        assert!(err.to_string().contains("alloc::string::String"));
        assert_eq!(err.type_name(), Some("alloc::string::String"));
    }

    #[test]
    fn test_subscriber_failed_exposes_source() {
        let err = DispatchError::SubscriberFailed {
            subscriber: "audit".to_string(),
            type_name: "u32",
            source: anyhow::anyhow!("disk full"),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("disk full"));
        assert!(err.to_string().contains("audit"));
    }

    #[test]
    fn test_panic_message_extraction() {
        let static_payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(static_payload.as_ref()), "boom");

        let owned_payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(owned_payload.as_ref()), "owned boom");

        let other: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "<non-string panic payload>");
    }

    #[test]
    fn test_delivery_failed_counts_failures() {
        let err = DispatchError::DeliveryFailed {
            type_name: "i64",
            failures: vec![
                DeliveryFailure {
                    subscriber: "a".to_string(),
                    type_name: "i64",
                    cause: FailureCause::Error(anyhow::anyhow!("nope")),
                },
                DeliveryFailure {
                    subscriber: "b".to_string(),
                    type_name: "i64",
                    cause: FailureCause::Panicked("bad".to_string()),
                },
            ],
        };
        assert_eq!(err.to_string(), "2 subscriber(s) failed to receive i64");
        if let DispatchError::DeliveryFailed { failures, .. } = &err {
            assert!(!failures[0].is_panic());
            assert!(failures[1].is_panic());
        }
    }
}
