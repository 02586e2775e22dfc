//! # Registry Infrastructure
//!
//! Type-keyed subscriber registration and resolution.
//!
//! ## Architecture
//!
//! ```text
//! Registry Infrastructure
//! ├── Interest / TypeKey    (type tags and is-instance-of predicates)
//! ├── Subscriber            (receive capability, closure adapter, Registration)
//! └── SubscriberRegistry    (ordered key → handles map and resolution)
//! ```

pub mod interest;
pub mod subscriber;
pub mod subscriber_registry;

pub use interest::{AnyValue, Interest, TypeKey};
pub use subscriber::{subscriber_fn, FnSubscriber, Registration, Subscriber};
pub use subscriber_registry::SubscriberRegistry;
