#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Blackboard
//!
//! In-process publish/subscribe dispatcher that routes values by runtime type.
//!
//! ## Overview
//!
//! Components register [`Subscriber`]s for the type of value they care about.
//! Publishers hand any value to the [`Dispatcher`], which resolves the one
//! registered type that accepts it and delivers the shared value to every
//! subscriber under that type, in registration order. Publishers never learn
//! who received a value.
//!
//! Delivery is synchronous on the publishing thread ([`Dispatcher::publish`])
//! or runs on a bounded worker pool ([`Dispatcher::async_publish`]).
//!
//! ## Type resolution
//!
//! Subscribers may register for a concrete type or, through an [`Interest`],
//! for a trait object such as `dyn Shape` that a set of concrete types is
//! viewed as. A published value goes to the key for its exact type when one
//! exists, otherwise to the first registered key whose interest accepts it.
//!
//! ## Module Organization
//!
//! - [`dispatch`] - The dispatcher, its builder and statistics
//! - [`registry`] - Type keys, interests, subscribers and the registry
//! - [`executor`] - Worker pool and tokio executor for async delivery
//! - [`config`] - Configuration structures and layered loading
//! - [`error`] - Structured error handling
//! - [`logging`] - `tracing` subscriber setup and structured helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use blackboard::{Dispatcher, Subscriber, SubscriberResult};
//! use std::sync::Arc;
//!
//! struct Greeter;
//!
//! impl Subscriber for Greeter {
//!     type Value = String;
//!
//!     fn receive(&self, name: &String) -> SubscriberResult {
//!         println!("hello {name}");
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), blackboard::DispatchError> {
//! let dispatcher = Dispatcher::new()?;
//! dispatcher.subscribe(Arc::new(Greeter));
//! dispatcher.publish("world".to_string())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod logging;
pub mod registry;

pub use config::{DispatcherConfig, FailurePolicy, OverflowPolicy, WorkerPoolConfig};
pub use dispatch::{Dispatcher, DispatcherBuilder, DispatcherStats, FailureHook};
pub use error::{
    DeliveryFailure, DispatchError, DispatchResult, FailureCause, SubscriberResult,
};
pub use executor::{Task, TaskExecutor, TokioExecutor, WorkerPool, WorkerPoolStats};
pub use registry::{
    subscriber_fn, AnyValue, FnSubscriber, Interest, Registration, Subscriber, TypeKey,
};
