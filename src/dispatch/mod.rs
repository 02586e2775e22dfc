//! # Dispatch
//!
//! The [`Dispatcher`]: registration front-end over the subscriber registry,
//! synchronous and pooled asynchronous publication, and delivery statistics.

pub mod builder;
pub mod dispatcher;
pub mod stats;

pub use builder::DispatcherBuilder;
pub use dispatcher::{Dispatcher, FailureHook};
pub use stats::DispatcherStats;
