//! # Task Execution
//!
//! The facility `async_publish` hands subscriber invocations to. Its only
//! required capability is accepting a unit of work for eventual execution.
//!
//! ## Available Executors
//!
//! - **WorkerPool**: fixed set of named OS threads fed by a bounded queue
//!   with an explicit [`OverflowPolicy`](crate::config::OverflowPolicy)
//! - **TokioExecutor**: runs tasks on a tokio runtime's blocking pool

pub mod tokio_executor;
pub mod traits;
pub mod worker_pool;

pub use tokio_executor::TokioExecutor;
pub use traits::{Task, TaskExecutor};
pub use worker_pool::{WorkerPool, WorkerPoolStats};
