//! # Dispatcher Configuration
//!
//! Serde-backed configuration for the dispatcher and its worker pool, with
//! defaults that work without any file, and optional loading from a file
//! layered under `BLACKBOARD__*` environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use blackboard::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = ConfigLoader::load_from_file("config/blackboard.toml")?;
//! let workers = loader.config().worker_pool.workers;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::worker_pool::{
    DEFAULT_QUEUE_CAPACITY, DEFAULT_THREAD_NAME_PREFIX, FALLBACK_WORKERS,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

/// What a full worker queue does with a new task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// The submitting thread waits for a free slot
    #[default]
    Block,
    /// Submission fails with `DispatchError::ExecutorSaturated`
    Reject,
    /// The oldest queued task is discarded to make room
    DropOldest,
}

/// How synchronous publish reacts to a subscriber returning `Err`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing subscriber
    #[default]
    FailFast,
    /// Deliver to every subscriber, then report all failures together
    CollectAll,
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Worker pool used by `async_publish`
    pub worker_pool: WorkerPoolConfig,

    /// Synchronous publish failure handling
    pub failure_policy: FailurePolicy,

    /// Render published values in the per-publish debug record
    pub log_published_values: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_pool: WorkerPoolConfig::default(),
            failure_policy: FailurePolicy::default(),
            log_published_values: true,
        }
    }
}

impl DispatcherConfig {
    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        self.worker_pool.validate()
    }
}

/// Bounded worker pool configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub overflow: OverflowPolicy,
    pub thread_name_prefix: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(FALLBACK_WORKERS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowPolicy::default(),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl WorkerPoolConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigurationError::invalid_value(
                "worker_pool.workers",
                "0",
                "at least one worker is required",
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "worker_pool.queue_capacity",
                "0",
                "queue capacity must be greater than zero",
            ));
        }
        if self.thread_name_prefix.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "worker_pool.thread_name_prefix",
                self.thread_name_prefix.clone(),
                "thread name prefix must not be blank",
            ));
        }
        Ok(())
    }
}
