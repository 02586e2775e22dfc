//! # System Constants
//!
//! Defaults and environment variable names that define the operational
//! boundaries of the dispatcher.

/// Worker pool defaults
pub mod worker_pool {
    /// Queue slots per pool when no capacity is configured
    pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
    /// Worker count used when available parallelism cannot be queried
    pub const FALLBACK_WORKERS: usize = 4;
    pub const DEFAULT_THREAD_NAME_PREFIX: &str = "blackboard-async";
}

/// Environment variables read by configuration loading and logging
pub mod env {
    /// Prefix for configuration overrides, e.g. `BLACKBOARD__WORKER_POOL__WORKERS=8`
    pub const CONFIG_PREFIX: &str = "BLACKBOARD";
    pub const CONFIG_SEPARATOR: &str = "__";
    /// Checked in order to detect the runtime environment
    pub const ENVIRONMENT_VARS: &[&str] = &["BLACKBOARD_ENV", "APP_ENV"];
    pub const DEFAULT_ENVIRONMENT: &str = "development";
    /// Set to `json` for JSON log lines
    pub const LOG_FORMAT: &str = "BLACKBOARD_LOG_FORMAT";
}

/// Prefix of generated dispatcher identifiers
pub const DISPATCHER_ID_PREFIX: &str = "bb_";
