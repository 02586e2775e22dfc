//! # Structured Logging Module
//!
//! Environment-aware `tracing` setup for applications embedding the
//! dispatcher, plus structured helpers for dispatcher operations.
//!
//! The dispatcher itself only emits `tracing` events; installing a
//! subscriber is left to the application, which may call [`init_logging`].

use crate::config::ConfigLoader;
use crate::constants::env::LOG_FORMAT;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console logging with an environment-specific level.
///
/// `RUST_LOG` takes precedence over the environment default. Set
/// `BLACKBOARD_LOG_FORMAT=json` for JSON lines.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigLoader::detect_environment();
        let log_level = get_log_level(&environment);
        let json = std::env::var(LOG_FORMAT)
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        };

        // Use try_init to avoid panic if global subscriber already set
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "🔧 LOGGING: Initialized"
        );
    });
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log structured data for registry and delivery operations
pub fn log_dispatch_operation(
    operation: &str,
    dispatcher_id: &str,
    type_name: &str,
    subscribers: usize,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        dispatcher_id = %dispatcher_id,
        type_name = %type_name,
        subscribers = subscribers,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📚 DISPATCH_OPERATION"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
        log_dispatch_operation("subscribe", "bb_test", "u8", 1, "ok", None);
    }
}
