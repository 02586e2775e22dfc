//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are layered, later ones
//! winning:
//!
//! 1. built-in defaults (`DispatcherConfig::default()`)
//! 2. the configuration file, format chosen by extension (toml, yaml, json)
//! 3. an optional environment override file next to it, e.g.
//!    `blackboard.production.toml`
//! 4. `BLACKBOARD__*` environment variables, `__` separating nested keys

use super::error::{ConfigResult, ConfigurationError};
use super::DispatcherConfig;
use crate::constants::env::{
    CONFIG_PREFIX, CONFIG_SEPARATOR, DEFAULT_ENVIRONMENT, ENVIRONMENT_VARS,
};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loaded, validated configuration and where it came from
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: DispatcherConfig,
    environment: String,
    source_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load from defaults and environment variables only
    pub fn load() -> ConfigResult<Self> {
        Self::load_with_env(None, &Self::detect_environment())
    }

    /// Load from a configuration file with environment auto-detection
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::load_with_env(Some(path.as_ref()), &Self::detect_environment())
    }

    /// Load with an explicit environment.
    /// This is useful for testing without modifying global environment variables
    pub fn load_with_env(path: Option<&Path>, environment: &str) -> ConfigResult<Self> {
        Self::build(path, environment, None)
    }

    fn build(
        path: Option<&Path>,
        environment: &str,
        env_vars: Option<config::Map<String, String>>,
    ) -> ConfigResult<Self> {
        let defaults = Config::try_from(&DispatcherConfig::default())
            .map_err(|e| ConfigurationError::load_error("defaults", e))?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigurationError::config_file_not_found(path));
            }
            debug!(
                "Loading configuration for environment '{}' from {}",
                environment,
                path.display()
            );
            builder = builder.add_source(File::from(path));

            if let Some(override_path) = Self::environment_override_path(path, environment) {
                debug!("Checking environment override {}", override_path.display());
                builder = builder.add_source(File::from(override_path.as_path()).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(CONFIG_PREFIX)
                .prefix_separator(CONFIG_SEPARATOR)
                .separator(CONFIG_SEPARATOR)
                .try_parsing(true)
                .source(env_vars),
        );

        let source_name = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "environment".to_string());

        let config: DispatcherConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ConfigurationError::load_error(source_name.clone(), e))?;

        config.validate()?;

        debug!(
            "Configuration loaded: {}",
            serde_json::to_string(&config).unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            environment = environment,
            source = %source_name,
            workers = config.worker_pool.workers,
            queue_capacity = config.worker_pool.queue_capacity,
            "Dispatcher configuration loaded"
        );

        Ok(Self {
            config,
            environment: environment.to_string(),
            source_file: path.map(Path::to_path_buf),
        })
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn into_config(self) -> DispatcherConfig {
        self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    /// Detect the current environment from `BLACKBOARD_ENV` or `APP_ENV`
    pub fn detect_environment() -> String {
        ENVIRONMENT_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }

    /// `dir/name.ext` → `dir/name.{environment}.ext`
    fn environment_override_path(path: &Path, environment: &str) -> Option<PathBuf> {
        let stem = path.file_stem()?.to_str()?;
        let extension = path.extension()?.to_str()?;
        Some(path.with_file_name(format!("{stem}.{environment}.{extension}")))
    }
}
