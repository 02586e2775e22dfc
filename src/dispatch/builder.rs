//! Builder for [`Dispatcher`].

use super::dispatcher::{Dispatcher, FailureHook};
use crate::config::{DispatcherConfig, FailurePolicy};
use crate::error::{DeliveryFailure, DispatchResult};
use crate::executor::{TaskExecutor, WorkerPool};
use std::fmt;
use std::sync::Arc;

/// Configures a [`Dispatcher`] before it is built.
///
/// Without an explicit executor, `build` starts a [`WorkerPool`] from the
/// configuration's `worker_pool` section.
#[derive(Default)]
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    executor: Option<Arc<dyn TaskExecutor>>,
    failure_hook: Option<FailureHook>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Render published values in the per-publish debug record
    pub fn log_published_values(mut self, enabled: bool) -> Self {
        self.config.log_published_values = enabled;
        self
    }

    /// Run async deliveries on `executor` instead of a dedicated pool
    pub fn executor<E: TaskExecutor + 'static>(self, executor: E) -> Self {
        self.shared_executor(Arc::new(executor))
    }

    /// Run async deliveries on an executor shared with other owners
    pub fn shared_executor(mut self, executor: Arc<dyn TaskExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Called on the worker thread for every failed async delivery
    pub fn on_failure<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DeliveryFailure) + Send + Sync + 'static,
    {
        self.failure_hook = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> DispatchResult<Dispatcher> {
        self.config.validate()?;

        let executor: Arc<dyn TaskExecutor> = match self.executor {
            Some(executor) => executor,
            None => Arc::new(WorkerPool::new(&self.config.worker_pool)?),
        };

        Ok(Dispatcher::assemble(
            executor,
            self.config.failure_policy,
            self.config.log_published_values,
            self.failure_hook,
        ))
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("config", &self.config)
            .field("executor", &self.executor.as_ref().map(|e| e.name().to_string()))
            .field("failure_hook", &self.failure_hook.is_some())
            .finish()
    }
}
