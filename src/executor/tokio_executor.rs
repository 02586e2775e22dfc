//! Executor backed by an existing tokio runtime.
//!
//! Subscriber invocations are synchronous, so tasks go to the runtime's
//! blocking pool rather than its async workers.

use crate::error::{DispatchError, DispatchResult};
use crate::executor::traits::{Task, TaskExecutor};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tracing::info;

#[derive(Debug)]
pub struct TokioExecutor {
    handle: Handle,
    accepting: AtomicBool,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            accepting: AtomicBool::new(true),
        }
    }

    /// Executor for the runtime the caller is running inside, if any
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl TaskExecutor for TokioExecutor {
    fn submit(&self, task: Task) -> DispatchResult<()> {
        if !self.accepting.load(Ordering::Acquire) {
            return Err(DispatchError::ExecutorShutdown);
        }
        // Detached; the dispatcher reports task outcomes itself
        drop(self.handle.spawn_blocking(move || task.run()));
        Ok(())
    }

    fn shutdown(&self) {
        if self.accepting.swap(false, Ordering::AcqRel) {
            info!("🛑 TOKIO EXECUTOR: No longer accepting tasks");
        }
    }

    fn name(&self) -> &str {
        "tokio"
    }
}
