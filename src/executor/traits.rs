//! Executor trait shared by all task execution backends.

use crate::error::DispatchResult;
use std::fmt;

type Work = Box<dyn FnOnce() + Send + 'static>;

/// A unit of work submitted by `async_publish`.
///
/// The label names the work in executor logs. An executor that evicts a
/// queued task without running it calls [`Task::discard`], which runs the
/// task's discard callback instead of its work.
pub struct Task {
    label: String,
    work: Work,
    on_discard: Option<Work>,
}

impl Task {
    pub fn new<F>(label: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            label: label.into(),
            work: Box::new(work),
            on_discard: None,
        }
    }

    /// Callback run on the evicting thread if the task is discarded
    pub fn on_discard<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_discard = Some(Box::new(callback));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn run(self) {
        (self.work)();
    }

    /// Give up on the task without running its work
    pub fn discard(self) {
        if let Some(callback) = self.on_discard {
            callback();
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("label", &self.label)
            .field("on_discard", &self.on_discard.is_some())
            .finish()
    }
}

/// Accepts units of work and runs them eventually, not necessarily before
/// `submit` returns.
pub trait TaskExecutor: Send + Sync {
    /// Queue `task` for execution
    fn submit(&self, task: Task) -> DispatchResult<()>;

    /// Stop accepting work. Implementations may wait for queued work to drain.
    fn shutdown(&self) {}

    /// Executor name for identification in logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU8, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_run_and_discard_are_exclusive() {
        let ran = Arc::new(AtomicU8::new(0));
        let discarded = Arc::new(AtomicU8::new(0));

        let task = {
            let ran = Arc::clone(&ran);
            let discarded = Arc::clone(&discarded);
            Task::new("first", move || {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .on_discard(move || {
                discarded.fetch_add(1, Ordering::SeqCst);
            })
        };
        assert_eq!(task.label(), "first");
        task.run();

        let task = {
            let ran = Arc::clone(&ran);
            let discarded = Arc::clone(&discarded);
            Task::new("second", move || {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .on_discard(move || {
                discarded.fetch_add(1, Ordering::SeqCst);
            })
        };
        task.discard();

        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(discarded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_discard_without_callback_is_silent() {
        Task::new("plain", || panic!("must not run")).discard();
    }
}
