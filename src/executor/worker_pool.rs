//! # Worker Pool
//!
//! Fixed-size pool of named OS threads consuming a bounded `crossbeam`
//! queue. When the queue is full the configured [`OverflowPolicy`] decides
//! whether the submitter waits, is refused, or evicts the oldest queued task.
//! An evicted task is discarded on the submitting thread, which runs its
//! discard callback before `submit` returns.
//!
//! A panicking task is caught and counted; its worker keeps running.
//!
//! Under [`OverflowPolicy::Block`], a task that itself submits to a full pool
//! from a worker thread waits for a free slot like any other submitter. If
//! every worker does that at once the pool stalls.

use crate::config::{OverflowPolicy, WorkerPoolConfig};
use crate::error::{panic_message, DispatchError, DispatchResult};
use crate::executor::traits::{Task, TaskExecutor};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
struct PoolCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
    panicked: AtomicU64,
    rejected: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time view of pool activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerPoolStats {
    pub workers: usize,
    pub capacity: usize,
    pub queued: usize,
    pub submitted: u64,
    pub completed: u64,
    pub panicked: u64,
    pub rejected: u64,
    pub dropped: u64,
}

/// Bounded pool of worker threads
pub struct WorkerPool {
    name: String,
    /// `None` once shut down
    sender: RwLock<Option<Sender<Task>>>,
    /// Kept for `DropOldest` eviction and queue depth
    receiver: Receiver<Task>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    capacity: usize,
    overflow: OverflowPolicy,
    counters: Arc<PoolCounters>,
}

impl WorkerPool {
    /// Start a pool with `config.workers` threads named `{prefix}-{n}`
    pub fn new(config: &WorkerPoolConfig) -> DispatchResult<Self> {
        config.validate()?;

        let (sender, receiver) = channel::bounded::<Task>(config.queue_capacity);
        let counters = Arc::new(PoolCounters::default());
        let mut workers = Vec::with_capacity(config.workers);

        for index in 0..config.workers {
            let worker_name = format!("{}-{}", config.thread_name_prefix, index);
            let receiver = receiver.clone();
            let counters = Arc::clone(&counters);
            let handle = thread::Builder::new()
                .name(worker_name)
                .spawn(move || run_worker(receiver, counters))
                .map_err(|source| DispatchError::WorkerSpawn { source })?;
            workers.push(handle);
        }

        info!(
            "🏊 POOL: Started {} workers (capacity: {}, overflow: {:?})",
            config.workers, config.queue_capacity, config.overflow
        );

        Ok(Self {
            name: config.thread_name_prefix.clone(),
            sender: RwLock::new(Some(sender)),
            receiver,
            workers: Mutex::new(workers),
            worker_count: config.workers,
            capacity: config.queue_capacity,
            overflow: config.overflow,
            counters,
        })
    }

    pub fn stats(&self) -> WorkerPoolStats {
        let c = &self.counters;
        WorkerPoolStats {
            workers: self.worker_count,
            capacity: self.capacity,
            queued: self.receiver.len(),
            submitted: c.submitted.load(Ordering::Relaxed),
            completed: c.completed.load(Ordering::Relaxed),
            panicked: c.panicked.load(Ordering::Relaxed),
            rejected: c.rejected.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
        }
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow
    }

    pub fn is_shut_down(&self) -> bool {
        self.sender.read().is_none()
    }

    /// Queue `task`, collecting any tasks evicted to make room
    fn enqueue(
        &self,
        sender: &Sender<Task>,
        task: Task,
        evicted: &mut Vec<Task>,
    ) -> DispatchResult<()> {
        match self.overflow {
            OverflowPolicy::Block => sender
                .send(task)
                .map_err(|_| DispatchError::ExecutorShutdown),
            OverflowPolicy::Reject => match sender.try_send(task) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => {
                    self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        pool = %self.name,
                        capacity = self.capacity,
                        "Worker queue full, rejecting task"
                    );
                    Err(DispatchError::ExecutorSaturated {
                        capacity: self.capacity,
                    })
                }
                Err(TrySendError::Disconnected(_)) => Err(DispatchError::ExecutorShutdown),
            },
            OverflowPolicy::DropOldest => {
                let mut pending = task;
                loop {
                    match sender.try_send(pending) {
                        Ok(()) => return Ok(()),
                        Err(TrySendError::Full(task)) => {
                            if let Ok(oldest) = self.receiver.try_recv() {
                                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                                warn!(
                                    pool = %self.name,
                                    capacity = self.capacity,
                                    task = oldest.label(),
                                    "Worker queue full, dropped oldest queued task"
                                );
                                evicted.push(oldest);
                            }
                            pending = task;
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            return Err(DispatchError::ExecutorShutdown)
                        }
                    }
                }
            }
        }
    }
}

fn run_worker(receiver: Receiver<Task>, counters: Arc<PoolCounters>) {
    while let Ok(task) = receiver.recv() {
        let label = task.label().to_string();
        match panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
            Ok(()) => {
                counters.completed.fetch_add(1, Ordering::Relaxed);
            }
            Err(payload) => {
                counters.panicked.fetch_add(1, Ordering::Relaxed);
                error!(
                    worker = thread::current().name().unwrap_or("unnamed"),
                    task = %label,
                    panic = %panic_message(payload.as_ref()),
                    "❌ POOL: Task panicked"
                );
            }
        }
    }
    debug!(
        worker = thread::current().name().unwrap_or("unnamed"),
        "Worker exiting"
    );
}

impl TaskExecutor for WorkerPool {
    fn submit(&self, task: Task) -> DispatchResult<()> {
        let mut evicted = Vec::new();
        let queued = match self.sender.read().as_ref() {
            Some(sender) => self.enqueue(sender, task, &mut evicted),
            None => Err(DispatchError::ExecutorShutdown),
        };
        // Discard callbacks may submit again, so they run with the sender released
        for task in evicted {
            task.discard();
        }
        queued?;
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Close the queue, let workers drain it, and join them.
    /// Workers are not joined from their own thread.
    fn shutdown(&self) {
        let Some(sender) = self.sender.write().take() else {
            return;
        };
        drop(sender);

        let handles = std::mem::take(&mut *self.workers.lock());
        let current = thread::current().id();
        for handle in handles {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                warn!(pool = %self.name, "Worker thread terminated abnormally");
            }
        }

        info!("🛑 POOL: {} shut down ({:?})", self.name, self.stats());
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("overflow", &self.overflow)
            .field("stats", &self.stats())
            .finish()
    }
}
