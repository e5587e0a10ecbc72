pub mod config;
pub mod task;
mod worker;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::errors::{ConfigError, PoolError};
use crate::metrics::{self, MetricsCollector};
use crate::queue::{PoolState, TaskQueue};

use config::PoolConfig;
use task::{spawn_task, BoxedTask, TaskFailure, TaskHandle};
use worker::{WorkerContext, WorkerSet};

pub use worker::ErrorHook;

/// What happens to queued tasks when a pool shuts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Run every queued task before stopping.
    Drain,
    /// Drop every task still queued; tasks already running finish.
    Discard,
}

impl fmt::Display for ShutdownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownMode::Drain => f.write_str("drain"),
            ShutdownMode::Discard => f.write_str("discard"),
        }
    }
}

/// A fixed set of worker threads fed from one bounded FIFO queue.
///
/// `ThreadPool` is `Sync`: share it by reference or through an `Arc` to submit from
/// many threads. Dropping a pool that is still running drains it.
pub struct ThreadPool {
    queue: Arc<TaskQueue<BoxedTask>>,
    workers: WorkerSet,
    config: PoolConfig,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
}

impl ThreadPool {
    /// Creates a pool with `worker_count` workers and room for `queue_capacity` queued
    /// tasks. `on_task_error` receives every panic raised by a task.
    pub fn new<H>(
        worker_count: usize,
        queue_capacity: usize,
        on_task_error: H,
    ) -> Result<Self, ConfigError>
    where
        H: Fn(&TaskFailure) + Send + Sync + 'static,
    {
        ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .queue_capacity(queue_capacity)
            .on_task_error(on_task_error)
            .build()
    }

    pub fn builder() -> ThreadPoolBuilder {
        ThreadPoolBuilder::new()
    }

    /// Queues `f`, blocking while the queue is full.
    ///
    /// Fails with [`PoolError::PoolClosed`] once shutdown has begun, including when
    /// shutdown begins while this call is blocked.
    pub fn submit<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_boxed(Box::new(f), None)
    }

    /// Like [`ThreadPool::submit`], but gives up with [`PoolError::Timeout`] if no slot
    /// frees up within `timeout`.
    pub fn submit_timeout<F>(&self, f: F, timeout: Duration) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_boxed(Box::new(f), Some(timeout))
    }

    /// Queues `f` only if a slot is free now, failing with [`PoolError::QueueFull`]
    /// otherwise.
    pub fn try_submit<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_submitted();
        let res = self.queue.try_enqueue(Box::new(f));
        self.on_submit_result(&res);
        res
    }

    /// Queues `f` and returns a handle to its result.
    pub fn spawn<F, T>(&self, f: F) -> Result<TaskHandle<T>, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (task, handle) = spawn_task(f);
        self.submit_boxed(task, None)?;
        Ok(handle)
    }

    /// Queues one task per item, applying `f` to it. Handles are in input order.
    ///
    /// Stops at the first submission that fails; tasks queued before it still run.
    pub fn map<I, F, R>(&self, items: I, f: F) -> Result<Vec<TaskHandle<R>>, PoolError>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> R + Send + Sync + 'static,
        R: Send + 'static,
    {
        let f = Arc::new(f);
        items
            .into_iter()
            .map(|item| {
                let f = Arc::clone(&f);
                self.spawn(move || f(item))
            })
            .collect()
    }

    fn submit_boxed(&self, task: BoxedTask, timeout: Option<Duration>) -> Result<(), PoolError> {
        self.on_submitted();
        let res = self.queue.enqueue(task, timeout);
        self.on_submit_result(&res);
        res
    }

    fn on_submitted(&self) {
        metrics::notify(self.metrics_collector.as_ref(), "task_submitted", |m| {
            m.on_task_submitted()
        });
    }

    fn on_submit_result(&self, res: &Result<(), PoolError>) {
        let Err(err) = res else {
            return;
        };

        match err {
            PoolError::PoolClosed => warn!("task rejected: thread pool is closed"),
            PoolError::Timeout(waited) => warn!(?waited, "task rejected: queue stayed full"),
            _ => {}
        }
        metrics::notify(self.metrics_collector.as_ref(), "task_rejected", |m| {
            m.on_task_rejected()
        });
    }

    /// Stops the pool and blocks until every worker thread has exited.
    ///
    /// Returns [`PoolError::AlreadyStopped`] if the pool had already stopped; that call
    /// still waits for the workers to be joined. Calls made while another shutdown is
    /// in progress wait alongside it, and a [`ShutdownMode::Discard`] call upgrades a
    /// drain in progress.
    ///
    /// Called from inside one of the pool's own tasks, the shutdown is requested but
    /// not waited for.
    pub fn shutdown(&self, mode: ShutdownMode) -> Result<(), PoolError> {
        let closing = match self.queue.close(mode == ShutdownMode::Discard) {
            Ok(closing) => closing,
            Err(err) => {
                if !self.workers.contains_current() {
                    self.workers.join_all();
                }
                return Err(err);
            }
        };

        if closing.initiated {
            let queued = self.queue.len() + closing.discarded.len();
            info!(%mode, queued, "shutting down thread pool");
        }
        if !closing.discarded.is_empty() {
            info!(discarded = closing.discarded.len(), "discarding queued tasks");
            for _ in &closing.discarded {
                metrics::notify(self.metrics_collector.as_ref(), "task_discarded", |m| {
                    m.on_task_discarded()
                });
            }
        }
        drop(closing);

        if self.workers.contains_current() {
            // Joining here would wait on the calling worker itself.
            warn!("shutdown requested from a pool task, not waiting for workers");
            return Ok(());
        }

        self.workers.join_all();
        info!(workers = self.workers.len(), "thread pool stopped");
        Ok(())
    }

    /// Runs every queued task, then stops. See [`ThreadPool::shutdown`].
    pub fn shutdown_graceful(&self) -> Result<(), PoolError> {
        self.shutdown(ShutdownMode::Drain)
    }

    /// Drops every queued task, then stops. See [`ThreadPool::shutdown`].
    pub fn shutdown_now(&self) -> Result<(), PoolError> {
        self.shutdown(ShutdownMode::Discard)
    }

    /// Waits up to `timeout` for a shutdown to finish joining the workers.
    /// Returns `true` if it did.
    pub fn await_termination(&self, timeout: Duration) -> bool {
        self.workers.wait_joined(timeout)
    }

    pub fn state(&self) -> PoolState {
        self.queue.state()
    }

    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Tasks waiting in the queue.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Tasks taken by a worker and not finished yet.
    pub fn in_flight(&self) -> usize {
        self.queue.in_flight()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if !self.workers.is_joined() {
            let _ = self.shutdown(ShutdownMode::Drain);
        }
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("state", &self.state())
            .field("num_threads", &self.num_threads())
            .field("queue_capacity", &self.queue_capacity())
            .field("queued", &self.queued())
            .finish()
    }
}

fn log_task_failure(failure: &TaskFailure) {
    error!(
        worker_id = failure.worker_id(),
        thread = failure.thread_name().unwrap_or("<unnamed>"),
        "task panicked: {}",
        failure.message()
    );
}

/// Builder for [`ThreadPool`].
pub struct ThreadPoolBuilder {
    config: PoolConfig,
    on_task_error: Option<ErrorHook>,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
}

impl ThreadPoolBuilder {
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
            on_task_error: None,
            metrics_collector: None,
        }
    }

    /// Replaces all sizing and naming settings at once.
    pub fn with_config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn num_threads(mut self, n: usize) -> Self {
        self.config.num_threads = n;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name = prefix.into();
        self
    }

    /// Sets the handler for task panics. Without one, panics are logged at error level.
    pub fn on_task_error<H>(mut self, handler: H) -> Self
    where
        H: Fn(&TaskFailure) + Send + Sync + 'static,
    {
        let hook: ErrorHook = Arc::new(handler);
        self.on_task_error = Some(hook);
        self
    }

    pub fn with_metrics_collector(mut self, collector: Arc<dyn MetricsCollector>) -> Self {
        self.metrics_collector = Some(collector);
        self
    }

    pub fn build(self) -> Result<ThreadPool, ConfigError> {
        self.config.validate()?;

        let queue = Arc::new(TaskQueue::new(self.config.queue_capacity)?);
        let ctx = WorkerContext {
            queue: Arc::clone(&queue),
            on_task_error: self
                .on_task_error
                .unwrap_or_else(|| Arc::new(log_task_failure) as ErrorHook),
            metrics_collector: self.metrics_collector.clone(),
        };
        let workers = WorkerSet::start(&self.config, &ctx)?;

        Ok(ThreadPool {
            queue,
            workers,
            config: self.config,
            metrics_collector: self.metrics_collector,
        })
    }
}

impl Default for ThreadPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
