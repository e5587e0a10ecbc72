//! Worker logic for the thread pool

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Duration;

use tracing::{debug, error, trace, warn};

use super::config::PoolConfig;
use super::task::{BoxedTask, TaskFailure};
use crate::errors::ConfigError;
use crate::metrics::{self, MetricsCollector};
use crate::queue::TaskQueue;

/// Callback receiving every task panic caught by a worker.
pub type ErrorHook = Arc<dyn Fn(&TaskFailure) + Send + Sync>;

/// Everything a worker thread shares with the pool.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub queue: Arc<TaskQueue<BoxedTask>>,
    pub on_task_error: ErrorHook,
    pub metrics_collector: Option<Arc<dyn MetricsCollector>>,
}

impl WorkerContext {
    fn notify<F>(&self, event: &'static str, f: F)
    where
        F: FnOnce(&dyn MetricsCollector),
    {
        metrics::notify(self.metrics_collector.as_ref(), event, f);
    }

    fn report(&self, failure: &TaskFailure) {
        let hook = AssertUnwindSafe(|| (self.on_task_error)(failure));
        if std::panic::catch_unwind(hook).is_err() {
            error!(
                worker_id = failure.worker_id(),
                "task error handler panicked while reporting: {}", failure
            );
        }
    }
}

pub struct WorkerHandle {
    id: usize,
    thread_id: ThreadId,
    thread: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn new(id: usize, thread: thread::JoinHandle<()>) -> Self {
        Self {
            id,
            thread_id: thread.thread().id(),
            thread: Some(thread),
        }
    }

    pub fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!(worker_id = self.id, "worker thread terminated by a panic");
            }
        }
    }

    pub fn is_joined(&self) -> bool {
        self.thread.is_none()
    }
}

/// The fixed set of worker threads of one pool.
pub(crate) struct WorkerSet {
    thread_ids: Vec<ThreadId>,
    // Held for the whole join, so concurrent `join_all` calls return together.
    handles: Mutex<Vec<WorkerHandle>>,
    joined: Mutex<bool>,
    joined_cv: Condvar,
}

impl WorkerSet {
    /// Spawns `config.num_threads` workers running [`worker_loop`].
    ///
    /// If a thread cannot be created, the queue is closed, the workers spawned so far
    /// are joined and the spawn error is returned.
    pub fn start(config: &PoolConfig, ctx: &WorkerContext) -> Result<Self, ConfigError> {
        if config.num_threads == 0 {
            return Err(ConfigError::ZeroWorkers);
        }

        let mut handles = Vec::with_capacity(config.num_threads);
        for id in 0..config.num_threads {
            let worker_ctx = ctx.clone();
            let spawned = thread::Builder::new()
                .name(config.worker_name(id))
                .spawn(move || worker_loop(id, worker_ctx));

            match spawned {
                Ok(thread) => {
                    handles.push(WorkerHandle::new(id, thread));
                    ctx.notify("worker_started", |m| m.on_worker_started());
                }
                Err(source) => {
                    error!(worker_id = id, error = %source, "failed to spawn worker thread");
                    let _ = ctx.queue.close(true);
                    for handle in &mut handles {
                        handle.join();
                    }
                    return Err(ConfigError::Spawn {
                        worker_id: id,
                        source,
                    });
                }
            }
        }

        Ok(Self {
            thread_ids: handles.iter().map(|h| h.thread_id).collect(),
            handles: Mutex::new(handles),
            joined: Mutex::new(false),
            joined_cv: Condvar::new(),
        })
    }

    fn joined(&self) -> MutexGuard<'_, bool> {
        self.joined.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until every worker has exited. Safe to call repeatedly and concurrently.
    ///
    /// A worker calling this skips itself; its handle is left for a later call.
    pub fn join_all(&self) {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        let current = thread::current().id();
        for handle in handles.iter_mut().filter(|h| h.thread_id != current) {
            handle.join();
        }

        if handles.iter().all(WorkerHandle::is_joined) {
            *self.joined() = true;
            self.joined_cv.notify_all();
        }
    }

    /// Waits up to `timeout` for [`WorkerSet::join_all`] to finish.
    pub fn wait_joined(&self, timeout: Duration) -> bool {
        let (joined, _) = self
            .joined_cv
            .wait_timeout_while(self.joined(), timeout, |joined| !*joined)
            .unwrap_or_else(PoisonError::into_inner);
        *joined
    }

    pub fn is_joined(&self) -> bool {
        *self.joined()
    }

    /// Whether the calling thread is one of this set's workers.
    pub fn contains_current(&self) -> bool {
        self.thread_ids.contains(&thread::current().id())
    }

    pub fn len(&self) -> usize {
        self.thread_ids.len()
    }
}

/// Acknowledges a dequeued task when dropped, even if the worker is unwinding.
struct TaskDone<'a>(&'a TaskQueue<BoxedTask>);

impl Drop for TaskDone<'_> {
    fn drop(&mut self) {
        self.0.task_done();
    }
}

/// Worker thread main loop: dequeue, execute, repeat until the queue reports stop.
///
/// A panicking task is caught here and handed to the error hook; it never ends the loop.
pub(crate) fn worker_loop(id: usize, ctx: WorkerContext) {
    let current = thread::current();
    let name = current.name().unwrap_or("<unnamed>");
    debug!(worker_id = id, thread = name, "worker started");

    while let Some(task) = ctx.queue.dequeue() {
        let _done = TaskDone(&ctx.queue);
        trace!(worker_id = id, "task dequeued");
        ctx.notify("task_started", |m| m.on_task_started());

        match std::panic::catch_unwind(AssertUnwindSafe(task)) {
            Ok(()) => {
                trace!(worker_id = id, "task completed");
                ctx.notify("task_completed", |m| m.on_task_completed());
            }
            Err(payload) => {
                let failure = TaskFailure::from_panic(id, &*payload);
                ctx.notify("task_failed", |m| m.on_task_failed());
                ctx.report(&failure);
            }
        }
    }

    debug!(worker_id = id, thread = name, "worker exiting");
    ctx.notify("worker_stopped", |m| m.on_worker_stopped());
}
