//! Metrics collection for the thread pool.
//!
//! This module defines the `MetricsCollector` trait for collecting metrics about the
//! thread pool's activity, as well as default implementations for atomic metrics collection.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::error;

use crate::pool::task::panic_message;

/// A trait for collecting metrics from the thread pool.
///
/// Implementations of this trait provide hooks to track key events in the thread pool,
/// such as task submission, execution, and worker lifecycle changes.
pub trait MetricsCollector: Send + Sync {
    /// Called before a task is offered to the queue.
    fn on_task_submitted(&self);
    /// Called when an offered task was not accepted (closed pool, timeout, full queue).
    fn on_task_rejected(&self);
    /// Called when a worker takes a task off the queue.
    fn on_task_started(&self);
    /// Called when a task returns normally.
    fn on_task_completed(&self);
    /// Called when a task panics.
    fn on_task_failed(&self);
    /// Called for each queued task dropped by a discarding shutdown.
    fn on_task_discarded(&self);
    /// Called when a worker thread starts.
    fn on_worker_started(&self);
    /// Called when a worker thread stops.
    fn on_worker_stopped(&self);
}

/// Delivers one event to `collector`, if any.
///
/// A panicking collector is logged and otherwise ignored, so it cannot take down the
/// worker or caller that reported the event.
pub(crate) fn notify<F>(
    collector: Option<&Arc<dyn MetricsCollector>>,
    event: &'static str,
    f: F,
) where
    F: FnOnce(&dyn MetricsCollector),
{
    let Some(collector) = collector else {
        return;
    };
    if let Err(payload) = std::panic::catch_unwind(AssertUnwindSafe(|| f(collector.as_ref()))) {
        error!(event, "metrics collector panicked: {}", panic_message(&*payload));
    }
}

/// Stores metrics for the thread pool using atomic counters.
///
/// `queued_tasks`, `running_tasks` and `active_threads` are gauges; the rest only grow.
#[derive(Debug, Default)]
pub struct ThreadPoolMetrics {
    /// Number of tasks currently queued for execution.
    pub queued_tasks: AtomicUsize,
    /// Number of tasks currently being executed.
    pub running_tasks: AtomicUsize,
    /// Total number of tasks that returned normally.
    pub completed_tasks: AtomicUsize,
    /// Total number of tasks that panicked.
    pub failed_tasks: AtomicUsize,
    /// Total number of queued tasks dropped by a discarding shutdown.
    pub discarded_tasks: AtomicUsize,
    /// Total number of submissions that were not accepted.
    pub rejected_tasks: AtomicUsize,
    /// Number of worker threads currently active.
    pub active_threads: AtomicUsize,
}

impl ThreadPoolMetrics {
    /// Creates a new `ThreadPoolMetrics` instance with all counters initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks that left the pool one way or another: completed, failed or discarded.
    pub fn finished_tasks(&self) -> usize {
        self.completed_tasks.load(Ordering::SeqCst)
            + self.failed_tasks.load(Ordering::SeqCst)
            + self.discarded_tasks.load(Ordering::SeqCst)
    }
}

/// A default implementation of `MetricsCollector` using atomic counters.
///
/// The `AtomicMetricsCollector` collects thread pool metrics and updates the counters
/// in a thread-safe manner. It is backed by an `Arc<ThreadPoolMetrics>` to share metrics
/// across multiple components.
pub struct AtomicMetricsCollector {
    /// Shared metrics storage.
    pub metrics: Arc<ThreadPoolMetrics>,
}

impl AtomicMetricsCollector {
    /// Creates a new `AtomicMetricsCollector` with the provided metrics.
    pub fn new(metrics: Arc<ThreadPoolMetrics>) -> Self {
        Self { metrics }
    }
}

impl MetricsCollector for AtomicMetricsCollector {
    fn on_task_submitted(&self) {
        self.metrics.queued_tasks.fetch_add(1, Ordering::SeqCst);
    }

    fn on_task_rejected(&self) {
        self.metrics.queued_tasks.fetch_sub(1, Ordering::SeqCst);
        self.metrics.rejected_tasks.fetch_add(1, Ordering::SeqCst);
    }

    fn on_task_started(&self) {
        self.metrics.queued_tasks.fetch_sub(1, Ordering::SeqCst);
        self.metrics.running_tasks.fetch_add(1, Ordering::SeqCst);
    }

    fn on_task_completed(&self) {
        self.metrics.running_tasks.fetch_sub(1, Ordering::SeqCst);
        self.metrics.completed_tasks.fetch_add(1, Ordering::SeqCst);
    }

    fn on_task_failed(&self) {
        self.metrics.running_tasks.fetch_sub(1, Ordering::SeqCst);
        self.metrics.failed_tasks.fetch_add(1, Ordering::SeqCst);
    }

    fn on_task_discarded(&self) {
        self.metrics.queued_tasks.fetch_sub(1, Ordering::SeqCst);
        self.metrics.discarded_tasks.fetch_add(1, Ordering::SeqCst);
    }

    /// Increments the count of active threads.
    fn on_worker_started(&self) {
        self.metrics.active_threads.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrements the count of active threads.
    fn on_worker_stopped(&self) {
        self.metrics.active_threads.fetch_sub(1, Ordering::SeqCst);
    }
}
