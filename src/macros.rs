//! # Macros for `boundpool`
//!
//! This module contains macros to simplify usage of the `boundpool` library. These macros
//! reduce boilerplate when configuring thread pools, submitting tasks and logging metrics.

/// Simplifies submitting tasks into the thread pool.
///
/// Without a timeout the call blocks while the queue is full.
///
/// # Examples
/// ```rust
/// use boundpool::{ThreadPoolBuilder, submit_task};
/// use std::time::Duration;
///
/// let pool = ThreadPoolBuilder::new().build().unwrap();
///
/// submit_task!(pool, || println!("Task without a deadline")).unwrap();
/// submit_task!(pool, || println!("Task with a deadline"), timeout: Duration::from_millis(100)).unwrap();
///
/// pool.shutdown_graceful().unwrap();
/// ```
#[macro_export]
macro_rules! submit_task {
    ($pool:expr, $task:expr) => {
        $pool.submit($task)
    };
    ($pool:expr, $task:expr, timeout: $timeout:expr) => {
        $pool.submit_timeout($task, $timeout)
    };
}

/// Logs the current metrics of the thread pool at info level.
///
/// # Example
/// ```rust
/// use boundpool::{metrics::{ThreadPoolMetrics, AtomicMetricsCollector}, ThreadPoolBuilder, log_metrics};
/// use std::sync::Arc;
///
/// let metrics = Arc::new(ThreadPoolMetrics::new());
/// let collector = Arc::new(AtomicMetricsCollector::new(metrics.clone()));
/// let pool = ThreadPoolBuilder::new().with_metrics_collector(collector).build().unwrap();
///
/// log_metrics!(metrics);
/// pool.shutdown_graceful().unwrap();
/// ```
#[macro_export]
macro_rules! log_metrics {
    ($metrics:expr) => {
        $crate::tracing::info!(
            queued = $metrics
                .queued_tasks
                .load(std::sync::atomic::Ordering::SeqCst),
            running = $metrics
                .running_tasks
                .load(std::sync::atomic::Ordering::SeqCst),
            completed = $metrics
                .completed_tasks
                .load(std::sync::atomic::Ordering::SeqCst),
            failed = $metrics
                .failed_tasks
                .load(std::sync::atomic::Ordering::SeqCst),
            discarded = $metrics
                .discarded_tasks
                .load(std::sync::atomic::Ordering::SeqCst),
            rejected = $metrics
                .rejected_tasks
                .load(std::sync::atomic::Ordering::SeqCst),
            active_threads = $metrics
                .active_threads
                .load(std::sync::atomic::Ordering::SeqCst),
            "thread pool metrics"
        )
    };
}

/// Creates a thread pool, returning `Result<ThreadPool, ConfigError>`.
///
/// # Examples
/// ```rust
/// use boundpool::create_thread_pool;
///
/// let pool = create_thread_pool!(num_threads: 8, queue_capacity: 16).unwrap();
/// pool.shutdown_graceful().unwrap();
/// ```
#[macro_export]
macro_rules! create_thread_pool {
    (num_threads: $num:expr) => {
        $crate::ThreadPoolBuilder::new().num_threads($num).build()
    };
    (num_threads: $num:expr, queue_capacity: $cap:expr) => {
        $crate::ThreadPoolBuilder::new()
            .num_threads($num)
            .queue_capacity($cap)
            .build()
    };
    (num_threads: $num:expr, queue_capacity: $cap:expr, thread_name: $name:expr) => {
        $crate::ThreadPoolBuilder::new()
            .num_threads($num)
            .queue_capacity($cap)
            .thread_name($name)
            .build()
    };
}
