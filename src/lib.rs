//! # boundpool
//!
//! `boundpool` is a Rust library that provides a fixed-size thread pool fed from a
//! bounded FIFO task queue.
//!
//! ## Features
//! - Blocking backpressure: `submit` waits while the queue is full, with an optional timeout.
//! - Strict FIFO dispatch, no priorities and no work stealing.
//! - Graceful shutdown that drains the queue, or a hard shutdown that discards it.
//! - Task panics are caught at the worker and reported through a callback.
//! - Optional result handles layered on top of plain submission.
//! - Metrics collection for monitoring thread pool activity.
//!
//! ## Usage
//!
//! ### Basic Usage
//! ```rust
//! use boundpool::ThreadPoolBuilder;
//!
//! // Create a thread pool with default settings (4 threads, 100 queue slots)
//! let pool = ThreadPoolBuilder::new().build().unwrap();
//!
//! pool.submit(|| {
//!     println!("Hello from the thread pool!");
//! })
//! .unwrap();
//!
//! // Run everything still queued, then join the workers
//! pool.shutdown_graceful().unwrap();
//! ```
//!
//! ### Bounded Queue and Error Reporting
//! ```rust
//! use boundpool::ThreadPool;
//! use std::time::Duration;
//!
//! let pool = ThreadPool::new(2, 3, |failure| {
//!     eprintln!("worker {} lost a task: {}", failure.worker_id(), failure.message());
//! })
//! .unwrap();
//!
//! for i in 0..5 {
//!     // Blocks while three tasks are already waiting
//!     pool.submit(move || {
//!         std::thread::sleep(Duration::from_millis(10));
//!         println!("Task {} executed", i);
//!     })
//!     .unwrap();
//! }
//! pool.submit(|| panic!("reported, not propagated")).unwrap();
//!
//! pool.shutdown_graceful().unwrap();
//! ```
//!
//! ### Result Handles
//! ```rust
//! use boundpool::ThreadPoolBuilder;
//!
//! let pool = ThreadPoolBuilder::new().num_threads(2).build().unwrap();
//!
//! let handle = pool.spawn(|| 6 * 7).unwrap();
//! assert_eq!(handle.join().unwrap(), 42);
//!
//! let squares: Vec<u64> = pool
//!     .map(1..=4u64, |x| x * x)
//!     .unwrap()
//!     .into_iter()
//!     .map(|h| h.join().unwrap())
//!     .collect();
//! assert_eq!(squares, vec![1, 4, 9, 16]);
//!
//! pool.shutdown_graceful().unwrap();
//! ```
//!
//! ### Collecting Metrics
//! ```rust
//! use boundpool::{metrics::{ThreadPoolMetrics, AtomicMetricsCollector}, ThreadPoolBuilder};
//! use std::sync::Arc;
//! use std::sync::atomic::Ordering;
//!
//! // Create metrics and collector
//! let metrics = Arc::new(ThreadPoolMetrics::new());
//! let collector = Arc::new(AtomicMetricsCollector::new(metrics.clone()));
//!
//! // Create a thread pool with the metrics collector
//! let pool = ThreadPoolBuilder::new()
//!     .num_threads(4)
//!     .with_metrics_collector(collector)
//!     .build()
//!     .unwrap();
//!
//! for i in 0..5 {
//!     pool.submit(move || println!("Task {} executed", i)).unwrap();
//! }
//! pool.shutdown_graceful().unwrap();
//!
//! assert_eq!(metrics.completed_tasks.load(Ordering::SeqCst), 5);
//! assert_eq!(metrics.active_threads.load(Ordering::SeqCst), 0);
//! ```

mod errors;
mod macros;
pub mod metrics;
pub mod pool;
mod queue;

#[doc(hidden)]
pub use tracing;

pub use errors::{ConfigError, JoinError, PoolError};
pub use pool::config::PoolConfig;
pub use pool::task::{BoxedTask, TaskFailure, TaskHandle};
pub use pool::{ErrorHook, ShutdownMode, ThreadPool, ThreadPoolBuilder};
pub use queue::PoolState;

/// Runs a set of tasks with one OS thread per task (without the thread pool).
///
/// This function spawns one thread per task and waits for all threads to complete.
/// It is the baseline the pool is benchmarked against.
///
/// # Arguments
/// - `tasks`: A vector of boxed tasks (`BoxedTask`) to execute.
///
/// # Example
/// ```rust
/// use boundpool::run_thread_per_task;
///
/// let tasks: Vec<_> = (0..4)
///     .map(|i| Box::new(move || println!("Task {} executed", i)) as Box<dyn FnOnce() + Send>)
///     .collect();
///
/// run_thread_per_task(tasks);
/// ```
pub fn run_thread_per_task(tasks: Vec<BoxedTask>) {
    let handles: Vec<_> = tasks
        .into_iter()
        .map(|task| std::thread::spawn(task))
        .collect();

    for (i, h) in handles.into_iter().enumerate() {
        if h.join().is_err() {
            tracing::warn!(task = i, "thread-per-task baseline: task panicked");
        }
    }
}
