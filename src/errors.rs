//! Error types for the thread pool.
//!
//! This module defines errors that may occur while building or operating the pool.
//! Construction problems are reported as [`ConfigError`], submission and shutdown
//! problems as [`PoolError`], and the outcome of a task spawned with a result handle
//! as [`JoinError`].

use std::time::Duration;

use thiserror::Error;

/// Invalid construction parameters. Fatal to pool creation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The pool needs at least one worker.
    #[error("invalid configuration: worker count must be at least 1")]
    ZeroWorkers,
    /// The task queue needs at least one slot.
    #[error("invalid configuration: queue capacity must be at least 1")]
    ZeroCapacity,
    /// The operating system refused to create a worker thread.
    #[error("failed to spawn worker thread {worker_id}: {source}")]
    Spawn {
        worker_id: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned to callers of `submit` and `shutdown`.
///
/// All of these are recoverable: the pool itself is unaffected by them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The pool is draining or stopped, and no new tasks can be accepted.
    #[error("thread pool is closed")]
    PoolClosed,
    /// No queue slot became free before the deadline. The task was not enqueued.
    #[error("timed out after {0:?} waiting for a free queue slot")]
    Timeout(Duration),
    /// A non-blocking submit found the queue at capacity.
    #[error("task queue is full")]
    QueueFull,
    /// `shutdown` was called on a pool that had already stopped.
    #[error("thread pool is already stopped")]
    AlreadyStopped,
}

/// The reason a [`TaskHandle`](crate::pool::task::TaskHandle) produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// The task panicked. Carries the panic message.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// The task was dropped without running, e.g. by a discarding shutdown.
    #[error("task was discarded before it ran")]
    Discarded,
}
