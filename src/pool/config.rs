//! Static pool configuration.

use crate::errors::ConfigError;

/// Sizing and naming for a [`ThreadPool`](super::ThreadPool).
///
/// Hooks (error handler, metrics) are not part of this value; they are attached
/// through the [`ThreadPoolBuilder`](super::ThreadPoolBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads, fixed for the pool's lifetime.
    pub num_threads: usize,
    /// Maximum number of tasks waiting in the queue.
    pub queue_capacity: usize,
    /// Prefix for worker thread names; workers are named `"{thread_name}-{id}"`.
    pub thread_name: String,
}

impl PoolConfig {
    pub const DEFAULT_NUM_THREADS: usize = 4;
    pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
    pub const DEFAULT_THREAD_NAME: &'static str = "boundpool-worker";

    pub fn new(num_threads: usize, queue_capacity: usize) -> Self {
        Self {
            num_threads,
            queue_capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_threads == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    pub(crate) fn worker_name(&self, id: usize) -> String {
        format!("{}-{}", self.thread_name, id)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_threads: Self::DEFAULT_NUM_THREADS,
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            thread_name: Self::DEFAULT_THREAD_NAME.to_owned(),
        }
    }
}
