//! Bounded FIFO queue shared between submitters and workers.
//!
//! The queue also owns the pool state, so that every state check made by
//! `enqueue`/`dequeue` happens under the same lock that guards the items.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::errors::{ConfigError, PoolError};

/// Lifecycle state of a pool. Transitions only go forward:
/// `Running -> Draining -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Accepting and executing tasks.
    Running,
    /// No longer accepting tasks; queued tasks are still handed to workers.
    Draining,
    /// Terminal. Workers exit once they observe an empty queue.
    Stopped,
}

struct Inner<T> {
    items: VecDeque<T>,
    state: PoolState,
    // Items handed out by `dequeue` and not yet reported through `task_done`.
    in_flight: usize,
}

/// Outcome of [`TaskQueue::close`].
pub struct Closing<T> {
    /// `true` for the call that moved the state out of `Running`.
    pub initiated: bool,
    /// Items removed from the queue by a discarding close.
    pub discarded: Vec<T>,
}

pub struct TaskQueue<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> TaskQueue<T> {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        Ok(Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                state: PoolState::Running,
                in_flight: 0,
            }),
            capacity,
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    // The lock is never held while user code runs, so a poisoned guard is still consistent.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `item`, blocking while the queue is full and the pool is running.
    ///
    /// With `timeout` set, gives up with [`PoolError::Timeout`] once the deadline passes.
    /// Fails with [`PoolError::PoolClosed`] if the pool is not running, including when it
    /// stops running while the caller is blocked. On failure `item` is dropped.
    pub fn enqueue(&self, item: T, timeout: Option<Duration>) -> Result<(), PoolError> {
        let mut inner = self.lock();
        if inner.state != PoolState::Running {
            return Err(PoolError::PoolClosed);
        }

        let blocked =
            |i: &mut Inner<T>| i.items.len() >= self.capacity && i.state == PoolState::Running;
        inner = match timeout {
            None => self
                .not_full
                .wait_while(inner, blocked)
                .unwrap_or_else(PoisonError::into_inner),
            Some(limit) => {
                let (guard, result) = self
                    .not_full
                    .wait_timeout_while(inner, limit, blocked)
                    .unwrap_or_else(PoisonError::into_inner);
                if result.timed_out() && guard.state == PoolState::Running {
                    return Err(PoolError::Timeout(limit));
                }
                guard
            }
        };

        if inner.state != PoolState::Running {
            return Err(PoolError::PoolClosed);
        }

        inner.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Appends `item` only if a slot is free right now.
    pub fn try_enqueue(&self, item: T) -> Result<(), PoolError> {
        let mut inner = self.lock();
        if inner.state != PoolState::Running {
            return Err(PoolError::PoolClosed);
        }
        if inner.items.len() >= self.capacity {
            return Err(PoolError::QueueFull);
        }

        inner.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the oldest item, blocking while the queue is empty and the pool has not
    /// stopped. Returns `None` once the queue is empty and the pool is stopped.
    ///
    /// Every item returned must later be acknowledged with [`TaskQueue::task_done`].
    pub fn dequeue(&self) -> Option<T> {
        let inner = self.lock();
        let mut inner = self
            .not_empty
            .wait_while(inner, |i| i.items.is_empty() && i.state != PoolState::Stopped)
            .unwrap_or_else(PoisonError::into_inner);

        let item = inner.items.pop_front()?;
        inner.in_flight += 1;
        self.not_full.notify_one();
        Some(item)
    }

    /// Marks one dequeued item as finished. The last item of a draining pool stops it.
    pub fn task_done(&self) {
        let mut inner = self.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        if inner.state == PoolState::Draining && inner.items.is_empty() && inner.in_flight == 0 {
            self.stop(&mut inner);
        }
    }

    /// Stops accepting items.
    ///
    /// With `discard`, every queued item is removed and returned, and the pool stops
    /// at once; items already handed out still run to completion. Without it, the pool
    /// drains and stops when the last outstanding item is acknowledged.
    /// Submitters blocked in `enqueue` are woken and fail with `PoolClosed`.
    pub fn close(&self, discard: bool) -> Result<Closing<T>, PoolError> {
        let mut inner = self.lock();
        if inner.state == PoolState::Stopped {
            return Err(PoolError::AlreadyStopped);
        }

        let initiated = inner.state == PoolState::Running;
        inner.state = PoolState::Draining;

        let discarded: Vec<T> = if discard {
            inner.items.drain(..).collect()
        } else {
            Vec::new()
        };

        if inner.items.is_empty() && (discard || inner.in_flight == 0) {
            self.stop(&mut inner);
        }
        self.not_full.notify_all();

        Ok(Closing {
            initiated,
            discarded,
        })
    }

    fn stop(&self, inner: &mut Inner<T>) {
        inner.state = PoolState::Stopped;
        self.not_empty.notify_all();
    }

    pub fn state(&self) -> PoolState {
        self.lock().state
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
