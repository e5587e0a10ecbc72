//! Task abstraction for the thread pool.

pub type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError};

use crate::errors::JoinError;

/// A panic raised by a task, as seen by the worker that ran it.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    worker_id: usize,
    thread_name: Option<String>,
    message: String,
}

impl TaskFailure {
    pub(crate) fn from_panic(worker_id: usize, payload: &(dyn Any + Send)) -> Self {
        Self {
            worker_id,
            thread_name: std::thread::current().name().map(str::to_owned),
            message: panic_message(payload),
        }
    }

    /// Id of the worker that ran the task, in `0..num_threads`.
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    pub fn thread_name(&self) -> Option<&str> {
        self.thread_name.as_deref()
    }

    /// The panic message, or a placeholder for non-string payloads.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task panicked on worker {}: {}", self.worker_id, self.message)
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_owned()
    }
}

/// Receives the return value of a task spawned with
/// [`ThreadPool::spawn`](crate::pool::ThreadPool::spawn).
pub struct TaskHandle<T> {
    receiver: Receiver<Result<T, JoinError>>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task has run.
    pub fn join(self) -> Result<T, JoinError> {
        self.receiver.recv().unwrap_or(Err(JoinError::Discarded))
    }

    /// Like [`TaskHandle::join`], but returns `None` if the task has not finished
    /// within `timeout`. The handle stays usable after a timeout.
    pub fn join_timeout(&self, timeout: Duration) -> Option<Result<T, JoinError>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(res) => Some(res),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(JoinError::Discarded)),
        }
    }
}

/// Wraps `f` so that its outcome is delivered to the returned handle.
///
/// A panic is reported to the handle and then resumed, so the worker still sees it.
/// If the task is dropped unrun, the handle reports [`JoinError::Discarded`].
pub fn spawn_task<F, T>(f: F) -> (BoxedTask, TaskHandle<T>)
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = bounded(1);
    let task = Box::new(move || match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => {
            let _ = tx.send(Ok(value));
        }
        Err(payload) => {
            let _ = tx.send(Err(JoinError::Panicked(panic_message(&*payload))));
            std::panic::resume_unwind(payload);
        }
    });
    (task, TaskHandle { receiver: rx })
}
