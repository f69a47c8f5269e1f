//! Result handles for submitted work.
//!
//! A delegate executor receives the [`TaskCompleter`] half and hands the
//! [`TaskHandle`] half back to the caller. Dropping the completer without
//! completing it reads as cancellation on the handle side.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::TaskFailure;

type Outcome<T> = Result<T, TaskFailure>;

/// Shared cancellation request between a handle and the executor running its task.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Caller-side handle to the eventual outcome of a task.
///
/// Await it from async code, or call [`TaskHandle::wait`] from a plain thread.
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<Outcome<T>>,
    cancel: CancelFlag,
}

/// Executor-side half of a [`TaskHandle`].
#[derive(Debug)]
pub struct TaskCompleter<T> {
    sender: oneshot::Sender<Outcome<T>>,
    cancel: CancelFlag,
}

impl<T> TaskHandle<T> {
    #[must_use]
    pub fn channel() -> (TaskCompleter<T>, TaskHandle<T>) {
        let (sender, receiver) = oneshot::channel();
        let cancel = CancelFlag::default();
        (
            TaskCompleter {
                sender,
                cancel: cancel.clone(),
            },
            TaskHandle { receiver, cancel },
        )
    }

    /// Request cancellation. A task that has already started is not interrupted.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Block the current thread until the task completes.
    ///
    /// Must not be called from within an async execution context.
    pub fn wait(self) -> Outcome<T> {
        self.receiver
            .blocking_recv()
            .unwrap_or(Err(TaskFailure::Cancelled))
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(TaskFailure::Cancelled)))
    }
}

impl<T> TaskCompleter<T> {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Deliver the outcome. A caller that dropped its handle is not an error.
    pub fn complete(self, outcome: Outcome<T>) {
        let _ = self.sender.send(outcome);
    }
}
